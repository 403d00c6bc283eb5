//! Connection entry point
//!
//! One connection gets one inbox channel, one forwarding task that feeds it,
//! and one driver running a fresh script against it.

use crate::channel::BlockingChannel;
use crate::driver::{ConversationSummary, DriverError, EffectDriver, UnknownEffectPolicy};
use crate::script::Conversation;
use crate::transport::{websocket, Inbound, MessageSink};
use axum::extract::ws::WebSocket;
use futures::Stream;
use std::fmt::Display;
use std::future::{self, Future};
use std::task::Poll;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Settings shared by every connection
#[derive(Clone, Default)]
pub struct ConnectionSettings {
    pub unknown_effects: UnknownEffectPolicy,
    /// Cancelled on server shutdown
    pub shutdown: CancellationToken,
}

/// How a connection ended
#[derive(Debug)]
pub enum ConnectionOutcome {
    /// The script completed, or the driver failed
    Finished(Result<ConversationSummary, DriverError>),
    /// The peer closed the transport while the script was still running
    TransportClosed,
    /// The server is shutting down
    Shutdown,
}

/// Serve one upgraded websocket until either side is done.
pub async fn serve_websocket(
    socket: WebSocket,
    conversation: Conversation,
    settings: ConnectionSettings,
) -> ConnectionOutcome {
    let conn_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("connection", %conn_id);

    async move {
        tracing::info!("Connection opened");
        let (sink, inbound) = websocket::split(socket);
        let outcome = run_connection(sink, inbound, conversation, &settings).await;
        log_outcome(&outcome);
        outcome
    }
    .instrument(span)
    .await
}

/// Run a conversation over an arbitrary transport.
///
/// Inbound text is forwarded into the inbox by a background task while the
/// driver runs in the caller's task. A finished script stops forwarding.
/// A closed transport stops the driver only once it has consumed everything
/// already forwarded and is waiting on an empty inbox, so replies to input
/// that arrived before the close are still sent.
pub async fn run_connection<K, I, E>(
    sink: K,
    inbound: I,
    conversation: Conversation,
    settings: &ConnectionSettings,
) -> ConnectionOutcome
where
    K: MessageSink,
    I: Stream<Item = Result<Inbound, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let inbox = BlockingChannel::new();

    let mut forwarder = {
        let inbox = inbox.clone();
        tokio::spawn(
            async move { inbox.forward(inbound).await }.instrument(tracing::Span::current()),
        )
    };

    let run = EffectDriver::new(conversation, sink, inbox.clone())
        .with_policy(settings.unknown_effects)
        .run();
    tokio::pin!(run);
    let mut transport_open = true;

    let outcome = loop {
        tokio::select! {
            biased;
            () = settings.shutdown.cancelled() => break ConnectionOutcome::Shutdown,
            result = &mut run => break ConnectionOutcome::Finished(result),
            forwarded = &mut forwarder, if transport_open => {
                tracing::debug!(forwarded = forwarded.unwrap_or_default(), "Forwarding finished");
                transport_open = false;
            }
            () = starved(&inbox), if !transport_open => break ConnectionOutcome::TransportClosed,
        }
    };

    forwarder.abort();
    if !inbox.is_empty() {
        tracing::debug!(unread = inbox.len(), "Dropping unread messages");
    }
    outcome
}

/// Resolves once the driver is waiting on an inbox nothing will refill.
///
/// Registers no waker of its own: the driver's pending effect wakes the
/// connection task whenever its state can change.
fn starved(inbox: &BlockingChannel<String>) -> impl Future<Output = ()> + '_ {
    future::poll_fn(move |_| {
        if inbox.is_starved() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    })
}

fn log_outcome(outcome: &ConnectionOutcome) {
    match outcome {
        ConnectionOutcome::Finished(Ok(summary)) => {
            tracing::info!(
                effects = summary.effects_interpreted,
                messages_sent = summary.messages_sent,
                inputs_consumed = summary.inputs_consumed,
                unknown_skipped = summary.unknown_effects_skipped,
                "Conversation completed"
            );
        }
        ConnectionOutcome::Finished(Err(e)) => {
            tracing::error!(error = %e, "Conversation failed");
        }
        ConnectionOutcome::TransportClosed => tracing::info!("Connection closed by peer"),
        ConnectionOutcome::Shutdown => tracing::info!("Connection closed for shutdown"),
    }
}
