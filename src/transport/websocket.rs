//! WebSocket transport adapter

use super::{Inbound, MessageSink, TransportError};
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, Stream};
use futures::{Sink, SinkExt, StreamExt};
use std::fmt::Display;

impl From<Message> for Inbound {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Inbound::Text(text),
            Message::Close(_) => Inbound::Close,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => Inbound::Other,
        }
    }
}

/// Outbound half of an upgraded websocket
pub struct WebSocketSink<S = SplitSink<WebSocket, Message>> {
    inner: S,
    failed: bool,
}

impl<S> WebSocketSink<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            failed: false,
        }
    }
}

#[async_trait]
impl<S> MessageSink for WebSocketSink<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display,
{
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        // A failed websocket sink is unusable
        if self.failed {
            return Err(TransportError::Closed);
        }
        self.inner.send(Message::Text(text)).await.map_err(|e| {
            self.failed = true;
            TransportError::Send(e.to_string())
        })
    }
}

/// Split a socket into the sink the driver writes to and the inbound stream
/// the forwarding task reads from.
pub fn split(
    socket: WebSocket,
) -> (
    WebSocketSink,
    impl Stream<Item = Result<Inbound, axum::Error>> + Send + 'static,
) {
    let (sink, stream) = socket.split();
    let inbound = stream.map(|result| result.map(Inbound::from));
    (WebSocketSink::new(sink), inbound)
}
