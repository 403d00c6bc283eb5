//! Blocking channel
//!
//! Bridges push-based delivery (socket events) to pull-based consumption.
//! Producers `put` values without ever waiting; consumers `take` and suspend
//! until a value is available. Requests and values are paired strictly in
//! arrival order on both sides.

#[cfg(test)]
mod proptests;

use crate::transport::Inbound;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Unbounded FIFO queue with suspend-until-available `take`
pub struct BlockingChannel<T> {
    queues: Arc<Mutex<Queues<T>>>,
}

struct Queues<T> {
    /// Pending take requests, oldest first
    takers: VecDeque<oneshot::Sender<T>>,
    /// Values not yet handed to a request, oldest first
    values: VecDeque<T>,
}

impl<T> Queues<T> {
    /// Pair oldest request with oldest value until one side runs out.
    ///
    /// Afterwards at most one of `takers` and `values` is non-empty.
    fn settle(&mut self) {
        while !self.values.is_empty() {
            let Some(taker) = self.takers.pop_front() else {
                break;
            };
            let Some(value) = self.values.pop_front() else {
                break;
            };
            if let Err(value) = taker.send(value) {
                // Requester is gone; the value stays at the head for the next one
                self.values.push_front(value);
            }
        }
    }
}

impl<T> Clone for BlockingChannel<T> {
    fn clone(&self) -> Self {
        Self {
            queues: Arc::clone(&self.queues),
        }
    }
}

impl<T> Default for BlockingChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlockingChannel<T> {
    pub fn new() -> Self {
        Self {
            queues: Arc::new(Mutex::new(Queues {
                takers: VecDeque::new(),
                values: VecDeque::new(),
            })),
        }
    }

    /// Request the next value.
    ///
    /// The request is queued when `take` is called, not when the returned
    /// future is first polled, so request order is call order.
    pub fn take(&self) -> Take<T> {
        let (tx, rx) = oneshot::channel();
        {
            let mut queues = lock(&self.queues);
            queues.takers.push_back(tx);
            queues.settle();
        }
        Take {
            rx,
            queues: Arc::clone(&self.queues),
        }
    }

    /// Enqueue a value, resolving the oldest pending `take` if there is one.
    pub fn put(&self, value: T) {
        let mut queues = lock(&self.queues);
        queues.values.push_back(value);
        queues.settle();
    }

    /// Number of buffered values not yet handed to a request
    pub fn len(&self) -> usize {
        lock(&self.queues).values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `take` requests still waiting for a value
    pub fn pending_takes(&self) -> usize {
        lock(&self.queues)
            .takers
            .iter()
            .filter(|taker| !taker.is_closed())
            .count()
    }

    /// True when a `take` is waiting and no value is buffered for it.
    ///
    /// Once no more values can arrive, a starved consumer will never resume.
    pub fn is_starved(&self) -> bool {
        self.pending_takes() > 0 && self.is_empty()
    }
}

impl BlockingChannel<String> {
    /// Forward every text message from `source` into the channel.
    ///
    /// Non-text events are skipped. Returns the number of messages forwarded
    /// once the source closes, ends, or fails. Transport errors end the
    /// forwarding and are never pushed into the channel.
    pub async fn forward<S, E>(&self, source: S) -> usize
    where
        S: Stream<Item = Result<Inbound, E>>,
        E: Display,
    {
        futures::pin_mut!(source);
        let mut forwarded = 0;
        while let Some(event) = source.next().await {
            match event {
                Ok(Inbound::Text(text)) => {
                    self.put(text);
                    forwarded += 1;
                }
                Ok(Inbound::Other) => {
                    tracing::trace!("Ignoring non-text inbound event");
                }
                Ok(Inbound::Close) => {
                    tracing::debug!(forwarded, "Transport closed");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, forwarded, "Transport receive failed, stopping forward");
                    break;
                }
            }
        }
        forwarded
    }
}

fn lock<T>(queues: &Mutex<Queues<T>>) -> MutexGuard<'_, Queues<T>> {
    // Queue operations cannot leave the queues half-updated, so a poisoned
    // lock still guards consistent data.
    queues.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deferred result of [`BlockingChannel::take`]
///
/// Dropping an unresolved `Take` gives its value, if one was already
/// assigned, back to the head of the channel. With several takes
/// outstanding, that value may then reach a later request after a newer
/// value has already resolved an earlier one: no value is lost, but order
/// across a cancelled take is not preserved. A consumer that keeps at most
/// one take outstanding sees strict put order.
pub struct Take<T> {
    rx: oneshot::Receiver<T>,
    queues: Arc<Mutex<Queues<T>>>,
}

impl<T> Future for Take<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            // The sender lives in the queues this future keeps alive, so it is
            // only dropped when a value is delivered.
            Poll::Ready(Err(_)) | Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for Take<T> {
    fn drop(&mut self) {
        self.rx.close();
        if let Ok(value) = self.rx.try_recv() {
            let mut queues = lock(&self.queues);
            queues.values.push_front(value);
            queues.settle();
        }
    }
}
