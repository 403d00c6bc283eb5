//! Transport abstractions for a single connection
//!
//! The conversation core only needs two things from a connection: a way to
//! send text, and a stream of inbound events. These traits keep the driver
//! testable without a real socket.

pub mod websocket;

use async_trait::async_trait;
use thiserror::Error;

/// Inbound event delivered by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text payload, forwarded to the conversation
    Text(String),
    /// Binary, ping/pong and other control frames
    Other,
    /// The peer closed the connection
    Close,
}

/// Errors surfaced by the transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport is closed")]
    Closed,
    #[error("Failed to send message: {0}")]
    Send(String),
}

/// Outbound half of a connection
///
/// Messages are atomic: a send either delivers the whole text or fails.
#[async_trait]
pub trait MessageSink: Send {
    async fn send(&mut self, text: String) -> Result<(), TransportError>;
}
