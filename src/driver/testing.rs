//! Test doubles for the driver and connection layers

use crate::script::{Effect, Script, Step};
use crate::transport::{MessageSink, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

// ============================================================================
// Sinks
// ============================================================================

/// Sink that records every message it is asked to send
#[derive(Clone)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<String>>>,
    count: Arc<watch::Sender<usize>>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            count: Arc::new(count),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait until at least `n` messages have been sent
    pub async fn wait_for(&self, n: usize) {
        let mut rx = self.count.subscribe();
        rx.wait_for(|count| *count >= n).await.unwrap();
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        let len = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(text);
            sent.len()
        };
        self.count.send_replace(len);
        Ok(())
    }
}

/// Sink whose peer has gone away
pub struct ClosedSink;

#[async_trait]
impl MessageSink for ClosedSink {
    async fn send(&mut self, _text: String) -> Result<(), TransportError> {
        Err(TransportError::Closed)
    }
}

/// Sink whose every send fails mid-write
pub struct FailingSink;

#[async_trait]
impl MessageSink for FailingSink {
    async fn send(&mut self, _text: String) -> Result<(), TransportError> {
        Err(TransportError::Send("connection reset".to_string()))
    }
}

// ============================================================================
// Scripts
// ============================================================================

/// Script that replays a fixed list of steps and records what it was fed
pub struct ScriptedScript {
    steps: VecDeque<Step<Option<Effect>>>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl ScriptedScript {
    pub fn new(steps: Vec<Step<Option<Effect>>>) -> Self {
        Self {
            steps: steps.into(),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Inputs received so far, shared so tests can inspect them after a run
    pub fn inputs(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.inputs)
    }
}

impl Script for ScriptedScript {
    type Output = Option<Effect>;

    fn resume(&mut self, input: String) -> Step<Option<Effect>> {
        self.inputs.lock().unwrap().push(input);
        self.steps.pop_front().unwrap_or(Step::Return(None))
    }
}
