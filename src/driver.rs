//! Effect driver
//!
//! Runs one conversation script against one connection: advance the script,
//! interpret the effect it produced, feed the result back, repeat.
//! Effects are interpreted one at a time, in the order they are produced.

#[cfg(test)]
pub mod testing;

use crate::channel::BlockingChannel;
use crate::script::{Effect, Script, Step};
use crate::transport::{MessageSink, TransportError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What to do with an effect kind the driver cannot interpret
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownEffectPolicy {
    /// Log it and continue as if it completed with an empty result
    #[default]
    Ignore,
    /// Stop the conversation with [`DriverError::UnknownEffect`]
    Fail,
}

impl FromStr for UnknownEffectPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "fail" => Ok(Self::Fail),
            other => Err(format!("expected `ignore` or `fail`, got `{other}`")),
        }
    }
}

/// Per-cycle driver phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    AwaitingEffect,
    Interpreting,
    FedBack,
    Closed,
}

impl fmt::Display for DriverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverPhase::AwaitingEffect => "awaiting_effect",
            DriverPhase::Interpreting => "interpreting",
            DriverPhase::FedBack => "fed_back",
            DriverPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Errors that end a conversation
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Unknown effect kind: {kind}")]
    UnknownEffect { kind: String },
}

/// Counters for a finished conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationSummary {
    pub effects_interpreted: usize,
    pub messages_sent: usize,
    pub inputs_consumed: usize,
    pub unknown_effects_skipped: usize,
}

/// Drives a script against a sink and an inbox
pub struct EffectDriver<S, K> {
    script: S,
    sink: K,
    inbox: BlockingChannel<String>,
    policy: UnknownEffectPolicy,
    phase: DriverPhase,
    summary: ConversationSummary,
}

impl<S, K> EffectDriver<S, K>
where
    S: Script<Output = Option<Effect>>,
    K: MessageSink,
{
    pub fn new(script: S, sink: K, inbox: BlockingChannel<String>) -> Self {
        Self {
            script,
            sink,
            inbox,
            policy: UnknownEffectPolicy::default(),
            phase: DriverPhase::AwaitingEffect,
            summary: ConversationSummary::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownEffectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run until the script completes.
    ///
    /// A script that never completes keeps this future pending; callers tear
    /// it down by dropping it.
    pub async fn run(mut self) -> Result<ConversationSummary, DriverError> {
        let mut feedback = String::new();

        loop {
            self.enter(DriverPhase::AwaitingEffect);
            let (effect, done) = match self.script.resume(std::mem::take(&mut feedback)) {
                Step::Yield(effect) => (Some(effect), false),
                Step::Return(last) => (last, true),
            };

            let Some(effect) = effect else {
                break;
            };

            self.enter(DriverPhase::Interpreting);
            tracing::trace!(kind = effect.kind(), "Interpreting effect");
            feedback = self.interpret(effect).await?;
            self.enter(DriverPhase::FedBack);

            if done {
                break;
            }
        }

        self.enter(DriverPhase::Closed);
        Ok(self.summary)
    }

    async fn interpret(&mut self, effect: Effect) -> Result<String, DriverError> {
        self.summary.effects_interpreted += 1;
        match effect {
            Effect::Say { text } => {
                tracing::debug!(text = %text, "Sending message");
                self.sink.send(text).await?;
                self.summary.messages_sent += 1;
                Ok(String::new())
            }
            Effect::Listen => {
                let input = self.inbox.take().await;
                tracing::debug!(input = %input, "Received message");
                self.summary.inputs_consumed += 1;
                Ok(input)
            }
            Effect::Other { kind, .. } => match self.policy {
                UnknownEffectPolicy::Ignore => {
                    tracing::warn!(kind = %kind, "Skipping effect with no interpretation");
                    self.summary.unknown_effects_skipped += 1;
                    Ok(String::new())
                }
                UnknownEffectPolicy::Fail => Err(DriverError::UnknownEffect { kind }),
            },
        }
    }

    fn enter(&mut self, phase: DriverPhase) {
        tracing::trace!(from = %self.phase, to = %phase, "Driver phase");
        self.phase = phase;
    }
}
