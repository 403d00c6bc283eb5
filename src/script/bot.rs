//! Reference "Do what I say" conversation

use super::{Clock, Delegated, Delegation, Effect, Script, Step, SumScript};
use std::sync::Arc;

pub const WELCOME: &str = "Welcome to \"Do what I say BOT\"";
pub const FALLBACK: &str = "I don't know what to say!";

enum BotState {
    Greeting,
    ReadyToListen,
    Listening,
    /// Delegating to the sum sub-dialogue until it completes
    Summing(Delegation<f64>),
}

/// Greets once, then answers each message forever
///
/// - "time" anywhere in the message (any case): reply with the current time
/// - "sum": run the [`SumScript`] sub-dialogue and report its total
/// - anything else: fallback reply
pub struct BotScript {
    state: BotState,
    clock: Arc<dyn Clock>,
}

impl BotScript {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: BotState::Greeting,
            clock,
        }
    }

    fn reply(&mut self, message: &str) -> Effect {
        let lowered = message.to_lowercase();
        if lowered.contains("time") {
            self.state = BotState::ReadyToListen;
            Effect::say(format!("It is {}", self.clock.now().format("%H:%M:%S")))
        } else if lowered.contains("sum") {
            self.summing(Delegation::new(SumScript::new()), String::new())
        } else {
            self.state = BotState::ReadyToListen;
            Effect::say(FALLBACK)
        }
    }

    /// Resume the sum sub-dialogue, re-yielding its effects until it returns.
    fn summing(&mut self, sum: Delegation<f64>, input: String) -> Effect {
        match sum.resume(input) {
            Delegated::Pending(sum, effect) => {
                self.state = BotState::Summing(sum);
                effect
            }
            Delegated::Done(total) => {
                self.state = BotState::ReadyToListen;
                Effect::say(format!("The result is: {total}"))
            }
        }
    }
}

impl Script for BotScript {
    type Output = Option<Effect>;

    fn resume(&mut self, input: String) -> Step<Option<Effect>> {
        let effect = match std::mem::replace(&mut self.state, BotState::ReadyToListen) {
            BotState::Greeting => Effect::say(WELCOME),
            BotState::ReadyToListen => {
                self.state = BotState::Listening;
                Effect::listen()
            }
            BotState::Listening => self.reply(&input),
            BotState::Summing(sum) => self.summing(sum, input),
        };
        Step::Yield(effect)
    }
}
