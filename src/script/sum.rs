//! Sum sub-dialogue
//!
//! Collects numbers one message at a time and completes with their total on
//! the first message that is not a number, or whose addition would overflow
//! the total.

use super::{Effect, Script, Step};

pub const PROMPT: &str = "Okay, what numbers should we sum?";
pub const ACK: &str = "Got it!";

#[derive(Debug, Clone, PartialEq)]
enum SumState {
    Prompting,
    ReadyToListen,
    Listening,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumScript {
    state: SumState,
    total: f64,
}

impl Default for SumScript {
    fn default() -> Self {
        Self::new()
    }
}

impl SumScript {
    pub fn new() -> Self {
        Self {
            state: SumState::Prompting,
            total: 0.0,
        }
    }
}

impl Script for SumScript {
    type Output = f64;

    fn resume(&mut self, input: String) -> Step<f64> {
        match self.state {
            SumState::Prompting => {
                self.state = SumState::ReadyToListen;
                Step::Yield(Effect::say(PROMPT))
            }
            SumState::ReadyToListen => {
                self.state = SumState::Listening;
                Step::Yield(Effect::listen())
            }
            SumState::Listening => match parse_number(&input)
                .map(|n| self.total + n)
                .filter(|total| total.is_finite())
            {
                Some(total) => {
                    self.total = total;
                    self.state = SumState::ReadyToListen;
                    Step::Yield(Effect::say(ACK))
                }
                None => {
                    self.state = SumState::Finished;
                    Step::Return(self.total)
                }
            },
            SumState::Finished => Step::Return(self.total),
        }
    }
}

/// A finite number, ignoring surrounding whitespace
fn parse_number(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
