//! Conversation scripts
//!
//! A script is a resumable computation: each call to [`Script::resume`] feeds
//! it the result of the previous effect and runs it to its next effect or to
//! completion. Scripts never perform I/O themselves, so the same inputs always
//! produce the same effects.

mod bot;
mod effect;
mod sum;

#[cfg(test)]
mod proptests;

pub use bot::BotScript;
pub use effect::Effect;
pub use sum::SumScript;

use chrono::{Local, NaiveTime};
use std::sync::Arc;

/// Outcome of advancing a script once
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// Suspended on an effect; resume with its result
    Yield(Effect),
    /// Finished with a completion value
    Return(T),
}

/// Run-to-next-effect interface shared by top-level and nested scripts
pub trait Script: Send {
    type Output;

    /// Advance with the result of the last effect (empty on the first call).
    fn resume(&mut self, input: String) -> Step<Self::Output>;
}

impl<S: Script + ?Sized> Script for Box<S> {
    type Output = S::Output;

    fn resume(&mut self, input: String) -> Step<Self::Output> {
        (**self).resume(input)
    }
}

/// A sub-script run by a parent script in its own place.
///
/// The parent re-yields every effect the sub-script produces and gets the
/// sub-script's completion value back. Delegations nest: a sub-script may
/// itself hold a `Delegation`.
pub struct Delegation<T> {
    sub: Box<dyn Script<Output = T>>,
}

/// Result of advancing a [`Delegation`]
pub enum Delegated<T> {
    /// The sub-script yielded; the parent re-yields the effect and keeps
    /// delegating
    Pending(Delegation<T>, Effect),
    /// The sub-script completed with this value
    Done(T),
}

impl<T> Delegation<T> {
    pub fn new(sub: impl Script<Output = T> + 'static) -> Self {
        Self { sub: Box::new(sub) }
    }

    /// Feed `input` to the sub-script and advance it once.
    pub fn resume(mut self, input: String) -> Delegated<T> {
        match self.sub.resume(input) {
            Step::Yield(effect) => Delegated::Pending(self, effect),
            Step::Return(value) => Delegated::Done(value),
        }
    }
}

/// A top-level script as the driver sees it.
///
/// Its completion value is an optional final effect, interpreted before the
/// driver stops.
pub type Conversation = Box<dyn Script<Output = Option<Effect>>>;

/// Builds one fresh conversation per connection
pub type ScriptFactory = Arc<dyn Fn() -> Conversation + Send + Sync>;

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always reports the same time
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// Factory for the reference bot using the system clock
pub fn bot_factory() -> ScriptFactory {
    Arc::new(|| Box::new(BotScript::new(Arc::new(SystemClock))) as Conversation)
}
