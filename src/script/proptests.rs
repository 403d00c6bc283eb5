//! Property-based tests for conversation scripts

use super::*;
use proptest::prelude::*;

fn fixed_bot() -> BotScript {
    let time = NaiveTime::from_hms_opt(12, 34, 56).unwrap();
    BotScript::new(Arc::new(FixedClock(time)))
}

fn arb_message() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("what time is it".to_string()),
        Just("let's sum".to_string()),
        Just("done".to_string()),
        (-1000i32..1000).prop_map(|n| n.to_string()),
        "[a-zA-Z ]{0,20}",
    ]
}

/// Step a script, feeding it the next input whenever it listens.
struct Session<S> {
    script: S,
    pending: String,
    effects: Vec<Effect>,
}

impl<S: Script<Output = Option<Effect>>> Session<S> {
    fn new(script: S) -> Self {
        Self {
            script,
            pending: String::new(),
            effects: Vec::new(),
        }
    }

    /// Run until the script listens, then hand it `message`.
    fn deliver(&mut self, message: &str) {
        loop {
            match self.script.resume(std::mem::take(&mut self.pending)) {
                Step::Yield(Effect::Listen) => {
                    self.effects.push(Effect::Listen);
                    self.pending = message.to_string();
                    return;
                }
                Step::Yield(effect) => self.effects.push(effect),
                Step::Return(_) => return,
            }
        }
    }

    /// Run to the next listen without delivering anything new.
    fn settle(&mut self) {
        while let Step::Yield(effect) = self.script.resume(std::mem::take(&mut self.pending)) {
            let listening = effect == Effect::Listen;
            self.effects.push(effect);
            if listening {
                return;
            }
        }
    }
}

fn transcript(messages: &[String]) -> Vec<Effect> {
    let mut session = Session::new(fixed_bot());
    for message in messages {
        session.deliver(message);
    }
    session.settle();
    session.effects
}

proptest! {
    #[test]
    fn prop_same_inputs_same_effects(messages in proptest::collection::vec(arb_message(), 0..30)) {
        prop_assert_eq!(transcript(&messages), transcript(&messages));
    }

    #[test]
    fn prop_every_message_gets_exactly_one_reply(
        messages in proptest::collection::vec(arb_message(), 0..30)
    ) {
        let effects = transcript(&messages);
        // welcome, listen, then (reply, listen) per message
        prop_assert_eq!(effects.len(), 2 + 2 * messages.len());
        for (i, effect) in effects.iter().enumerate() {
            if i % 2 == 0 {
                prop_assert!(matches!(effect, Effect::Say { .. }), "expected say at {}, got {:?}", i, effect);
            } else {
                prop_assert_eq!(effect, &Effect::Listen);
            }
        }
    }

    #[test]
    fn prop_interleaved_instances_are_isolated(
        left in proptest::collection::vec(arb_message(), 0..20),
        right in proptest::collection::vec(arb_message(), 0..20),
    ) {
        let mut a = Session::new(fixed_bot());
        let mut b = Session::new(fixed_bot());
        for i in 0..left.len().max(right.len()) {
            if let Some(message) = left.get(i) {
                a.deliver(message);
            }
            if let Some(message) = right.get(i) {
                b.deliver(message);
            }
        }
        a.settle();
        b.settle();

        prop_assert_eq!(a.effects, transcript(&left));
        prop_assert_eq!(b.effects, transcript(&right));
    }
}
