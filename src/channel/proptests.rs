//! Property-based tests for the blocking channel
//!
//! Arbitrary interleavings of `put` and `take` must pair values with
//! requests in arrival order, and never lose or duplicate a value.

use super::*;
use futures::FutureExt;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Put,
    Take,
    /// Drop the oldest outstanding take without awaiting it
    Abandon,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Put), Just(Op::Take)]
}

fn arb_op_with_abandon() -> impl Strategy<Value = Op> {
    prop_oneof![3 => Just(Op::Put), 3 => Just(Op::Take), 1 => Just(Op::Abandon)]
}

fn assert_never_both_non_empty(channel: &BlockingChannel<u32>) -> Result<(), TestCaseError> {
    prop_assert!(
        !(channel.pending_takes() > 0 && !channel.is_empty()),
        "pending takes ({}) and buffered values ({}) coexist",
        channel.pending_takes(),
        channel.len()
    );
    Ok(())
}

/// Resolve every remaining buffered value through fresh takes
fn drain(channel: &BlockingChannel<u32>, delivered: &mut Vec<u32>) {
    while !channel.is_empty() {
        if let Some(value) = channel.take().now_or_never() {
            delivered.push(value);
        }
    }
}

proptest! {
    #[test]
    fn prop_kth_take_receives_kth_put(ops in proptest::collection::vec(arb_op(), 0..64)) {
        let channel = BlockingChannel::new();
        let mut takes = Vec::new();
        let mut next_value = 0u32;

        for op in ops {
            match op {
                Op::Put => {
                    channel.put(next_value);
                    next_value += 1;
                }
                Op::Take => takes.push(channel.take()),
                Op::Abandon => unreachable!(),
            }
            assert_never_both_non_empty(&channel)?;
        }

        let take_count = takes.len();
        let resolved: Vec<u32> = takes
            .into_iter()
            .map_while(FutureExt::now_or_never)
            .collect();

        let matched = take_count.min(next_value as usize);
        prop_assert_eq!(resolved.len(), matched);
        let expected: Vec<u32> = (0..next_value).take(matched).collect();
        prop_assert_eq!(resolved, expected);
        prop_assert_eq!(channel.len(), next_value as usize - matched);
    }

    #[test]
    fn prop_every_value_delivered_exactly_once(
        ops in proptest::collection::vec(arb_op_with_abandon(), 0..64)
    ) {
        let channel = BlockingChannel::new();
        let mut outstanding = std::collections::VecDeque::new();
        let mut next_value = 0u32;

        for op in ops {
            match op {
                Op::Put => {
                    channel.put(next_value);
                    next_value += 1;
                }
                Op::Take => outstanding.push_back(channel.take()),
                Op::Abandon => {
                    outstanding.pop_front();
                }
            }
            assert_never_both_non_empty(&channel)?;
        }

        let mut delivered: Vec<u32> = outstanding
            .into_iter()
            .filter_map(FutureExt::now_or_never)
            .collect();
        drain(&channel, &mut delivered);

        delivered.sort_unstable();
        let expected: Vec<u32> = (0..next_value).collect();
        prop_assert_eq!(delivered, expected);
    }
}
