//! Property test: a channel behaves like a bounded FIFO queue.

use proptest::prelude::*;
use std::collections::VecDeque;
use tessera_icc::{Capacities, Region};
use tessera_records::Tick;

#[derive(Clone, Debug)]
enum Op {
    Send,
    Receive,
    Drain(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Send),
        3 => Just(Op::Receive),
        1 => (0usize..6).prop_map(Op::Drain),
    ]
}

proptest! {
    #[test]
    fn channel_matches_bounded_queue(capacity in 1u32..9, ops in prop::collection::vec(op(), 0..200)) {
        let region = Region::in_memory(Capacities::new(capacity, 1, 1, 1)).unwrap();
        let ticks = region.ticks();
        let mut model: VecDeque<i64> = VecDeque::new();
        let mut next = 0i64;

        for op in ops {
            match op {
                Op::Send => {
                    let accepted = ticks.try_send(&Tick::new("M", 0.0, 0.0, next));
                    prop_assert_eq!(accepted, model.len() < capacity as usize);
                    if accepted {
                        model.push_back(next);
                    }
                    next += 1;
                }
                Op::Receive => {
                    let got = ticks.try_receive().map(|t| t.time_ns);
                    prop_assert_eq!(got, model.pop_front());
                }
                Op::Drain(max) => {
                    let got: Vec<i64> = ticks.drain(max).iter().map(|t| t.time_ns).collect();
                    let want: Vec<i64> = (0..max.min(model.len()))
                        .filter_map(|_| model.pop_front())
                        .collect();
                    prop_assert_eq!(got, want);
                }
            }
            prop_assert_eq!(ticks.len(), model.len());
            prop_assert_eq!(ticks.is_full(), model.len() == capacity as usize);
            prop_assert!(ticks.produced() - ticks.consumed() <= capacity as u64);
        }
    }
}
