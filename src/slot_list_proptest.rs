#![cfg(test)]

// Property tests for SlotList kept inside the crate next to the unit tests.

use crate::error::ListError;
use crate::position::Position;
use crate::slot_list::SlotList;
use proptest::prelude::*;
use std::collections::VecDeque;

const POISON: i32 = i32::MIN;

// Logical indices are drawn as raw numbers and reduced modulo the current
// length, so shrinking moves toward the front of the list.
#[derive(Clone, Debug)]
enum Op {
    InsertAt(usize, i32),
    Prepend(i32),
    Append(i32),
    Push(i32),
    RemoveAt(usize),
    RemoveFromTail(usize),
    Lookup(usize),
    Linearize,
    Grow(usize),
}

fn arb_value() -> impl Strategy<Value = i32> {
    (i32::MIN + 1)..i32::MAX
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (any::<usize>(), arb_value()).prop_map(|(k, v)| Op::InsertAt(k, v)),
        arb_value().prop_map(Op::Prepend),
        arb_value().prop_map(Op::Append),
        arb_value().prop_map(Op::Push),
        any::<usize>().prop_map(Op::RemoveAt),
        any::<usize>().prop_map(Op::RemoveFromTail),
        any::<usize>().prop_map(Op::Lookup),
        Just(Op::Linearize),
        (0usize..6).prop_map(Op::Grow),
    ];
    proptest::collection::vec(op, 1..80)
}

fn values(list: &SlotList<i32>) -> Vec<i32> {
    list.iter().map(|(_, v)| *v).collect()
}

/// Insert through the public API, tolerating a full list.
fn insert_or_full(
    list: &mut SlotList<i32>,
    value: i32,
    after: Position,
) -> Result<Option<Position>, TestCaseError> {
    match list.insert(value, after) {
        Ok(p) => Ok(Some(p)),
        Err(ListError::CapacityExceeded { capacity }) => {
            prop_assert_eq!(capacity, list.len() + 1, "only a full list may refuse");
            Ok(None)
        }
        Err(e) => Err(TestCaseError::fail(format!("unexpected error {e}"))),
    }
}

// Property: SlotList behaves like a VecDeque under arbitrary splices.
// Invariants checked after every step:
// - list order and length match the model; `validate()` stays clean;
// - capacity always exceeds length;
// - `find_position(i)` agrees with walking the list, from both ends, whether
//   or not the fast path is active;
// - after `linearize()`, element i sits in slot i + 1.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_slot_list_matches_deque(initial in 1usize..6, ops in arb_ops()) {
        let mut sut = SlotList::with_capacity(initial, POISON).unwrap();
        let mut model: VecDeque<i32> = VecDeque::new();

        for op in ops {
            match op {
                Op::InsertAt(raw, v) => {
                    let k = raw % (model.len() + 1);
                    let after = if k == 0 {
                        Position::SENTINEL
                    } else {
                        sut.find_position(k as isize - 1).unwrap()
                    };
                    if insert_or_full(&mut sut, v, after)?.is_some() {
                        model.insert(k, v);
                    }
                }
                Op::Prepend(v) => {
                    if insert_or_full(&mut sut, v, Position::SENTINEL)?.is_some() {
                        model.push_front(v);
                    }
                }
                Op::Append(v) => {
                    let tail = sut.tail();
                    if insert_or_full(&mut sut, v, tail)?.is_some() {
                        model.push_back(v);
                    }
                }
                Op::Push(v) => {
                    let p = sut.push(v).unwrap();
                    prop_assert_eq!(sut.tail(), p);
                    model.push_back(v);
                }
                Op::RemoveAt(raw) => {
                    if !model.is_empty() {
                        let k = raw % model.len();
                        let p = sut.find_position(k as isize).unwrap();
                        let got = sut.remove(p).unwrap();
                        prop_assert_eq!(Some(got), model.remove(k));
                        prop_assert!(sut.remove(p).is_err(), "double remove must fail");
                    }
                }
                Op::RemoveFromTail(raw) => {
                    if !model.is_empty() {
                        let k = raw % model.len();
                        let p = sut.find_position(-(k as isize) - 1).unwrap();
                        let got = sut.remove(p).unwrap();
                        prop_assert_eq!(Some(got), model.remove(model.len() - 1 - k));
                    }
                }
                Op::Lookup(raw) => {
                    if model.is_empty() {
                        prop_assert_eq!(sut.find_position(0).unwrap(), Position::SENTINEL);
                    } else {
                        let k = raw % model.len();
                        let p = sut.find_position(k as isize).unwrap();
                        prop_assert_eq!(*sut.get(p).unwrap(), model[k]);
                        let back = -((model.len() - k) as isize);
                        prop_assert_eq!(sut.find_position(back).unwrap(), p);
                    }
                    let len = model.len() as isize;
                    let too_far = sut.find_position(len.max(1));
                    prop_assert!(
                        matches!(too_far, Err(ListError::OutOfRange { .. })),
                        "index past the end must be rejected"
                    );
                }
                Op::Linearize => {
                    sut.linearize().unwrap();
                    prop_assert!(sut.is_linearized());
                    for i in 0..sut.len() {
                        prop_assert_eq!(sut.find_position(i as isize).unwrap().index(), i + 1);
                    }
                }
                Op::Grow(extra) => {
                    let cap = model.len() + 1 + extra;
                    sut.grow(cap).unwrap();
                    prop_assert_eq!(sut.capacity(), cap);
                    prop_assert!(sut.is_linearized());
                }
            }

            prop_assert_eq!(values(&sut), Vec::from(model.clone()));
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.capacity() > sut.len());
            prop_assert!(sut.validate().is_clean(), "defects: {}", sut.validate());
            let walked: Vec<Position> = sut.iter().map(|(p, _)| p).collect();
            for (i, &p) in walked.iter().enumerate() {
                prop_assert_eq!(sut.find_position(i as isize).unwrap(), p);
                prop_assert_eq!(sut.find_position(i as isize - walked.len() as isize).unwrap(), p);
            }
        }
    }
}

// Property: growth is invisible to list order regardless of how scrambled
// the physical layout was beforehand.
proptest! {
    #[test]
    fn prop_grow_preserves_order(fronts in proptest::collection::vec(any::<bool>(), 1..40)) {
        let mut sut = SlotList::with_capacity(fronts.len() + 1, POISON).unwrap();
        let mut model: VecDeque<i32> = VecDeque::new();
        for (i, &front) in fronts.iter().enumerate() {
            let v = i as i32;
            if front {
                let head = sut.head();
                sut.insert(v, head).unwrap();
                if model.is_empty() { model.push_back(v) } else { model.insert(1, v) }
            } else {
                sut.push(v).unwrap();
                model.push_back(v);
            }
        }
        let before = values(&sut);
        prop_assert_eq!(&before, &Vec::from(model));
        sut.grow(sut.capacity() * 2).unwrap();
        prop_assert_eq!(values(&sut), before);
        prop_assert!(sut.validate().is_clean());
    }
}
