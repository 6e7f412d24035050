use proptest::prelude::*;

/// Asserts that all the given expressions are equal to the first.
#[macro_export]
macro_rules! assert_eq_all {
    ( $x:expr, $($y:expr),+ $(,)? ) => {{
        let x = $x;
        $( assert_eq!(x, $y); )+
    }};
}

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

#[allow(dead_code)]
pub(super) type U16Pairs = Vec<(u16, u16)>;

#[allow(dead_code)]
pub(super) type U16Seq = Vec<u16>;

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = U16Pairs> {
    prop::collection::vec((0u16..1024u16, 0u16..1024u16), 0..512)
}

#[allow(dead_code)]
pub(super) fn small_int_seq() -> impl Strategy<Value = U16Seq> {
    prop::collection::vec(0u16..1024u16, 0..512)
}

#[allow(dead_code)]
pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z]{0,2}", 0u16..1024u16), 0..512)
}

/// One step of a random workload run against a collection and a model.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub(super) enum Op {
    Insert(u16, u16),
    Assign(u16, u16),
    Remove(u16),
    EraseFound(u16),
}

#[allow(dead_code)]
pub(super) fn small_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (0u16..256, 0u16..1024).prop_map(|(k, v)| Op::Insert(k, v)),
            (0u16..256, 0u16..1024).prop_map(|(k, v)| Op::Assign(k, v)),
            (0u16..256).prop_map(Op::Remove),
            (0u16..256).prop_map(Op::EraseFound),
        ],
        0..512,
    )
}
