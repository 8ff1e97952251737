//! Transforming whole sequences of concurrent operations.
//!
//! [`transform`](crate::transform::transform) reconciles one pair. Real
//! sessions hold several pending local operations while several remote ones
//! arrive; every pending operation has to pass every intervening one, in
//! application order, with each intermediate result threaded into the next
//! step.

use crate::operation::Operation;
use crate::transform::transform;

/// Transforms two concurrent sequences against each other.
///
/// Both sequences start from the same document. Returns `(a', b')` where
/// `a'` applies after all of `b`, and `b'` after all of `a`. Each side is
/// stamped with consecutive base versions following the last operation of
/// the other side.
pub fn transform_sequences(
    a: &[Operation],
    b: &[Operation],
    is_strong: bool,
) -> (Vec<Operation>, Vec<Operation>) {
    let (a_after_b, b_after_a) = transform_pairwise(a, b, is_strong);
    let a_after_b = match b.last() {
        Some(last) => restamp(a_after_b, last.base_version() + 1),
        None => a_after_b,
    };
    let b_after_a = match a.last() {
        Some(last) => restamp(b_after_a, last.base_version() + 1),
        None => b_after_a,
    };
    (a_after_b, b_after_a)
}

/// Rewrites `pending` local operations so they apply after `applied`, the
/// authoritative operations that were applied in the meantime.
///
/// `applied` must be in application order. The result is stamped from the
/// version that follows the last applied operation.
pub fn rebase(pending: &[Operation], applied: &[Operation], is_strong: bool) -> Vec<Operation> {
    transform_sequences(pending, applied, is_strong).0
}

fn transform_pairwise(
    a: &[Operation],
    b: &[Operation],
    is_strong: bool,
) -> (Vec<Operation>, Vec<Operation>) {
    match (a, b) {
        ([], _) => (Vec::new(), b.to_vec()),
        (_, []) => (a.to_vec(), Vec::new()),
        ([x], [y]) => (transform(x, y, is_strong), transform(y, x, !is_strong)),
        ([_], [y, rest @ ..]) => {
            let (a1, y1) = transform_pairwise(a, std::slice::from_ref(y), is_strong);
            let (a2, rest1) = transform_pairwise(&a1, rest, is_strong);
            (a2, concat(y1, rest1))
        }
        ([x, rest @ ..], _) => {
            let (x1, b1) = transform_pairwise(std::slice::from_ref(x), b, is_strong);
            let (rest1, b2) = transform_pairwise(rest, &b1, is_strong);
            (concat(x1, rest1), b2)
        }
    }
}

fn concat(mut head: Vec<Operation>, tail: Vec<Operation>) -> Vec<Operation> {
    head.extend(tail);
    head
}

fn restamp(operations: Vec<Operation>, first_version: u64) -> Vec<Operation> {
    operations
        .into_iter()
        .enumerate()
        .map(|(i, op)| op.with_base_version(first_version + i as u64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::operation::{InsertOperation, MoveOperation};
    use crate::position::Position;

    fn pos(path: &[usize]) -> Position {
        Position::new("main", path.to_vec())
    }

    fn insert(offset: usize, text: &str, version: u64) -> Operation {
        InsertOperation::new(pos(&[offset]), Node::text(text), version).into()
    }

    fn position_of(op: &Operation) -> Position {
        match op {
            Operation::Insert(op) => op.position.clone(),
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn rebase_over_nothing_is_unchanged() {
        let pending = vec![insert(1, "a", 0)];
        assert_eq!(rebase(&pending, &[], true), pending);
    }

    #[test]
    fn rebase_threads_every_applied_operation() {
        // Local: insert "a" at 4, then "b" right after it.
        let pending = vec![insert(4, "a", 0), insert(5, "b", 1)];
        // Remote, applied first: two inserts before the local ones.
        let applied = vec![insert(0, "xy", 0), insert(1, "z", 1)];
        let rebased = rebase(&pending, &applied, false);
        assert_eq!(rebased.len(), 2);
        assert_eq!(position_of(&rebased[0]), pos(&[7]));
        assert_eq!(position_of(&rebased[1]), pos(&[8]));
        let versions: Vec<u64> = rebased.iter().map(Operation::base_version).collect();
        assert_eq!(versions, vec![2, 3]);
    }

    #[test]
    fn both_sides_are_restamped() {
        let a = vec![insert(0, "a", 5)];
        let b = vec![insert(3, "b", 5), insert(0, "c", 6)];
        let (a1, b1) = transform_sequences(&a, &b, true);
        assert_eq!(a1.iter().map(Operation::base_version).collect::<Vec<_>>(), vec![7]);
        assert_eq!(b1.iter().map(Operation::base_version).collect::<Vec<_>>(), vec![6, 7]);
        // "c" goes to the same slot as "a"; the strong side keeps it first.
        assert_eq!(position_of(&a1[0]), pos(&[0]));
        assert_eq!(position_of(&b1[1]), pos(&[1]));
    }

    #[test]
    fn split_results_keep_being_transformed() {
        // The local move gets split by the first remote insert; both pieces
        // must then pass the second remote insert.
        let pending: Vec<Operation> = vec![MoveOperation::new(pos(&[1]), 3, pos(&[8]), 0).into()];
        let applied = vec![insert(2, "x", 0), insert(0, "yy", 1)];
        let rebased = rebase(&pending, &applied, true);
        assert_eq!(rebased.len(), 2);
        let sources: Vec<Position> = rebased
            .iter()
            .map(|op| match op {
                Operation::Move(mv) => mv.source.clone(),
                other => panic!("expected move, got {other:?}"),
            })
            .collect();
        assert_eq!(sources, vec![pos(&[5]), pos(&[3])]);
    }
}
