use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::json;
use treemodel_ot::codec::{from_json, to_json};
use treemodel_ot::{
    transform, AttributeOperation, InsertOperation, MoveOperation, NoOperation, Node, Operation,
    Position, Range,
};

fn position() -> impl Strategy<Value = Position> {
    (
        prop::sample::select(vec!["main", "title"]),
        prop::collection::vec(0usize..6, 1..=3),
    )
        .prop_map(|(root, path)| Position::new(root, path))
}

fn node() -> impl Strategy<Value = Node> {
    let character = (prop::char::range('a', 'e'), any::<bool>()).prop_map(|(ch, bold)| {
        let node = Node::character(ch);
        if bold {
            node.with_attribute("bold", json!(true))
        } else {
            node
        }
    });
    character.prop_recursive(2, 8, 3, |inner| {
        prop::collection::vec(inner, 0..3).prop_map(|children| Node::element("p", children))
    })
}

/// Operations anywhere in a small two-root tree.
fn any_op() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (position(), prop::collection::vec(node(), 1..4))
            .prop_map(|(at, nodes)| Operation::from(InsertOperation::new(at, nodes, 0))),
        (position(), 1usize..4, position())
            .prop_map(|(source, n, target)| Operation::from(MoveOperation::new(source, n, target, 0))),
        (position(), 1usize..4, prop::option::of(any::<bool>()), prop::option::of(any::<bool>()))
            .prop_map(|(start, width, old, new)| {
                let range = Range::from_position_and_shift(&start, width);
                Operation::from(AttributeOperation::new(
                    range,
                    "bold",
                    old.map(|v| json!(v)),
                    new.map(|v| json!(v)),
                    0,
                ))
            }),
        Just(Operation::from(NoOperation::new(0))),
    ]
}

fn covered(ranges: impl IntoIterator<Item = (usize, usize)>) -> BTreeSet<usize> {
    ranges.into_iter().flat_map(|(start, end)| start..end).collect()
}

proptest! {
    #[test]
    fn transform_by_noop_is_identity(a in any_op(), version in 0u64..100, is_strong in any::<bool>()) {
        let a = a.with_base_version(version);
        let noop = Operation::from(NoOperation::new(version));
        prop_assert_eq!(transform(&a, &noop, is_strong), vec![a.clone().with_base_version(version + 1)]);
    }

    #[test]
    fn results_are_never_empty_and_versions_are_consecutive(
        a in any_op(),
        b in any_op(),
        version in 0u64..100,
        is_strong in any::<bool>(),
    ) {
        let a = a.with_base_version(version);
        let b = b.with_base_version(version);
        let result = transform(&a, &b, is_strong);
        prop_assert!(!result.is_empty());
        for (i, op) in result.iter().enumerate() {
            prop_assert_eq!(op.base_version(), version + 1 + i as u64);
        }
    }

    #[test]
    fn transform_does_not_touch_its_inputs(a in any_op(), b in any_op(), is_strong in any::<bool>()) {
        let (a0, b0) = (a.clone(), b.clone());
        let _ = transform(&a, &b, is_strong);
        prop_assert_eq!(a, a0);
        prop_assert_eq!(b, b0);
    }

    #[test]
    fn attribute_split_by_insert_covers_original_range(
        start in 0usize..10,
        width in 1usize..6,
        at in 0usize..16,
        count in 1usize..4,
    ) {
        let main = |offset: usize| Position::new("main", vec![offset]);
        let a = Operation::from(AttributeOperation::new(
            Range::new(main(start), main(start + width)),
            "bold",
            None,
            Some(json!(true)),
            0,
        ));
        let insert = main(at);
        let b = Operation::from(InsertOperation::new(insert.clone(), Node::text(&"x".repeat(count)), 0));

        let mut restored = Vec::new();
        for op in transform(&a, &b, true) {
            let Operation::Attribute(op) = op else {
                return Err(TestCaseError::fail("expected attribute operations"));
            };
            let start = op.range.start.transformed_by_deletion(&insert, count);
            let end = op.range.end.transformed_by_deletion(&insert, count);
            // Boundaries never fall inside the inserted nodes.
            prop_assert!(start.is_some() && end.is_some());
            if let (Some(start), Some(end)) = (start, end) {
                restored.push((start.offset(), end.offset()));
            }
        }
        prop_assert_eq!(covered(restored), covered([(start, start + width)]));
    }

    #[test]
    fn codec_round_trips(op in any_op(), version in 0u64..1000) {
        let op = op.with_base_version(version);
        prop_assert_eq!(from_json(&to_json(&op)), Ok(op.clone()));
    }
}
