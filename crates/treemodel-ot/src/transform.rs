//! Pairwise operational transformation.
//!
//! [`transform`] rewrites an operation `a` so it can be applied to the
//! document after another operation `b` has already been applied to it.
//! Applying `b` then `transform(a, b, s)` yields the same document as applying
//! `a` then `transform(b, a, !s)`.
//!
//! `is_strong` breaks ties: when both operations want the same thing (the
//! same insertion slot, the same attribute, the same nodes) the strong side
//! wins.

use tracing::{debug, trace};

use crate::operation::{
    AttributeOperation, InsertOperation, MoveOperation, NoOperation, Operation,
};
use crate::position::{compare_paths, PathRelation, Position};
use crate::range::{join_ranges, Range};
use crate::version::sequence_versions;

// ── Entry point ───────────────────────────────────────────────────────────

/// Transforms `a` by `b`, which has already been applied.
///
/// Always returns at least one operation. Results are fresh values stamped
/// with base versions `a.base_version() + 1`, `+ 2`, ...
pub fn transform(a: &Operation, b: &Operation, is_strong: bool) -> Vec<Operation> {
    let transformed = match (a, b) {
        (Operation::Insert(x), Operation::Insert(y)) => vec![insert_by_insert(x, y, is_strong)],
        (Operation::Insert(x), Operation::Move(y)) => vec![insert_by_move(x, y, is_strong)],
        (Operation::Attribute(x), Operation::Insert(y)) => attribute_by_insert(x, y),
        (Operation::Attribute(x), Operation::Attribute(y)) => {
            attribute_by_attribute(x, y, is_strong)
        }
        (Operation::Attribute(x), Operation::Move(y)) => attribute_by_move(x, y),
        (Operation::Move(x), Operation::Insert(y)) => move_by_insert(x, y, is_strong),
        (Operation::Move(x), Operation::Move(y)) => move_by_move(x, y, is_strong),
        // Attribute changes never move positions.
        (Operation::Insert(_), Operation::Attribute(_))
        | (Operation::Move(_), Operation::Attribute(_)) => pass_through(a),
        (Operation::NoOp(_), _) | (_, Operation::NoOp(_)) => pass_through(a),
    };
    trace!(
        a = a.kind().as_str(),
        b = b.kind().as_str(),
        is_strong,
        results = transformed.len(),
        "transformed operation"
    );
    sequence_versions(a.base_version(), transformed)
}

/// Fallback for pairs that do not affect each other: `a`, unchanged.
fn pass_through(a: &Operation) -> Vec<Operation> {
    vec![a.clone()]
}

// ── Insert ────────────────────────────────────────────────────────────────

fn insert_by_insert(a: &InsertOperation, b: &InsertOperation, is_strong: bool) -> Operation {
    let mut transformed = a.clone();
    transformed.position = a
        .position
        .transformed_by_insertion(&b.position, b.node_count(), !is_strong);
    Operation::Insert(transformed)
}

fn insert_by_move(a: &InsertOperation, b: &MoveOperation, is_strong: bool) -> Operation {
    let mut transformed = a.clone();
    transformed.position = position_after_move(&a.position, b, !is_strong);
    Operation::Insert(transformed)
}

// ── Attribute ─────────────────────────────────────────────────────────────

fn attribute_by_insert(a: &AttributeOperation, b: &InsertOperation) -> Vec<Operation> {
    let ranges = a.range.spread_by_insertion(&b.position, b.node_count());
    attributes_over(a, ranges)
}

fn attribute_by_attribute(
    a: &AttributeOperation,
    b: &AttributeOperation,
    is_strong: bool,
) -> Vec<Operation> {
    if !a.conflicts_with(b) {
        return vec![Operation::Attribute(a.clone())];
    }

    // The part `b` did not touch keeps `a`'s change as is.
    let mut operations: Vec<Operation> = a
        .range
        .difference(&b.range)
        .into_iter()
        .map(|range| Operation::Attribute(with_range(a, range)))
        .collect();

    // The shared part already holds `b`'s value; only a strong `a` overrides it.
    if is_strong {
        if let Some(common) = a.range.intersection(&b.range) {
            let mut overriding = with_range(a, common);
            overriding.old_value = b.new_value.clone();
            operations.push(Operation::Attribute(overriding));
        }
    }

    if operations.is_empty() {
        operations.push(Operation::NoOp(NoOperation::new(a.base_version)));
    }
    operations
}

fn attribute_by_move(a: &AttributeOperation, b: &MoveOperation) -> Vec<Operation> {
    let moved = b.source_range();
    let moved_start = b.moved_range_start();
    let mut ranges = Vec::new();

    // Outside the moved nodes. The joined span may cover the moved nodes
    // too; that gap disappears with the deletion below.
    if let Some(difference) = join_ranges(a.range.difference(&moved)) {
        let detached = Range::new(
            detached_position(&difference.start, b),
            detached_position(&difference.end, b),
        );
        ranges.extend(detached.spread_by_insertion(&moved_start, b.how_many));
    }

    // Inside the moved nodes: follow them to their new place.
    if let Some(common) = a.range.intersection(&moved) {
        ranges.push(Range::new(
            common.start.combined(&b.source, &moved_start),
            common.end.combined(&b.source, &moved_start),
        ));
    }

    attributes_over(a, ranges)
}

fn with_range(a: &AttributeOperation, range: Range) -> AttributeOperation {
    AttributeOperation {
        range,
        ..a.clone()
    }
}

fn attributes_over(a: &AttributeOperation, ranges: Vec<Range>) -> Vec<Operation> {
    let operations: Vec<Operation> = ranges
        .into_iter()
        .filter(|range| !range.is_collapsed())
        .map(|range| Operation::Attribute(with_range(a, range)))
        .collect();
    if operations.is_empty() {
        return vec![Operation::NoOp(NoOperation::new(a.base_version))];
    }
    operations
}

// ── Move ──────────────────────────────────────────────────────────────────

fn move_by_insert(a: &MoveOperation, b: &InsertOperation, is_strong: bool) -> Vec<Operation> {
    let target = a
        .target
        .transformed_by_insertion(&b.position, b.node_count(), !is_strong);
    let ranges = a
        .source_range()
        .transformed_by_insertion(&b.position, b.node_count());
    moves_to(ranges, target, a.base_version)
}

fn move_by_move(a: &MoveOperation, b: &MoveOperation, is_strong: bool) -> Vec<Operation> {
    // Each move targets the inside of the other's moved nodes. Both cannot
    // happen; undo `b` instead.
    if targets_moved_range(a, b) && targets_moved_range(b, a) {
        debug!(
            a_target = %a.target,
            b_target = %b.target,
            "moves target each other's moved nodes, reverting the applied move"
        );
        return vec![Operation::Move(b.reversed())];
    }

    let range_a = a.source_range();
    let range_b = b.source_range();
    let b_moved_start = b.moved_range_start();
    let difference = join_ranges(range_a.difference(&range_b));

    // Nodes moved by both. When `a` moves nodes nested inside what `b` moved
    // there is no conflict; otherwise the weak side gives them up.
    let is_deeper =
        compare_paths(b.source.parent_path(), a.source.parent_path()) == PathRelation::Prefix;
    let common = if is_deeper || is_strong {
        range_a.intersection(&range_b)
    } else {
        None
    };
    let common_first = match (&difference, &common) {
        (Some(difference), Some(common)) => common.start.is_before(&difference.start),
        _ => false,
    };

    // Collected in the order the pieces had before `b` was applied.
    let mut ranges = Vec::new();
    if let Some(difference) = difference {
        let detached = Range::new(
            detached_position(&difference.start, b),
            detached_position(&difference.end, b),
        );
        ranges.extend(detached.transformed_by_insertion(&b_moved_start, b.how_many));
    }
    if let Some(common) = common {
        let moved = Range::new(
            common.start.combined(&b.source, &b_moved_start),
            common.end.combined(&b.source, &b_moved_start),
        );
        if common_first {
            ranges.insert(0, moved);
        } else {
            ranges.push(moved);
        }
    }

    let target = position_after_move(&a.target, b, !is_strong);
    moves_to(ranges, target, a.base_version)
}

fn targets_moved_range(a: &MoveOperation, b: &MoveOperation) -> bool {
    a.target
        .transformed_by_deletion(&b.source, b.how_many)
        .is_none()
}

/// One move per range, all landing at `target`.
///
/// `ranges` come in the order their nodes had in the document `a` was
/// computed against; the moves are emitted last range first. Every move
/// after the first is expressed in the document left by the ones before it
/// and lands in front of them, so the batch applies in the returned order and
/// the pieces end up in their original order.
fn moves_to(mut ranges: Vec<Range>, target: Position, base_version: u64) -> Vec<Operation> {
    ranges.retain(|range| !range.is_collapsed());
    if ranges.is_empty() {
        return vec![Operation::NoOp(NoOperation::new(base_version))];
    }

    let mut moves: Vec<MoveOperation> = Vec::with_capacity(ranges.len());
    for range in ranges.into_iter().rev() {
        let how_many = range.width();
        let mut source = range.start;
        let mut target = target.clone();
        for previous in &moves {
            source = position_after_move(&source, previous, true);
            target = position_after_move(&target, previous, false);
        }
        moves.push(MoveOperation::new(source, how_many, target, base_version));
    }
    moves.into_iter().map(Operation::Move).collect()
}

// ── Position helpers ──────────────────────────────────────────────────────

/// Where `position` ends up once `mv` has been applied.
///
/// Positions inside the moved nodes travel with them. A position strictly
/// between the moved nodes, on their own level, stays in the slot the nodes
/// left behind.
fn position_after_move(position: &Position, mv: &MoveOperation, insert_before: bool) -> Position {
    let moved_start = mv.moved_range_start();
    match position.transformed_by_deletion(&mv.source, mv.how_many) {
        Some(detached) => detached.transformed_by_insertion(&moved_start, mv.how_many, insert_before),
        None if position.is_inside_nodes(&mv.source, mv.how_many) => {
            position.combined(&mv.source, &moved_start)
        }
        // Not recombined: Move x Insert splits the moved nodes around it instead.
        None => mv
            .source
            .transformed_by_insertion(&moved_start, mv.how_many, insert_before),
    }
}

/// Range boundary after the nodes of `mv` were detached. Boundaries of a
/// difference never fall inside the detached nodes.
fn detached_position(position: &Position, mv: &MoveOperation) -> Position {
    position
        .transformed_by_deletion(&mv.source, mv.how_many)
        .unwrap_or_else(|| mv.source.clone())
}
