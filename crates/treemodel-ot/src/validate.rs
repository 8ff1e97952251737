//! Construction-time checks for positions, ranges and operations.
//!
//! The transform algorithm assumes well-formed input and never checks it.
//! Whoever builds operations from live content (the document layer, a
//! decoder of remote operations) runs these checks first.

use thiserror::Error;

use crate::operation::Operation;
use crate::position::{Position, RootId};
use crate::range::Range;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("position path is empty")]
    EmptyPath,
    #[error("range boundaries are in different roots: {start} and {end}")]
    RootMismatch { start: RootId, end: RootId },
    #[error("range start {start} is after its end {end}")]
    RangeOrder { start: Position, end: Position },
    #[error("range {0} is collapsed")]
    CollapsedRange(Range),
    #[error("insert operation carries no nodes")]
    EmptyContent,
    #[error("move operation moves zero nodes")]
    ZeroHowMany,
    #[error("move target {target} is inside the moved range")]
    MoveIntoItself { target: Position },
}

pub fn validate_position(position: &Position) -> Result<(), ValidationError> {
    if position.path.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    Ok(())
}

/// Checks both boundaries and their order. A collapsed range is valid here.
pub fn validate_range(range: &Range) -> Result<(), ValidationError> {
    validate_position(&range.start)?;
    validate_position(&range.end)?;
    if range.start.root != range.end.root {
        return Err(ValidationError::RootMismatch {
            start: range.start.root.clone(),
            end: range.end.root.clone(),
        });
    }
    if range.start.is_after(&range.end) {
        return Err(ValidationError::RangeOrder {
            start: range.start.clone(),
            end: range.end.clone(),
        });
    }
    Ok(())
}

pub fn validate_operation(op: &Operation) -> Result<(), ValidationError> {
    match op {
        Operation::Insert(insert) => {
            validate_position(&insert.position)?;
            if insert.nodes.is_empty() {
                return Err(ValidationError::EmptyContent);
            }
        }
        Operation::Move(mv) => {
            validate_position(&mv.source)?;
            validate_position(&mv.target)?;
            if mv.how_many == 0 {
                return Err(ValidationError::ZeroHowMany);
            }
            if mv.target.transformed_by_deletion(&mv.source, mv.how_many).is_none() {
                return Err(ValidationError::MoveIntoItself {
                    target: mv.target.clone(),
                });
            }
        }
        Operation::Attribute(attr) => {
            validate_range(&attr.range)?;
            if attr.range.is_collapsed() {
                return Err(ValidationError::CollapsedRange(attr.range.clone()));
            }
        }
        Operation::NoOp(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::operation::{AttributeOperation, InsertOperation, MoveOperation, NoOperation};
    use serde_json::json;

    fn pos(path: &[usize]) -> Position {
        Position::new("main", path.to_vec())
    }

    #[test]
    fn empty_path_is_rejected() {
        assert_eq!(validate_position(&pos(&[])), Err(ValidationError::EmptyPath));
        assert_eq!(validate_position(&pos(&[0])), Ok(()));
    }

    #[test]
    fn range_checks() {
        let mixed = Range::new(pos(&[0]), Position::new("other", vec![1]));
        assert!(matches!(validate_range(&mixed), Err(ValidationError::RootMismatch { .. })));
        let reversed = Range::new(pos(&[3]), pos(&[1]));
        assert!(matches!(validate_range(&reversed), Err(ValidationError::RangeOrder { .. })));
        assert_eq!(validate_range(&Range::new(pos(&[1]), pos(&[1]))), Ok(()));
    }

    #[test]
    fn operation_checks() {
        let insert = InsertOperation::new(pos(&[0]), vec![], 0);
        assert_eq!(validate_operation(&insert.into()), Err(ValidationError::EmptyContent));

        let zero = MoveOperation::new(pos(&[0]), 0, pos(&[3]), 0);
        assert_eq!(validate_operation(&zero.into()), Err(ValidationError::ZeroHowMany));

        let into_itself = MoveOperation::new(pos(&[1]), 2, pos(&[2, 0]), 0);
        assert!(matches!(
            validate_operation(&into_itself.into()),
            Err(ValidationError::MoveIntoItself { .. })
        ));

        let collapsed = AttributeOperation::new(
            Range::new(pos(&[2]), pos(&[2])),
            "bold",
            None,
            Some(json!(true)),
            0,
        );
        assert!(matches!(
            validate_operation(&collapsed.into()),
            Err(ValidationError::CollapsedRange(_))
        ));

        let fine = InsertOperation::new(pos(&[0]), Node::text("a"), 0);
        assert_eq!(validate_operation(&fine.into()), Ok(()));
        assert_eq!(validate_operation(&NoOperation::new(4).into()), Ok(()));
    }
}
