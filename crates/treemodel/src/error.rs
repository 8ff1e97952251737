use thiserror::Error;
use treemodel_ot::{Position, RootId, ValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("operation expects version {expected}, document is at {actual}")]
    VersionMismatch { expected: u64, actual: u64 },
    #[error("root `{0}` not found")]
    RootNotFound(RootId),
    #[error("no node container at {0}")]
    InvalidPosition(Position),
    #[error("offset out of bounds at {0}")]
    OffsetOutOfBounds(Position),
    #[error("cannot move nodes into themselves (target {target})")]
    MoveIntoItself { target: Position },
    #[error("invalid operation: {0}")]
    InvalidOperation(ValidationError),
}

impl From<ValidationError> for DocumentError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MoveIntoItself { target } => DocumentError::MoveIntoItself { target },
            other => DocumentError::InvalidOperation(other),
        }
    }
}
