//! Base-version stamping for transform results.

use crate::operation::Operation;

/// Stamps `operations` with consecutive base versions starting right after
/// `base_version`, so a multi-operation result applies in the returned order.
pub fn sequence_versions(base_version: u64, mut operations: Vec<Operation>) -> Vec<Operation> {
    for (i, op) in operations.iter_mut().enumerate() {
        op.set_base_version(base_version + 1 + i as u64);
    }
    operations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::NoOperation;

    #[test]
    fn stamps_consecutive_versions() {
        let ops = vec![NoOperation::new(0).into(), NoOperation::new(0).into(), NoOperation::new(0).into()];
        let versions: Vec<u64> = sequence_versions(41, ops).iter().map(Operation::base_version).collect();
        assert_eq!(versions, vec![42, 43, 44]);
    }

    #[test]
    fn empty_batch_stays_empty() {
        assert!(sequence_versions(3, Vec::new()).is_empty());
    }
}
