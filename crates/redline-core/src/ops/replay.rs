//! Applying a single logged operation to a store
//!
//! Every branch validates before it mutates, so a failed apply leaves the
//! store exactly as it was.

use std::collections::HashSet;

use redline_core_types::ElementId;

use crate::errors::{RedlineError, Result};
use crate::model::{Element, Operation, OperationData};

use super::store::ElementStore;

/// Apply `op` to `store`
///
/// # Errors
///
/// - `ElementNotFound` if an edit, delete or move targets a missing element
/// - `InvalidPosition` if an insert anchor is missing
/// - `DuplicateElementId` if an insert reuses a live ID
pub fn apply_operation(store: &mut ElementStore, op: &Operation) -> Result<()> {
    let id = op.element_id.as_str();
    match &op.data {
        OperationData::Edit {
            new_content,
            new_metadata,
            ..
        } => store.update(id, new_content, new_metadata.as_ref()),
        OperationData::Insert {
            content,
            metadata,
            position,
        } => {
            if store.contains(id) {
                return Err(RedlineError::DuplicateElementId {
                    element_id: id.to_string(),
                });
            }
            let at = store.resolve_position(position)?;
            store.insert_at(
                at,
                Element::new(op.element_id.clone(), content.clone(), metadata.clone()),
            )
        }
        OperationData::Delete { .. } => store.remove(id).map(|_| ()),
        OperationData::Move { to_index, .. } => {
            let last = store.len().saturating_sub(1);
            store.move_to(id, (*to_index).min(last)).map(|_| ())
        }
    }
}

/// Replay `ops` in order onto `store`
///
/// # Errors
///
/// Returns `CorruptOperationLog` with the index of the first operation that
/// fails to apply, or of an insert that reuses an ID already seen in the
/// original snapshot or an earlier insert. The store may hold a partial
/// replay in that case; callers replay into a scratch store.
pub fn replay_all(store: &mut ElementStore, ops: &[Operation]) -> Result<()> {
    let mut seen: HashSet<ElementId> = store.original().iter().map(|e| e.id.clone()).collect();
    for (index, op) in ops.iter().enumerate() {
        let corrupt = |err: RedlineError| RedlineError::CorruptOperationLog {
            index,
            reason: err.to_string(),
        };
        if matches!(op.data, OperationData::Insert { .. }) && !seen.insert(op.element_id.clone()) {
            return Err(corrupt(RedlineError::DuplicateElementId {
                element_id: op.element_id.to_string(),
            }));
        }
        apply_operation(store, op).map_err(corrupt)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementMetadata, InsertPosition};
    use redline_core_types::ElementId;

    fn store() -> ElementStore {
        ElementStore::new(vec![Element::para("p-1", "one"), Element::para("p-2", "two")]).unwrap()
    }

    #[test]
    fn test_insert_after_anchor() {
        let mut store = store();
        let op = Operation::new(
            ElementId::from("temp-1"),
            OperationData::Insert {
                content: "new".to_string(),
                metadata: ElementMetadata::para(),
                position: InsertPosition::After("p-1".into()),
            },
        );
        apply_operation(&mut store, &op).unwrap();
        assert_eq!(store.position_of("temp-1"), Some(1));
    }

    #[test]
    fn test_failed_insert_leaves_store_untouched() {
        let mut store = store();
        let op = Operation::new(
            ElementId::from("temp-1"),
            OperationData::Insert {
                content: "new".to_string(),
                metadata: ElementMetadata::para(),
                position: InsertPosition::Before("ghost".into()),
            },
        );
        assert!(apply_operation(&mut store, &op).is_err());
        assert_eq!(store.len(), 2);
        assert!(!store.is_reserved("temp-1"));
    }

    #[test]
    fn test_move_clamps_to_last_index() {
        let mut store = store();
        let op = Operation::new(
            ElementId::from("p-1"),
            OperationData::Move {
                from_index: 0,
                to_index: 40,
            },
        );
        apply_operation(&mut store, &op).unwrap();
        assert_eq!(store.position_of("p-1"), Some(1));
    }

    #[test]
    fn test_replay_reports_failing_index() {
        let mut store = store();
        let ops = vec![
            Operation::new(
                ElementId::from("p-1"),
                OperationData::Delete {
                    removed_content: "one".to_string(),
                    removed_metadata: ElementMetadata::para(),
                    index: 0,
                },
            ),
            Operation::new(
                ElementId::from("p-1"),
                OperationData::Delete {
                    removed_content: "one".to_string(),
                    removed_metadata: ElementMetadata::para(),
                    index: 0,
                },
            ),
        ];
        let err = replay_all(&mut store, &ops).unwrap_err();
        assert!(matches!(err, RedlineError::CorruptOperationLog { index: 1, .. }));
    }

    #[test]
    fn test_replay_rejects_insert_reusing_deleted_id() {
        let mut store = store();
        let ops = vec![
            Operation::new(
                ElementId::from("p-2"),
                OperationData::Delete {
                    removed_content: "two".to_string(),
                    removed_metadata: ElementMetadata::para(),
                    index: 1,
                },
            ),
            Operation::new(
                ElementId::from("p-2"),
                OperationData::Insert {
                    content: "imposter".to_string(),
                    metadata: ElementMetadata::para(),
                    position: InsertPosition::Index(0),
                },
            ),
        ];
        let err = replay_all(&mut store, &ops).unwrap_err();
        assert!(matches!(err, RedlineError::CorruptOperationLog { index: 1, .. }));
    }

    #[test]
    fn test_replay_rejects_second_insert_of_same_id() {
        let mut store = store();
        let insert = Operation::new(
            ElementId::from("temp-1"),
            OperationData::Insert {
                content: "new".to_string(),
                metadata: ElementMetadata::para(),
                position: InsertPosition::Index(0),
            },
        );
        let delete = Operation::new(
            ElementId::from("temp-1"),
            OperationData::Delete {
                removed_content: "new".to_string(),
                removed_metadata: ElementMetadata::para(),
                index: 0,
            },
        );
        let ops = vec![insert.clone(), delete, insert];
        let err = replay_all(&mut store, &ops).unwrap_err();
        assert!(matches!(err, RedlineError::CorruptOperationLog { index: 2, .. }));
    }
}
