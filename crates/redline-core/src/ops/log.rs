use crate::model::Operation;

/// Linear undo/redo history
///
/// `applied` is the cursor: the first `applied` entries are in effect, the
/// rest are the redo tail. Appending discards the redo tail.
#[derive(Debug, Clone, Default)]
pub struct OperationLog {
    entries: Vec<Operation>,
    applied: usize,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted entries
    ///
    /// `applied` is clamped to the entry count.
    pub fn from_parts(entries: Vec<Operation>, applied: usize) -> Self {
        let applied = applied.min(entries.len());
        Self { entries, applied }
    }

    /// Record a new operation, truncating any redo tail first
    pub fn append(&mut self, op: Operation) {
        self.entries.truncate(self.applied);
        self.entries.push(op);
        self.applied = self.entries.len();
    }

    /// Step the cursor back; false when nothing is applied
    pub fn undo(&mut self) -> bool {
        if self.applied == 0 {
            return false;
        }
        self.applied -= 1;
        true
    }

    /// Step the cursor forward; false when there is no redo tail
    pub fn redo(&mut self) -> bool {
        if self.applied >= self.entries.len() {
            return false;
        }
        self.applied += 1;
        true
    }

    /// Operations currently in effect, oldest first
    pub fn operations(&self) -> &[Operation] {
        &self.entries[..self.applied]
    }

    /// Every retained operation including the redo tail
    pub fn all_operations(&self) -> &[Operation] {
        &self.entries
    }

    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OperationData;
    use redline_core_types::ElementId;

    fn edit(id: &str, new: &str) -> Operation {
        Operation::new(
            ElementId::from(id),
            OperationData::Edit {
                old_content: String::new(),
                new_content: new.to_string(),
                old_metadata: None,
                new_metadata: None,
            },
        )
    }

    fn contents(ops: &[Operation]) -> Vec<&str> {
        ops.iter()
            .map(|op| match &op.data {
                OperationData::Edit { new_content, .. } => new_content.as_str(),
                _ => "",
            })
            .collect()
    }

    #[test]
    fn test_empty_log_cannot_move() {
        let mut log = OperationLog::new();
        assert!(!log.undo());
        assert!(!log.redo());
        assert!(log.operations().is_empty());
    }

    #[test]
    fn test_undo_then_redo() {
        let mut log = OperationLog::new();
        log.append(edit("p-1", "A"));
        log.append(edit("p-1", "B"));
        assert!(log.undo());
        assert_eq!(contents(log.operations()), vec!["A"]);
        assert_eq!(log.all_operations().len(), 2);
        assert!(log.redo());
        assert_eq!(contents(log.operations()), vec!["A", "B"]);
        assert!(!log.redo());
    }

    #[test]
    fn test_append_truncates_redo_tail() {
        let mut log = OperationLog::new();
        log.append(edit("p-1", "A"));
        log.append(edit("p-1", "B"));
        log.undo();
        log.append(edit("p-1", "C"));
        assert_eq!(contents(log.all_operations()), vec!["A", "C"]);
        assert!(!log.can_redo());
    }

    #[test]
    fn test_from_parts_clamps_cursor() {
        let log = OperationLog::from_parts(vec![edit("p-1", "A")], 5);
        assert_eq!(log.applied(), 1);
    }
}
