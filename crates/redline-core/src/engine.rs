//! Change-tracking orchestrator
//!
//! [`ChangeEngine`] owns the element store, the operation log and the diff
//! engine. It is the only writer to either: every public mutator validates
//! against the live sequence, mutates the store, then appends one operation.
//!
//! ## Logging
//!
//! Public mutators emit `log_op_start!` at entry and `log_op_end!` or
//! `log_op_error!` on exit. The store, log and diff layers only use
//! `tracing::debug!`/`trace!`.
//!
//! ## Undo and redo
//!
//! Undo and redo move the log cursor and then rebuild the live sequence by
//! replaying the active operations from the original snapshot. Element
//! baselines are cleared so tracked output is recomputed from the original.

use std::collections::HashMap;
use std::time::Instant;

use redline_core_types::{ElementId, OperationId};

use crate::commands::{Command, CommandOutcome};
use crate::config::EngineConfig;
use crate::diff::DiffEngine;
use crate::errors::{RedlineError, Result};
use crate::markup::{self, strip_tracked_markup, StripMode};
use crate::model::{Element, ElementMetadata, InsertPosition, Operation, OperationData};
use crate::ops::{replay_all, ElementStore, OperationLog};
use crate::snapshot::{SessionSnapshot, SNAPSHOT_VERSION};
use crate::summary;
use crate::{log_op_end, log_op_error, log_op_start};

/// Optional inputs to [`ChangeEngine::edit_with`]
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    /// Replacement metadata; recorded only when it differs from the current one
    pub metadata: Option<ElementMetadata>,
    pub source: Option<String>,
}

/// One piece of a split element, see [`ChangeEngine::replace_with_segments`]
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub content: String,
    pub metadata: ElementMetadata,
}

impl Segment {
    pub fn new(content: impl Into<String>, metadata: ElementMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeEngine {
    store: ElementStore,
    log: OperationLog,
    diff: DiffEngine,
    config: EngineConfig,
    saved: bool,
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn render_markdown(elements: &[Element]) -> String {
    elements
        .iter()
        .map(|e| e.content.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl ChangeEngine {
    /// Create an engine over `elements` with the default configuration
    ///
    /// # Errors
    ///
    /// Returns `DuplicateElementId` if two elements share an ID.
    pub fn new(elements: Vec<Element>) -> Result<Self> {
        Self::with_config(elements, EngineConfig::default())
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` fails validation, or
    /// `DuplicateElementId` if two elements share an ID.
    pub fn with_config(elements: Vec<Element>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let store = ElementStore::new(elements)?;
        tracing::debug!(elements = store.len(), "change engine created");
        Ok(Self {
            store,
            log: OperationLog::new(),
            diff: DiffEngine::from_config(&config),
            config,
            saved: true,
        })
    }

    /// Rebuild an engine from a persisted session
    ///
    /// The whole log, redo tail included, must replay cleanly against the
    /// original snapshot; nothing is restored otherwise.
    ///
    /// # Errors
    ///
    /// - `CorruptOperationLog` if any operation fails to replay
    /// - `Serialization` for an unsupported session version
    /// - `InvalidConfig` or `DuplicateElementId` as for [`ChangeEngine::with_config`]
    pub fn restore(snapshot: SessionSnapshot, config: EngineConfig) -> Result<Self> {
        log_op_start!(
            "restore",
            operations = snapshot.operations.len(),
            applied = snapshot.applied
        );
        let start = Instant::now();

        let engine = Self::restore_impl(snapshot, config).map_err(|e| {
            log_op_error!("restore", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!(
            "restore",
            duration_ms = elapsed_ms(start),
            elements = engine.store.len()
        );
        Ok(engine)
    }

    fn restore_impl(snapshot: SessionSnapshot, config: EngineConfig) -> Result<Self> {
        snapshot.validate_header()?;
        let SessionSnapshot {
            elements,
            operations,
            applied,
            ..
        } = snapshot;

        let mut engine = Self::with_config(elements, config)?;

        let mut scratch = engine.store.clone();
        replay_all(&mut scratch, &operations)?;

        let mut store = engine.store.clone();
        replay_all(&mut store, &operations[..applied])?;

        engine.store = store;
        engine.log = OperationLog::from_parts(operations, applied);
        Ok(engine)
    }

    /// Capture the original snapshot and full log for persistence
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            elements: self.store.original().to_vec(),
            operations: self.log.all_operations().to_vec(),
            applied: self.log.applied(),
        }
    }

    /// Replace the log with `ops` and re-derive current state
    ///
    /// State is rebuilt by replaying `ops` against the original snapshot.
    /// On failure the engine is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `CorruptOperationLog` naming the first operation that does not
    /// apply.
    pub fn initialize_with_operations(&mut self, ops: Vec<Operation>) -> Result<()> {
        log_op_start!("initialize_with_operations", operations = ops.len());
        let start = Instant::now();

        let mut store = self.store.clone();
        store.reset_to_original();
        store.clear_baselines();
        replay_all(&mut store, &ops).map_err(|e| {
            log_op_error!(
                "initialize_with_operations",
                e.clone(),
                duration_ms = elapsed_ms(start)
            );
            e
        })?;

        let applied = ops.len();
        self.store = store;
        self.log = OperationLog::from_parts(ops, applied);
        self.saved = true;

        log_op_end!(
            "initialize_with_operations",
            duration_ms = elapsed_ms(start),
            applied = applied
        );
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn diff_engine(&self) -> &DiffEngine {
        &self.diff
    }

    fn record(&mut self, element_id: ElementId, data: OperationData, source: Option<String>) -> OperationId {
        let op = Operation::new(element_id, data)
            .with_user(self.config.user_id.clone())
            .with_source(source);
        let id = op.id.clone();
        tracing::debug!(
            operation_id = %id,
            element_id = %op.element_id,
            kind = op.kind().as_str(),
            "operation recorded"
        );
        self.log.append(op);
        self.saved = false;
        id
    }

    // ===== Mutators =====

    /// Replace an element's content
    ///
    /// Returns `Ok(None)` when the content is unchanged; no operation is
    /// recorded in that case.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live. The log is not touched.
    pub fn edit(&mut self, id: &str, new_content: &str) -> Result<Option<OperationId>> {
        self.edit_with(id, new_content, EditOptions::default())
    }

    /// [`ChangeEngine::edit`] with optional metadata and source tag
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn edit_with(
        &mut self,
        id: &str,
        new_content: &str,
        options: EditOptions,
    ) -> Result<Option<OperationId>> {
        log_op_start!("edit", element_id = id);
        let start = Instant::now();

        let result = self.edit_impl(id, new_content, options).map_err(|e| {
            log_op_error!("edit", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!(
            "edit",
            duration_ms = elapsed_ms(start),
            element_id = id,
            recorded = result.is_some()
        );
        Ok(result)
    }

    fn edit_impl(
        &mut self,
        id: &str,
        new_content: &str,
        options: EditOptions,
    ) -> Result<Option<OperationId>> {
        let current = self.store.require(id)?;
        let old_content = current.content.clone();
        let old_metadata = current.metadata.clone();
        let element_id = current.id.clone();

        let new_metadata = options.metadata.filter(|m| *m != old_metadata);
        if old_content == new_content && new_metadata.is_none() {
            tracing::debug!(element_id = id, "edit leaves element unchanged, skipping");
            return Ok(None);
        }

        self.store.update(id, new_content, new_metadata.as_ref())?;
        let data = OperationData::Edit {
            old_content,
            new_content: new_content.to_string(),
            old_metadata: new_metadata.as_ref().map(|_| old_metadata),
            new_metadata,
        };
        Ok(Some(self.record(element_id, data, options.source)))
    }

    /// Content of an element with its comments lifted out, for editing
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn editable_content(&self, id: &str) -> Result<String> {
        let element = self.store.require(id)?;
        Ok(markup::extract(&element.content).0)
    }

    /// Edit the comment-free text of an element, keeping its comments
    ///
    /// Comments in the current content are extracted, `new_content` replaces
    /// the remaining text, and the comments are reattached.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn edit_segment(&mut self, id: &str, new_content: &str) -> Result<Option<OperationId>> {
        let (_, comments) = match self.store.get(id) {
            Some(element) => markup::extract(&element.content),
            None => (String::new(), Vec::new()),
        };
        let merged = markup::reattach(new_content, &comments);
        self.edit(id, &merged)
    }

    /// Insert a new element and return its generated ID
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition` if an `after`/`before` anchor is not live.
    pub fn insert(
        &mut self,
        content: &str,
        metadata: ElementMetadata,
        position: InsertPosition,
    ) -> Result<ElementId> {
        self.insert_with(content, metadata, position, None)
    }

    /// [`ChangeEngine::insert`] with a source tag
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition` if an `after`/`before` anchor is not live.
    pub fn insert_with(
        &mut self,
        content: &str,
        metadata: ElementMetadata,
        position: InsertPosition,
        source: Option<String>,
    ) -> Result<ElementId> {
        log_op_start!("insert", position = ?position);
        let start = Instant::now();

        let id = self
            .insert_impl(content, metadata, position, source)
            .map_err(|e| {
                log_op_error!("insert", e.clone(), duration_ms = elapsed_ms(start));
                e
            })?;

        log_op_end!(
            "insert",
            duration_ms = elapsed_ms(start),
            element_id = id.as_str()
        );
        Ok(id)
    }

    fn insert_impl(
        &mut self,
        content: &str,
        metadata: ElementMetadata,
        position: InsertPosition,
        source: Option<String>,
    ) -> Result<ElementId> {
        let at = self.store.resolve_position(&position)?;
        let id = self.store.fresh_id();
        self.store
            .insert_at(at, Element::new(id.clone(), content, metadata.clone()))?;
        let data = OperationData::Insert {
            content: content.to_string(),
            metadata,
            position,
        };
        self.record(id.clone(), data, source);
        Ok(id)
    }

    /// Remove an element; its ID stays reserved
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn delete(&mut self, id: &str) -> Result<OperationId> {
        self.delete_with(id, None)
    }

    /// [`ChangeEngine::delete`] with a source tag
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn delete_with(&mut self, id: &str, source: Option<String>) -> Result<OperationId> {
        log_op_start!("delete", element_id = id);
        let start = Instant::now();

        let result = self
            .store
            .remove(id)
            .map(|(index, removed)| {
                let data = OperationData::Delete {
                    removed_content: removed.content,
                    removed_metadata: removed.metadata,
                    index,
                };
                self.record(removed.id, data, source)
            })
            .map_err(|e| {
                log_op_error!("delete", e.clone(), duration_ms = elapsed_ms(start));
                e
            })?;

        log_op_end!("delete", duration_ms = elapsed_ms(start), element_id = id);
        Ok(result)
    }

    /// Move an element to `to_index`, clamped to the last position
    ///
    /// Returns `Ok(None)` when the element is already there.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn move_element(&mut self, id: &str, to_index: usize) -> Result<Option<OperationId>> {
        self.move_with(id, to_index, None)
    }

    /// [`ChangeEngine::move_element`] with a source tag
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn move_with(
        &mut self,
        id: &str,
        to_index: usize,
        source: Option<String>,
    ) -> Result<Option<OperationId>> {
        log_op_start!("move", element_id = id, to_index = to_index);
        let start = Instant::now();

        let result = self.move_impl(id, to_index, source).map_err(|e| {
            log_op_error!("move", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!(
            "move",
            duration_ms = elapsed_ms(start),
            element_id = id,
            recorded = result.is_some()
        );
        Ok(result)
    }

    fn move_impl(
        &mut self,
        id: &str,
        to_index: usize,
        source: Option<String>,
    ) -> Result<Option<OperationId>> {
        let from_index =
            self.store
                .position_of(id)
                .ok_or_else(|| RedlineError::ElementNotFound {
                    element_id: id.to_string(),
                })?;
        let to_index = to_index.min(self.store.len().saturating_sub(1));
        if from_index == to_index {
            return Ok(None);
        }
        self.store.move_to(id, to_index)?;
        let data = OperationData::Move {
            from_index,
            to_index,
        };
        Ok(Some(self.record(ElementId::from(id), data, source)))
    }

    /// Split an element into segments
    ///
    /// The first segment replaces the element in place; the rest are inserted
    /// after it in order. An empty list edits the element to empty content.
    /// Returns the IDs of every segment.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn replace_with_segments(
        &mut self,
        id: &str,
        segments: Vec<Segment>,
    ) -> Result<Vec<ElementId>> {
        let current = self.store.require(id)?;
        let element_id = current.id.clone();
        let mut segments = segments.into_iter();
        let first = segments
            .next()
            .unwrap_or_else(|| Segment::new("", current.metadata.clone()));

        self.edit_with(
            id,
            &first.content,
            EditOptions {
                metadata: Some(first.metadata),
                source: None,
            },
        )?;

        let mut ids = vec![element_id.clone()];
        let mut last = element_id;
        for segment in segments {
            let new_id = self.insert(
                &segment.content,
                segment.metadata,
                InsertPosition::After(last),
            )?;
            ids.push(new_id.clone());
            last = new_id;
        }
        Ok(ids)
    }

    /// Step back one operation; false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        self.step("undo", OperationLog::undo, OperationLog::redo)
    }

    /// Re-apply the last undone operation; false when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        self.step("redo", OperationLog::redo, OperationLog::undo)
    }

    fn step(
        &mut self,
        op: &'static str,
        forward: fn(&mut OperationLog) -> bool,
        back: fn(&mut OperationLog) -> bool,
    ) -> bool {
        log_op_start!(op, applied = self.log.applied());
        let start = Instant::now();

        if !forward(&mut self.log) {
            log_op_end!(op, duration_ms = elapsed_ms(start), moved = false);
            return false;
        }

        match self.rebuild() {
            Ok(()) => {
                self.store.clear_baselines();
                self.saved = false;
                log_op_end!(
                    op,
                    duration_ms = elapsed_ms(start),
                    moved = true,
                    applied = self.log.applied()
                );
                true
            }
            Err(e) => {
                back(&mut self.log);
                tracing::error!(op = op, error = %e, "replay failed, history cursor restored");
                false
            }
        }
    }

    fn rebuild(&mut self) -> Result<()> {
        let mut store = self.store.clone();
        store.reset_to_original();
        replay_all(&mut store, self.log.operations())?;
        self.store = store;
        Ok(())
    }

    /// Apply one command
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying mutator.
    pub fn apply(&mut self, cmd: Command) -> Result<CommandOutcome> {
        let recorded = |element_id: ElementId, op: Option<OperationId>| match op {
            Some(operation_id) => CommandOutcome::Recorded {
                operation_id,
                element_id,
            },
            None => CommandOutcome::Unchanged,
        };

        match cmd {
            Command::Edit {
                element_id,
                content,
                metadata,
                source,
            } => {
                let op = self.edit_with(
                    element_id.as_str(),
                    &content,
                    EditOptions { metadata, source },
                )?;
                Ok(recorded(element_id, op))
            }
            Command::Insert {
                content,
                metadata,
                position,
                source,
            } => {
                let element_id = self.insert_with(&content, metadata, position, source)?;
                let op = self.log.operations().last().map(|o| o.id.clone());
                Ok(recorded(element_id, op))
            }
            Command::Delete { element_id, source } => {
                let op = self.delete_with(element_id.as_str(), source)?;
                Ok(recorded(element_id, Some(op)))
            }
            Command::Move {
                element_id,
                to_index,
                source,
            } => {
                let op = self.move_with(element_id.as_str(), to_index, source)?;
                Ok(recorded(element_id, op))
            }
            Command::Undo => Ok(if self.undo() {
                CommandOutcome::Undone
            } else {
                CommandOutcome::Unchanged
            }),
            Command::Redo => Ok(if self.redo() {
                CommandOutcome::Redone
            } else {
                CommandOutcome::Unchanged
            }),
            Command::SetBaseline {
                element_id,
                content,
            } => {
                self.set_element_baseline(element_id.as_str(), content);
                Ok(CommandOutcome::BaselineSet)
            }
        }
    }

    /// Apply commands in order, continuing past failures
    pub fn apply_all(&mut self, cmds: impl IntoIterator<Item = Command>) -> Vec<Result<CommandOutcome>> {
        cmds.into_iter().map(|cmd| self.apply(cmd)).collect()
    }

    /// Forget all operations and baselines and return to the original snapshot
    pub fn clear(&mut self) {
        self.log.clear();
        self.store.reset_to_original();
        self.store.clear_baselines();
        self.saved = true;
        tracing::debug!("change engine cleared");
    }

    // ===== Reads =====

    pub fn current_state(&self) -> Vec<Element> {
        self.store.current_state()
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.store.get(id).cloned()
    }

    /// Active operations, oldest first
    pub fn operations(&self) -> Vec<Operation> {
        self.log.operations().to_vec()
    }

    /// Every retained operation including the redo tail
    pub fn all_operations(&self) -> Vec<Operation> {
        self.log.all_operations().to_vec()
    }

    pub fn applied_count(&self) -> usize {
        self.log.applied()
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn has_unsaved_operations(&self) -> bool {
        !self.saved && !self.log.operations().is_empty()
    }

    pub fn mark_saved(&mut self) {
        self.saved = true;
    }

    /// State after the first `count` active operations
    ///
    /// `count` is clamped to the number of active operations.
    ///
    /// # Errors
    ///
    /// Returns `CorruptOperationLog` if replay fails.
    pub fn state_after(&self, count: usize) -> Result<Vec<Element>> {
        let active = self.log.operations();
        let count = count.min(active.len());
        let mut store = self.store.clone();
        store.reset_to_original();
        replay_all(&mut store, &active[..count])?;
        Ok(store.current_state())
    }

    /// # Errors
    ///
    /// Returns `CorruptOperationLog` if replay fails.
    pub fn markdown_at(&self, count: usize) -> Result<String> {
        Ok(render_markdown(&self.state_after(count)?))
    }

    /// # Errors
    ///
    /// Returns `CorruptOperationLog` if replay fails.
    pub fn clean_markdown_at(&self, count: usize) -> Result<String> {
        Ok(self.clean(&self.markdown_at(count)?))
    }

    /// Current contents in document order, blank-line separated
    pub fn to_markdown(&self) -> String {
        render_markdown(self.store.elements())
    }

    /// [`ChangeEngine::to_markdown`] with all tracked markup resolved
    ///
    /// Never contains tracked-markup delimiters.
    pub fn to_clean_markdown(&self) -> String {
        self.clean(&self.to_markdown())
    }

    fn clean(&self, markdown: &str) -> String {
        strip_tracked_markup(markdown, StripMode::Accept, self.config.strip_options())
    }

    /// Current contents with per-element comment markup appended
    pub fn to_markdown_with_comments(&self, comments: &HashMap<ElementId, String>) -> String {
        self.store
            .elements()
            .iter()
            .map(|e| {
                let content = e.content.trim_end();
                match comments.get(e.id.as_str()) {
                    Some(comment) if !comment.trim().is_empty() => {
                        format!("{} {}", content, comment)
                    }
                    _ => content.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Every live element rendered against its baseline
    ///
    /// Deleted elements are not shown.
    pub fn to_tracked_markdown(&self) -> String {
        self.store
            .elements()
            .iter()
            .map(|e| self.tracked(e))
            .map(|s| s.trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// One element rendered against its baseline
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not live.
    pub fn element_content_with_tracked_changes(&self, id: &str) -> Result<String> {
        Ok(self.tracked(self.store.require(id)?))
    }

    fn tracked(&self, element: &Element) -> String {
        let baseline = self.store.baseline(element.id.as_str());
        if baseline == element.content {
            return element.content.clone();
        }
        self.diff.tracked(baseline, &element.content)
    }

    // ===== Baselines =====

    /// Set the diff reference for an element; records no operation
    pub fn set_element_baseline(&mut self, id: &str, content: impl Into<String>) {
        self.store.set_baseline(id, content);
    }

    pub fn clear_element_baseline(&mut self, id: &str) {
        self.store.clear_baseline(id);
    }

    pub fn clear_all_baselines(&mut self) {
        self.store.clear_baselines();
    }

    /// True when a live element differs from its baseline
    pub fn is_modified(&self, id: &str) -> bool {
        self.store
            .get(id)
            .is_some_and(|e| self.store.baseline(id) != e.content)
    }

    // ===== Summaries =====

    /// e.g. `"Edited 2 element(s); Added 1 element(s)"`, or `"No changes"`
    pub fn summarize_operations(&self) -> String {
        summary::summarize_operations(self.log.operations())
    }

    pub fn change_report(&self) -> String {
        summary::render_change_report(self.log.operations())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ChangeEngine {
        ChangeEngine::new(vec![
            Element::para("p-1", "First paragraph"),
            Element::para("p-2", "Second paragraph"),
            Element::para("p-3", "Third paragraph"),
        ])
        .unwrap()
    }

    fn ids(engine: &ChangeEngine) -> Vec<String> {
        engine
            .current_state()
            .into_iter()
            .map(|e| e.id.to_string())
            .collect()
    }

    #[test]
    fn test_ghost_edit_not_recorded() {
        let mut engine = engine();
        let op = engine.edit("p-1", "First paragraph").unwrap();
        assert!(op.is_none());
        assert!(engine.operations().is_empty());
        assert!(!engine.has_unsaved_operations());
    }

    #[test]
    fn test_metadata_only_edit_is_recorded() {
        let mut engine = engine();
        let op = engine
            .edit_with(
                "p-1",
                "First paragraph",
                EditOptions {
                    metadata: Some(ElementMetadata::heading(2)),
                    source: Some("toolbar".to_string()),
                },
            )
            .unwrap();
        assert!(op.is_some());
        let ops = engine.operations();
        assert_eq!(ops[0].source.as_deref(), Some("toolbar"));
        match &ops[0].data {
            OperationData::Edit {
                old_metadata,
                new_metadata,
                ..
            } => {
                assert_eq!(old_metadata.as_ref(), Some(&ElementMetadata::para()));
                assert_eq!(new_metadata.as_ref(), Some(&ElementMetadata::heading(2)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unchanged_metadata_not_recorded_on_edit() {
        let mut engine = engine();
        engine
            .edit_with(
                "p-1",
                "Changed",
                EditOptions {
                    metadata: Some(ElementMetadata::para()),
                    source: None,
                },
            )
            .unwrap();
        match &engine.operations()[0].data {
            OperationData::Edit { new_metadata, .. } => assert!(new_metadata.is_none()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_user_id_is_stamped() {
        let config = EngineConfig {
            user_id: Some("ann".to_string()),
            ..EngineConfig::default()
        };
        let mut engine =
            ChangeEngine::with_config(vec![Element::para("p-1", "a")], config).unwrap();
        engine.edit("p-1", "b").unwrap();
        assert_eq!(engine.operations()[0].user_id.as_deref(), Some("ann"));
    }

    #[test]
    fn test_move_and_undo() {
        let mut engine = engine();
        engine.move_element("p-1", 10).unwrap();
        assert_eq!(ids(&engine), vec!["p-2", "p-3", "p-1"]);
        match &engine.operations()[0].data {
            OperationData::Move {
                from_index,
                to_index,
            } => assert_eq!((*from_index, *to_index), (0, 2)),
            other => panic!("unexpected {:?}", other),
        }
        assert!(engine.undo());
        assert_eq!(ids(&engine), vec!["p-1", "p-2", "p-3"]);
    }

    #[test]
    fn test_move_in_place_is_skipped() {
        let mut engine = engine();
        assert!(engine.move_element("p-2", 1).unwrap().is_none());
        assert!(engine.operations().is_empty());
    }

    #[test]
    fn test_replace_with_segments() {
        let mut engine = engine();
        let ids_out = engine
            .replace_with_segments(
                "p-2",
                vec![
                    Segment::new("Second", ElementMetadata::para()),
                    Segment::new("## Inserted", ElementMetadata::heading(2)),
                    Segment::new("paragraph", ElementMetadata::para()),
                ],
            )
            .unwrap();
        assert_eq!(ids_out.len(), 3);
        assert_eq!(ids_out[0].as_str(), "p-2");
        assert_eq!(
            engine.to_markdown(),
            "First paragraph\n\nSecond\n\n## Inserted\n\nparagraph\n\nThird paragraph"
        );
        assert_eq!(engine.summarize_operations(), "Edited 1 element(s); Added 2 element(s)");
    }

    #[test]
    fn test_baselines_cleared_on_undo() {
        let mut engine = engine();
        engine.edit("p-1", "Changed").unwrap();
        engine.set_element_baseline("p-1", "Changed");
        assert!(!engine.is_modified("p-1"));
        engine.edit("p-2", "Other").unwrap();
        engine.undo();
        assert!(engine.is_modified("p-1"));
    }

    #[test]
    fn test_state_after_prefix() {
        let mut engine = engine();
        engine.edit("p-1", "One").unwrap();
        engine.delete("p-3").unwrap();
        assert_eq!(engine.state_after(0).unwrap().len(), 3);
        assert_eq!(
            engine.markdown_at(1).unwrap(),
            "One\n\nSecond paragraph\n\nThird paragraph"
        );
        assert_eq!(engine.markdown_at(99).unwrap(), engine.to_markdown());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut engine = engine();
        engine.edit("p-1", "One").unwrap();
        assert!(engine.has_unsaved_operations());
        engine.mark_saved();
        assert!(!engine.has_unsaved_operations());
        engine.undo();
        assert!(!engine.has_unsaved_operations());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut engine = engine();
        engine.delete("p-1").unwrap();
        engine.set_element_baseline("p-2", "x");
        engine.clear();
        assert_eq!(ids(&engine), vec!["p-1", "p-2", "p-3"]);
        assert!(engine.operations().is_empty());
        assert!(!engine.is_modified("p-2"));
    }

    #[test]
    fn test_edit_segment_keeps_comments() {
        let mut engine = ChangeEngine::new(vec![Element::para(
            "p-1",
            "Some text {>>check this<<}",
        )])
        .unwrap();
        assert_eq!(engine.editable_content("p-1").unwrap(), "Some text");
        engine.edit_segment("p-1", "Some new text").unwrap();
        assert_eq!(
            engine.element("p-1").unwrap().content,
            "Some new text {>>check this<<}"
        );
    }

    #[test]
    fn test_markdown_with_comments() {
        let engine = engine();
        let mut comments = HashMap::new();
        comments.insert(ElementId::from("p-2"), "{>>nice<<}".to_string());
        comments.insert(ElementId::from("p-3"), "   ".to_string());
        assert_eq!(
            engine.to_markdown_with_comments(&comments),
            "First paragraph\n\nSecond paragraph {>>nice<<}\n\nThird paragraph"
        );
    }

    #[test]
    fn test_apply_commands() {
        let mut engine = engine();
        let results = engine.apply_all(vec![
            Command::Edit {
                element_id: "p-1".into(),
                content: "Edited".to_string(),
                metadata: None,
                source: None,
            },
            Command::Delete {
                element_id: "ghost".into(),
                source: None,
            },
            Command::Undo,
            Command::Redo,
            Command::Redo,
        ]);
        assert!(results[0].as_ref().unwrap().is_recorded());
        assert!(matches!(
            results[1],
            Err(RedlineError::ElementNotFound { .. })
        ));
        assert_eq!(results[2].as_ref().unwrap(), &CommandOutcome::Undone);
        assert_eq!(results[3].as_ref().unwrap(), &CommandOutcome::Redone);
        assert_eq!(results[4].as_ref().unwrap(), &CommandOutcome::Unchanged);
        assert_eq!(engine.element("p-1").unwrap().content, "Edited");
    }

    #[test]
    fn test_apply_insert_reports_operation() {
        let mut engine = engine();
        let outcome = engine
            .apply(Command::Insert {
                content: "New".to_string(),
                metadata: ElementMetadata::para(),
                position: InsertPosition::Index(0),
                source: None,
            })
            .unwrap();
        match outcome {
            CommandOutcome::Recorded { element_id, .. } => {
                assert!(element_id.is_inserted());
                assert_eq!(ids(&engine)[0], element_id.as_str());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
