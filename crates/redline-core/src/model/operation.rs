use chrono::{DateTime, Utc};
use redline_core_types::{ElementId, OperationId};
use serde::{Deserialize, Serialize};

use super::metadata::ElementMetadata;

/// Where an inserted element goes, resolved against the sequence at apply time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    After(ElementId),
    Before(ElementId),
    /// Absolute index, clamped to `[0, len]`
    Index(usize),
}

/// Discriminant of [`OperationData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Edit,
    Insert,
    Delete,
    Move,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Edit => "edit",
            OperationKind::Insert => "insert",
            OperationKind::Delete => "delete",
            OperationKind::Move => "move",
        }
    }
}

/// Per-kind payload, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperationData {
    #[serde(rename_all = "camelCase")]
    Edit {
        old_content: String,
        new_content: String,
        /// Set only when the edit changed metadata
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old_metadata: Option<ElementMetadata>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_metadata: Option<ElementMetadata>,
    },
    #[serde(rename_all = "camelCase")]
    Insert {
        content: String,
        metadata: ElementMetadata,
        position: InsertPosition,
    },
    /// Captures everything needed to put the element back where it was
    #[serde(rename_all = "camelCase")]
    Delete {
        removed_content: String,
        removed_metadata: ElementMetadata,
        index: usize,
    },
    #[serde(rename_all = "camelCase")]
    Move { from_index: usize, to_index: usize },
}

impl OperationData {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationData::Edit { .. } => OperationKind::Edit,
            OperationData::Insert { .. } => OperationKind::Insert,
            OperationData::Delete { .. } => OperationKind::Delete,
            OperationData::Move { .. } => OperationKind::Move,
        }
    }
}

/// An immutable log entry
///
/// Serialized with a top-level `type` mirroring `data.type`. On input `type`
/// may be omitted, but when present it must agree with `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "OperationRecord", try_from = "OperationRecord")]
pub struct Operation {
    pub id: OperationId,
    pub element_id: ElementId,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    /// Free-form origin tag supplied by the editing surface
    pub source: Option<String>,
    pub data: OperationData,
}

/// Wire shape of [`Operation`]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationRecord {
    id: OperationId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<OperationKind>,
    element_id: ElementId,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    data: OperationData,
}

impl From<Operation> for OperationRecord {
    fn from(op: Operation) -> Self {
        Self {
            id: op.id,
            kind: Some(op.data.kind()),
            element_id: op.element_id,
            timestamp: op.timestamp,
            user_id: op.user_id,
            source: op.source,
            data: op.data,
        }
    }
}

impl TryFrom<OperationRecord> for Operation {
    type Error = String;

    fn try_from(record: OperationRecord) -> Result<Self, Self::Error> {
        if let Some(kind) = record.kind {
            if kind != record.data.kind() {
                return Err(format!(
                    "operation type {} does not match data type {}",
                    kind.as_str(),
                    record.data.kind().as_str()
                ));
            }
        }
        Ok(Self {
            id: record.id,
            element_id: record.element_id,
            timestamp: record.timestamp,
            user_id: record.user_id,
            source: record.source,
            data: record.data,
        })
    }
}

impl Operation {
    /// Stamp a new operation with a fresh ID and the current time
    pub fn new(element_id: ElementId, data: OperationData) -> Self {
        Self {
            id: OperationId::new(),
            element_id,
            timestamp: Utc::now(),
            user_id: None,
            source: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.data.kind()
    }
}
