use redline_core_types::ElementId;
use serde::{Deserialize, Serialize};

use super::metadata::ElementMetadata;

/// Back-reference into the source file an element was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// One block-level unit of the document
///
/// `content` is plain markdown; tracked markup is only ever produced on
/// output. The baseline used for diffs lives in the store, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,

    pub content: String,

    #[serde(default)]
    pub metadata: ElementMetadata,

    /// Advisory only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_position: Option<SourcePosition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, content: impl Into<String>, metadata: ElementMetadata) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
            source_position: None,
            source_file: None,
        }
    }

    /// A paragraph element
    pub fn para(id: impl Into<ElementId>, content: impl Into<String>) -> Self {
        Self::new(id, content, ElementMetadata::para())
    }

    pub fn with_source(mut self, file: impl Into<String>, position: SourcePosition) -> Self {
        self.source_file = Some(file.into());
        self.source_position = Some(position);
        self
    }
}
