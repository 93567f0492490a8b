use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Block-level kind of an element, serialized as its `type` tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockKind {
    #[default]
    Para,
    #[serde(alias = "Header")]
    Heading {
        level: u8,
    },
    CodeBlock,
    BulletList,
    OrderedList,
    BlockQuote,
    Div,
    FigureCaption,
    TableCaption,
    DocumentTitle,
    Title,
}

impl BlockKind {
    /// Short lowercase label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Para => "paragraph",
            BlockKind::Heading { .. } => "heading",
            BlockKind::CodeBlock => "code block",
            BlockKind::BulletList => "bullet list",
            BlockKind::OrderedList => "ordered list",
            BlockKind::BlockQuote => "block quote",
            BlockKind::Div => "div",
            BlockKind::FigureCaption => "figure caption",
            BlockKind::TableCaption => "table caption",
            BlockKind::DocumentTitle => "document title",
            BlockKind::Title => "title",
        }
    }
}

/// Block kind plus a flat class list and attribute map
///
/// Serializes flat: `{"type": "Heading", "level": 2, "classes": ["intro"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMetadata {
    #[serde(flatten)]
    pub kind: BlockKind,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub classes: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl ElementMetadata {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn para() -> Self {
        Self::new(BlockKind::Para)
    }

    pub fn heading(level: u8) -> Self {
        Self::new(BlockKind::Heading { level })
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_flat() {
        let meta = ElementMetadata::heading(2).with_class("intro");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Heading", "level": 2, "classes": ["intro"]})
        );
    }

    #[test]
    fn test_minimal_para_deserializes() {
        let meta: ElementMetadata = serde_json::from_str(r#"{"type":"Para"}"#).unwrap();
        assert_eq!(meta, ElementMetadata::para());
    }

    #[test]
    fn test_header_alias() {
        let meta: ElementMetadata =
            serde_json::from_str(r#"{"type":"Header","level":1}"#).unwrap();
        assert_eq!(meta.kind, BlockKind::Heading { level: 1 });
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let a = ElementMetadata::para()
            .with_attribute("x", "1")
            .with_attribute("y", "2");
        let b = ElementMetadata::para()
            .with_attribute("y", "2")
            .with_attribute("x", "1");
        assert_eq!(a, b);
    }
}
