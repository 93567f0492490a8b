//! Redline Core - document change tracking
//!
//! This crate tracks edits to a document made of block-level elements,
//! including:
//! - An identity-stable element store with per-element baselines
//! - A linear operation log with undo/redo
//! - LCS word/line diffing encoded as CriticMarkup-style tracked markup
//! - A markup codec for parsing, accepting, rejecting and stripping changes
//! - Session snapshots that restore by replay
//!
//! [`ChangeEngine`] is the entry point; it is the only writer to the store
//! and the log.

pub mod commands;
pub mod config;
pub mod diff;
pub mod engine;
pub mod errors;
pub mod logging_facility;
pub mod markup;
pub mod model;
pub mod ops;
pub mod snapshot;
pub mod summary;

pub use redline_core_types as core_types;

// Re-export commonly used types
pub use commands::{Command, CommandOutcome};
pub use config::EngineConfig;
pub use core_types::{ElementId, OperationId};
pub use diff::{diff_text, DiffEngine, DiffOptions, SubstitutionPolicy, TextDiff};
pub use engine::{ChangeEngine, EditOptions, Segment};
pub use errors::{ExError, ExErrorKind, RedlineError, Result};
pub use model::{Element, ElementMetadata, InsertPosition, Operation, OperationData, OperationKind};
pub use snapshot::SessionSnapshot;
