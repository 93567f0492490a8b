//! Core types shared across the redline crates
//!
//! This crate provides foundational types used by the change-tracking core,
//! its logging facility and the CLI:
//!
//! - **Identifiers**: ElementId, OperationId
//! - **Schema constants**: Canonical field keys and event names

pub mod ids;
pub mod schema;

pub use ids::{ElementId, OperationId};
