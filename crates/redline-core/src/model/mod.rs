pub mod element;
pub mod metadata;
pub mod operation;

pub use element::{Element, SourcePosition};
pub use metadata::{BlockKind, ElementMetadata};
pub use operation::{InsertPosition, Operation, OperationData, OperationKind};
