use thiserror::Error;

/// Result type alias using RedlineError
pub type Result<T> = std::result::Result<T, RedlineError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, tests and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Element/position
    NotFound,
    InvalidPosition,
    AlreadyExists,

    // Markup
    MalformedMarkup,

    // Restore
    CorruptLog,

    // Configuration
    InvalidConfig,

    // Persistence
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidPosition => "ERR_INVALID_POSITION",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::MalformedMarkup => "ERR_MALFORMED_TRACKED_MARKUP",
            ExErrorKind::CorruptLog => "ERR_CORRUPT_OPERATION_LOG",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether callers may continue a batch after an error of this kind
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::NotFound
                | ExErrorKind::InvalidPosition
                | ExErrorKind::AlreadyExists
                | ExErrorKind::MalformedMarkup
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus optional operation and entity context for
/// logging and CLI reporting.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the given kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for change-tracking operations
///
/// Element and position errors are recoverable: the operation is not recorded
/// and the log is left untouched. `CorruptOperationLog` is the one fatal
/// condition and is only produced while restoring a persisted session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RedlineError {
    /// Operation references an element that is not in the current sequence
    #[error("Element not found: {element_id}")]
    ElementNotFound { element_id: String },

    /// Insert position references an anchor that is not in the current sequence
    #[error("Invalid insert position: anchor element {anchor} not found")]
    InvalidPosition { anchor: String },

    /// Two elements in a snapshot share an ID, or an inserted ID collides
    #[error("Duplicate element id: {element_id}")]
    DuplicateElementId { element_id: String },

    /// Unbalanced or incomplete span delimiters; the span is kept as literal text
    #[error("Malformed tracked markup at byte {offset}: {reason}")]
    MalformedTrackedMarkup { offset: usize, reason: String },

    /// A persisted operation cannot be replayed against the original snapshot
    #[error("Corrupt operation log at operation {index}: {reason}")]
    CorruptOperationLog { index: usize, reason: String },

    /// Configuration failed to parse or validate
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// JSON or TOML (de)serialization failure
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Invariant broken inside the engine
    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl RedlineError {
    /// ID of the element this error concerns, if any
    pub fn element_id(&self) -> Option<&str> {
        match self {
            RedlineError::ElementNotFound { element_id }
            | RedlineError::DuplicateElementId { element_id } => Some(element_id),
            RedlineError::InvalidPosition { anchor } => Some(anchor),
            _ => None,
        }
    }
}

impl From<RedlineError> for ExError {
    fn from(err: RedlineError) -> Self {
        let kind = match &err {
            RedlineError::ElementNotFound { .. } => ExErrorKind::NotFound,
            RedlineError::InvalidPosition { .. } => ExErrorKind::InvalidPosition,
            RedlineError::DuplicateElementId { .. } => ExErrorKind::AlreadyExists,
            RedlineError::MalformedTrackedMarkup { .. } => ExErrorKind::MalformedMarkup,
            RedlineError::CorruptOperationLog { .. } => ExErrorKind::CorruptLog,
            RedlineError::InvalidConfig { .. } => ExErrorKind::InvalidConfig,
            RedlineError::Serialization { .. } => ExErrorKind::Serialization,
            RedlineError::Internal { .. } => ExErrorKind::Internal,
        };
        let mut ex = ExError::new(kind).with_message(err.to_string());
        if let Some(id) = err.element_id() {
            ex = ex.with_entity_id(id);
        }
        ex
    }
}

impl From<serde_json::Error> for RedlineError {
    fn from(err: serde_json::Error) -> Self {
        RedlineError::Serialization {
            reason: err.to_string(),
        }
    }
}
