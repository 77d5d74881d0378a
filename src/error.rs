use std::fmt;
use thiserror::Error;

/// The kind of entity an id refers to, used to name the entity in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Step,
    Variant,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Step => write!(f, "Step"),
            EntityKind::Variant => write!(f, "Variant"),
            EntityKind::Edge => write!(f, "Edge"),
        }
    }
}

/// Errors returned by mutation operations, serialization and host synchronization.
///
/// Every failing operation leaves its input `Flow` untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("{kind} '{id}' not found in flow")]
    NotFound { kind: EntityKind, id: String },

    #[error("Step '{step_id}' has no variant marked as winner")]
    NoWinner { step_id: String },

    #[error("Malformed flow document: {0}")]
    MalformedInput(String),

    #[error("Flow invariants violated: {}", .0.join("; "))]
    InvariantViolation(Vec<String>),

    #[error("{kind} title must not be empty")]
    EmptyTitle { kind: EntityKind },

    #[error("Traffic for variant '{variant_id}' must be within 0..=100, got {value}")]
    InvalidTraffic { variant_id: String, value: f64 },
}

impl FlowError {
    pub(crate) fn step_not_found(id: &str) -> Self {
        FlowError::NotFound {
            kind: EntityKind::Step,
            id: id.to_string(),
        }
    }

    pub(crate) fn variant_not_found(id: &str) -> Self {
        FlowError::NotFound {
            kind: EntityKind::Variant,
            id: id.to_string(),
        }
    }

    pub(crate) fn edge_not_found(id: &str) -> Self {
        FlowError::NotFound {
            kind: EntityKind::Edge,
            id: id.to_string(),
        }
    }

    /// `true` for conditions a UI is expected to surface to the user rather than log as a defect.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            FlowError::InvariantViolation(_) | FlowError::MalformedInput(_)
        )
    }
}

/// Errors that can occur while loading layout configuration.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse layout config: {0}")]
    Parse(String),
}

/// Errors raised while synchronizing a flow with a host surface.
#[derive(Error, Debug)]
pub enum SyncError<E> {
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Host adapter failed: {0}")]
    Host(E),
}
