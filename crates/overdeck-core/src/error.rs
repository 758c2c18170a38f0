use thiserror::Error;

pub type Result<T> = std::result::Result<T, OverlayError>;

/// Programmer errors raised by the registry and the root mount.
///
/// Operating on a handle whose item is gone is not represented here: it is
/// absorbed where it is detected and never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("overlay kind already registered: {kind}")]
    DuplicateKind { kind: String },

    #[error("overlay kind not registered: {kind}")]
    UnknownKind { kind: String },

    #[error("overlay kind {kind} does not hold content of type {expected}")]
    KindTypeMismatch { kind: String, expected: &'static str },

    #[error("content anchor not found: {anchor}")]
    MissingAnchor { anchor: String },

    #[error("a root mount is already active")]
    AlreadyMounted,
}

impl OverlayError {
    #[must_use]
    pub fn duplicate(kind: impl Into<String>) -> Self {
        Self::DuplicateKind { kind: kind.into() }
    }

    #[must_use]
    pub fn unknown(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }

    /// Name of the kind the error is about, if any.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::DuplicateKind { kind }
            | Self::UnknownKind { kind }
            | Self::KindTypeMismatch { kind, .. } => Some(kind),
            Self::MissingAnchor { .. } | Self::AlreadyMounted => None,
        }
    }
}
