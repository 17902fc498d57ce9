// WHY: Typed failures for the sentence builder so pipeline stages can match on the category
// State misuse and unsupported edits are caller bugs; Internal means the builder itself broke

use std::io;
use thiserror::Error;

pub type BuilderResult<T> = Result<T, BuilderError>;

/// Broad classification of a [`BuilderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The builder or its editor was used out of order
    StateMisuse,
    /// The edit is well-formed but not supported (interior empty replacement)
    UnsupportedEdit,
    /// An internal invariant was violated
    Internal,
}

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("this editor is already in use")]
    EditorInUse,

    #[error("no input string has been loaded into the builder")]
    NotInitialized,

    #[error("span {start}..{end} is out of bounds for working text of length {len}")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("position {position} is not on a character boundary of the working text")]
    NotCharBoundary { position: usize },

    #[error("edit at {start} starts before the end of a queued replacement ({replaced_until})")]
    OverlapsReplacement { start: usize, replaced_until: usize },

    #[error("empty replacements are not supported in the middle of the sentence ({start}..{end})")]
    EmptyInteriorReplacement { start: usize, end: usize },

    #[error("space annotator failed reading the annotated stream")]
    Annotator(#[source] io::Error),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl BuilderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EditorInUse
            | Self::NotInitialized
            | Self::InvalidSpan { .. }
            | Self::NotCharBoundary { .. }
            | Self::OverlapsReplacement { .. } => ErrorCategory::StateMisuse,
            Self::EmptyInteriorReplacement { .. } => ErrorCategory::UnsupportedEdit,
            Self::Annotator(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
