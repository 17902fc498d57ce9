// WHY: Record of one edit, carried from the edit session through conflict resolution
// Positions switch from working-text to original-text coordinates on commit

use crate::model::TokenFactoryRef;

/// One pending or committed edit
///
/// `start`/`end` hold working-text offsets while the edit is pending and are
/// rewritten to original-text offsets exactly once, during commit. The
/// resolver may later shrink them to the region the edit actually claims.
#[derive(Debug, Clone)]
pub struct Transformation {
    pub start: usize,
    pub end: usize,
    /// Working-text snippet covered by the edit when it was recorded
    pub text: String,
    /// `None` for a pure token mark, `Some` (possibly empty) for a replacement
    pub replacement: Option<String>,
    /// `None` for a pure replacement
    pub factory: Option<TokenFactoryRef>,
    /// Original characters claimed by this edit, filled in by the resolver
    pub original_text: String,
}

impl Transformation {
    pub fn new(
        start: usize,
        end: usize,
        text: impl Into<String>,
        replacement: Option<String>,
        factory: Option<TokenFactoryRef>,
    ) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            replacement,
            factory,
            original_text: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_tokenizable(&self) -> bool {
        self.factory.is_some()
    }

    pub fn is_word(&self) -> bool {
        self.factory.as_ref().is_some_and(|f| f.is_word())
    }
}
