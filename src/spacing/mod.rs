// WHY: Decides which words need a space on each side when the sentence is re-assembled
// Words are laid out as " w1 w2 ... wn " and a scanner clears the separators that must disappear

use std::io;

use tracing::trace;

use crate::error::{BuilderError, BuilderResult};
use crate::model::{Sentence, Word};

pub mod rules;

pub use rules::RuleSpaceAnnotator;

/// What a scanner match asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceEvent {
    /// Drop the separator before the match
    RemoveLeft,
    /// Drop the separator after the match
    RemoveRight,
    /// Drop both separators
    RemoveBoth,
}

/// One scanner hit over the annotated stream; `start..end` includes both separators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceMatch {
    pub start: usize,
    pub end: usize,
    pub event: SpaceEvent,
}

/// Scanning automaton driven over a [`SpacedText`]
pub trait SpaceAnnotator: Send {
    /// Start scanning `text` from the beginning
    fn reset(&mut self, text: &str);

    /// Next match, or `None` once the stream is exhausted
    fn next(&mut self) -> io::Result<Option<SpaceMatch>>;
}

/// Words of a sentence joined by single separators, each separator carrying a
/// "space required" mark
#[derive(Debug, Clone, Default)]
pub struct SpacedText {
    text: String,
    /// Byte offset of every separator; separator `i` sits left of word `i`
    separators: Vec<usize>,
    required: Vec<bool>,
}

impl SpacedText {
    pub fn from_words(words: &[Word]) -> Self {
        let mut spaced = Self::default();
        spaced.fill(words);
        spaced
    }

    /// Rebuild from `words`, reusing the buffers
    pub fn fill(&mut self, words: &[Word]) {
        self.text.clear();
        self.separators.clear();

        self.separators.push(0);
        self.text.push(' ');
        for word in words {
            self.text.push_str(&word.text);
            self.separators.push(self.text.len());
            self.text.push(' ');
        }

        self.required.clear();
        self.required.resize(self.separators.len(), true);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn annotate(&mut self, hit: SpaceMatch) {
        match hit.event {
            SpaceEvent::RemoveLeft => self.remove_space_left(hit.start),
            SpaceEvent::RemoveRight => self.remove_space_right(hit.end.saturating_sub(1)),
            SpaceEvent::RemoveBoth => {
                self.remove_space_left(hit.start);
                self.remove_space_right(hit.end.saturating_sub(1));
            }
        }
    }

    /// Clear the closest separator at or before `position`
    pub fn remove_space_left(&mut self, position: usize) {
        let count = self.separators.partition_point(|&s| s <= position);
        if let Some(index) = count.checked_sub(1) {
            self.required[index] = false;
        }
    }

    /// Clear the closest separator at or after `position`
    pub fn remove_space_right(&mut self, position: usize) {
        let index = self.separators.partition_point(|&s| s < position);
        if let Some(required) = self.required.get_mut(index) {
            *required = false;
        }
    }

    pub fn is_space_required(&self, separator: usize) -> bool {
        self.required.get(separator).copied().unwrap_or(false)
    }

    pub fn apply_left(&self, words: &mut [Word]) {
        for (index, word) in words.iter_mut().enumerate() {
            word.left_space_required = self.is_space_required(index);
        }
    }

    pub fn apply_right(&self, words: &mut [Word]) {
        for (index, word) in words.iter_mut().enumerate() {
            word.right_space_required = self.is_space_required(index + 1);
        }
    }
}

/// Run `annotator` over the sentence's words and store the required-space marks
pub fn annotate_sentence(
    sentence: &mut Sentence,
    annotator: &mut dyn SpaceAnnotator,
    spaced: &mut SpacedText,
) -> BuilderResult<()> {
    spaced.fill(&sentence.words);
    annotator.reset(spaced.as_str());

    let mut hits = 0usize;
    while let Some(hit) = annotator.next().map_err(BuilderError::Annotator)? {
        spaced.annotate(hit);
        hits += 1;
    }

    spaced.apply_left(&mut sentence.words);
    spaced.apply_right(&mut sentence.words);

    trace!("Space annotator produced {} events", hits);
    Ok(())
}
