// WHY: Single-owner edit session over the builder's working text
// Edits are only validated and queued here; the buffer and index map change on commit

use tracing::trace;

use super::transformation::Transformation;
use super::SentenceBuilder;
use crate::error::{BuilderError, BuilderResult};
use crate::model::TokenFactoryRef;

/// Session state owned by the builder so the pending list is reused across sessions
#[derive(Debug, Default)]
pub(crate) struct EditSession {
    pub(crate) pending: Vec<Transformation>,
    pub(crate) in_use: bool,
    /// End (working offset) of the right-most replacement queued so far
    replaced_until: Option<usize>,
}

/// Exclusive editing scope returned by [`SentenceBuilder::edit`]
///
/// Spans are byte offsets into the working text as it was when the session
/// started. Edits must be recorded left to right with respect to
/// replacements: nothing may start before the end of an already queued
/// replacement. Dropping the editor without calling [`Editor::commit`] or
/// [`Editor::abort`] leaves the session marked in use, and every later
/// [`SentenceBuilder::edit`] call fails with [`BuilderError::EditorInUse`].
#[must_use = "an editor must be committed or aborted"]
pub struct Editor<'a> {
    builder: &'a mut SentenceBuilder,
}

impl<'a> Editor<'a> {
    pub(super) fn acquire(builder: &'a mut SentenceBuilder) -> BuilderResult<Self> {
        if builder.session.in_use {
            return Err(BuilderError::EditorInUse);
        }
        if !builder.is_initialized() {
            return Err(BuilderError::NotInitialized);
        }

        let session = &mut builder.session;
        session.pending.clear();
        session.replaced_until = None;
        session.in_use = true;

        Ok(Self { builder })
    }

    /// Working text this session edits
    pub fn text(&self) -> &str {
        &self.builder.current
    }

    /// Number of edits queued in this session
    pub fn pending(&self) -> usize {
        self.builder.session.pending.len()
    }

    /// Replace `length` bytes at `start` with `replacement`
    ///
    /// An empty replacement is only accepted when the span touches the start or
    /// the end of the working text.
    pub fn replace(&mut self, start: usize, length: usize, replacement: &str) -> BuilderResult<()> {
        self.record(start, length, Some(replacement), None)
    }

    pub fn delete(&mut self, start: usize, length: usize) -> BuilderResult<()> {
        self.record(start, length, Some(""), None)
    }

    /// Mark a word, optionally replacing its text in the working buffer
    pub fn set_word(&mut self, start: usize, length: usize, replacement: Option<&str>) -> BuilderResult<()> {
        let factory = self.builder.word_factory.clone();
        self.record(start, length, replacement, Some(factory))
    }

    /// Mark a tag produced by `factory`, optionally replacing its text
    pub fn set_tag(
        &mut self,
        start: usize,
        length: usize,
        replacement: Option<&str>,
        factory: TokenFactoryRef,
    ) -> BuilderResult<()> {
        self.record(start, length, replacement, Some(factory))
    }

    fn record(
        &mut self,
        start: usize,
        length: usize,
        replacement: Option<&str>,
        factory: Option<TokenFactoryRef>,
    ) -> BuilderResult<()> {
        let current = &self.builder.current;
        let len = current.len();

        let end = match start.checked_add(length) {
            Some(end) if end <= len => end,
            _ => {
                return Err(BuilderError::InvalidSpan {
                    start,
                    end: start.saturating_add(length),
                    len,
                })
            }
        };
        for position in [start, end] {
            if !current.is_char_boundary(position) {
                return Err(BuilderError::NotCharBoundary { position });
            }
        }

        if replacement.is_some_and(str::is_empty) && start != 0 && end != len {
            return Err(BuilderError::EmptyInteriorReplacement { start, end });
        }

        let session = &mut self.builder.session;
        if let Some(replaced_until) = session.replaced_until {
            if start < replaced_until {
                return Err(BuilderError::OverlapsReplacement {
                    start,
                    replaced_until,
                });
            }
        }
        if replacement.is_some() {
            session.replaced_until = Some(end);
        }

        session.pending.push(Transformation::new(
            start,
            end,
            &current[start..end],
            replacement.map(str::to_string),
            factory,
        ));
        Ok(())
    }

    /// Apply queued replacements, move every edit to original coordinates and
    /// append them to the builder's log
    pub fn commit(self) -> &'a mut SentenceBuilder {
        let builder = self.builder;
        let mut pending = std::mem::take(&mut builder.session.pending);

        // Signed distance between session-start offsets and the live buffer
        let mut offset: isize = 0;
        let mut replacements = 0usize;

        for transformation in pending.iter_mut() {
            let current_start = shift(transformation.start, offset);
            let current_end = shift(transformation.end, offset);

            transformation.start = builder.index_map.translate(current_start);
            transformation.end = builder.index_map.translate(current_end);

            if let Some(replacement) = &transformation.replacement {
                builder.current.replace_range(current_start..current_end, replacement);
                builder
                    .index_map
                    .apply_edit(current_start, current_end, replacement.len());
                offset += replacement.len() as isize - transformation.text.len() as isize;
                replacements += 1;
            }
        }

        trace!(
            "Committed {} transformations ({} replacements)",
            pending.len(),
            replacements
        );

        builder.transformations.append(&mut pending);
        builder.session.pending = pending;
        builder.session.replaced_until = None;
        builder.session.in_use = false;
        builder
    }

    /// Discard every queued edit; the working text is untouched
    pub fn abort(self) -> &'a mut SentenceBuilder {
        let builder = self.builder;
        builder.session.pending.clear();
        builder.session.replaced_until = None;
        builder.session.in_use = false;
        builder
    }
}

fn shift(position: usize, offset: isize) -> usize {
    (position as isize + offset) as usize
}
