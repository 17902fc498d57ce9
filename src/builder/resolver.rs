// WHY: Priority resolution between overlapping token-producing transformations
// Earlier commits win; later ones are trimmed against a coverage mask over the original text

use tracing::trace;

use super::transformation::Transformation;
use crate::error::{BuilderError, BuilderResult};

/// Coverage mask and ordering scratch space, kept by the builder between builds
#[derive(Debug, Default)]
pub struct ConflictResolver {
    coverage: Vec<bool>,
    order: Vec<usize>,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trim token-producing transformations so they no longer overlap
    ///
    /// Walks `log` in commit order. Each tokenizable transformation claims the
    /// original positions of its span that are still free; its start moves to
    /// the first free position and its end drops to the first already-claimed
    /// position after that. Transformations left with nothing are skipped, and
    /// pure replacements never take part. Returns the indices into `log` of the
    /// surviving transformations sorted by their new start.
    pub fn resolve(&mut self, original: &str, log: &mut [Transformation]) -> BuilderResult<&[usize]> {
        self.coverage.clear();
        self.coverage.resize(original.len(), false);
        self.order.clear();

        let mut dropped = 0usize;

        for (index, transformation) in log.iter_mut().enumerate() {
            if !transformation.is_tokenizable() {
                continue;
            }
            if transformation.end > original.len() {
                return Err(BuilderError::internal(format!(
                    "transformation end {} exceeds original length {}",
                    transformation.end,
                    original.len()
                )));
            }

            let mut claimed = String::new();
            let mut start: Option<usize> = None;
            let mut end = transformation.end;
            let mut run_start: Option<usize> = None;

            for position in transformation.start..transformation.end {
                if !self.coverage[position] {
                    start.get_or_insert(position);
                    run_start.get_or_insert(position);
                    self.coverage[position] = true;
                } else {
                    if let Some(from) = run_start.take() {
                        claimed.push_str(slice(original, from, position)?);
                    }
                    if start.is_some() && end > position {
                        end = position;
                    }
                }
            }
            if let Some(from) = run_start {
                claimed.push_str(slice(original, from, transformation.end)?);
            }

            let Some(start) = start else {
                dropped += 1;
                continue;
            };

            transformation.start = start;
            transformation.end = end;
            transformation.original_text = claimed;
            self.order.push(index);
        }

        self.order.sort_by_key(|&index| log[index].start);

        trace!(
            "Resolved {} tokenizable transformations, dropped {}",
            self.order.len(),
            dropped
        );
        Ok(&self.order)
    }
}

fn slice(original: &str, from: usize, to: usize) -> BuilderResult<&str> {
    original.get(from..to).ok_or_else(|| {
        BuilderError::internal(format!("claimed range {from}..{to} splits a character"))
    })
}
