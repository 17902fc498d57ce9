// WHY: Turns resolved transformations into word and tag tokens
// Inter-token spacing is always read from the original text, never the working text

use tracing::trace;

use super::transformation::Transformation;
use crate::entity;
use crate::error::{BuilderError, BuilderResult};
use crate::model::{Sentence, Token};

/// Build the sentence for `order`, the resolver's start-sorted indices into `log`
pub fn tokenize(original: &str, log: &mut [Transformation], order: &[usize]) -> BuilderResult<Sentence> {
    let mut words = Vec::with_capacity(order.len());
    let mut tags = Vec::new();

    for (i, &index) in order.iter().enumerate() {
        let (start, end, is_word) = {
            let transformation = &log[index];
            (transformation.start, transformation.end, transformation.is_word())
        };

        let mut hidden_left_space = false;
        let mut hidden_right_space = false;

        // Left gap: previous token end (or text start) up to this token
        let left_from = match i.checked_sub(1) {
            Some(previous) => {
                let previous = &log[order[previous]];
                if previous.end == start && previous.is_word() != is_word {
                    hidden_left_space = true;
                }
                previous.end
            }
            None => 0,
        };
        let left_space = extract_whitespace(original, left_from, start)?;

        // Right gap: this token up to next token start (or text end)
        let right_to = match order.get(i + 1) {
            Some(&next) => {
                let next = &log[next];
                if next.start == end && next.is_word() != is_word {
                    hidden_right_space = true;
                }
                next.start
            }
            None => original.len(),
        };
        let right_space = extract_whitespace(original, end, right_to)?;

        let tag_position = words.len();

        let transformation = &mut log[index];
        if is_word && transformation.original_text.contains('&') {
            transformation.original_text = entity::unescape_all(&transformation.original_text).into_owned();
        }

        let factory = transformation.factory.as_ref().ok_or_else(|| {
            BuilderError::internal("resolved transformation has no token factory")
        })?;
        let token = factory.build(
            &transformation.original_text,
            &transformation.text,
            left_space.as_deref(),
            right_space.as_deref(),
            tag_position,
        );

        match token {
            Token::Word(mut word) => {
                word.hidden_left_space = hidden_left_space;
                word.hidden_right_space = hidden_right_space;
                words.push(word);
            }
            Token::Tag(tag) => tags.push(tag),
        }
    }

    trace!("Tokenized {} words and {} tags", words.len(), tags.len());
    Ok(Sentence::new(words, tags))
}

/// Whitespace between two tokens, entities resolved; `None` when nothing is left
fn extract_whitespace(original: &str, from: usize, to: usize) -> BuilderResult<Option<String>> {
    if to <= from {
        return Ok(None);
    }
    let gap = original.get(from..to).ok_or_else(|| {
        BuilderError::internal(format!("gap {from}..{to} is not a valid range of the original text"))
    })?;

    let space: String = entity::unescape_all(gap)
        .chars()
        .filter(|c| c.is_whitespace())
        .collect();

    Ok((!space.is_empty()).then_some(space))
}
