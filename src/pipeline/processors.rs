// WHY: Built-in passes that drive the sentence builder from plain or lightly marked-up text
// Each pass opens one edit session and records its matches left to right

use std::ops::Range;
use std::sync::OnceLock;

use regex_automata::meta::Regex;
use tracing::trace;

use super::{run_session, TextProcessor};
use crate::builder::SentenceBuilder;
use crate::entity;
use crate::error::BuilderResult;
use crate::model::{Annotation, XmlTagFactory};

const XML_TAG_PATTERN: &str = r"(?s)<!--.*?-->|</?[A-Za-z_][A-Za-z0-9_:.\-]*(?:\s[^<>]*)?/?>";
const WHITESPACE_PATTERN: &str = r"\s+";
const WORD_PATTERN: &str = r"\w+(?:['\u{2019}]\w+)*|[^\w\s]";

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in processor pattern is valid"))
}

fn match_ranges(regex: &Regex, text: &str) -> Vec<Range<usize>> {
    regex.find_iter(text).map(|m| m.range()).collect()
}

/// Annotation added to sentences that contained markup
pub const XML_ANNOTATION: &str = "xml";

/// Turns XML-like tags and comments into tag tokens, leaving a space behind
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlTagProcessor;

impl TextProcessor for XmlTagProcessor {
    fn name(&self) -> &'static str {
        "xml-tags"
    }

    fn process(&self, builder: &mut SentenceBuilder) -> BuilderResult<()> {
        static XML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = cached(&XML_TAG_REGEX, XML_TAG_PATTERN);

        let tags = run_session(builder, |editor| {
            for range in match_ranges(regex, editor.text()) {
                editor.set_tag(range.start, range.len(), Some(" "), XmlTagFactory::shared())?;
            }
            Ok(())
        })?;

        if tags > 0 {
            builder.add_annotation(Annotation::new(XML_ANNOTATION));
        }
        trace!("Marked {} tags", tags);
        Ok(())
    }
}

/// Replaces known character entities with the character they stand for
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityProcessor;

impl TextProcessor for EntityProcessor {
    fn name(&self) -> &'static str {
        "entities"
    }

    fn process(&self, builder: &mut SentenceBuilder) -> BuilderResult<()> {
        let replaced = run_session(builder, |editor| {
            let found: Vec<(Range<usize>, char)> = entity::find_entities(editor.text())
                .filter_map(|range| {
                    let resolved = entity::resolve(&editor.text()[range.clone()])?;
                    Some((range, resolved))
                })
                .collect();

            let mut buffer = [0u8; 4];
            for (range, resolved) in found {
                editor.replace(range.start, range.len(), resolved.encode_utf8(&mut buffer))?;
            }
            Ok(())
        })?;

        trace!("Unescaped {} entities", replaced);
        Ok(())
    }
}

/// Collapses every whitespace run into a single ASCII space
///
/// Runs are replaced rather than deleted, so leading and trailing whitespace
/// still keeps one space and the original gap is recoverable.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceNormalizer;

impl TextProcessor for WhitespaceNormalizer {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn process(&self, builder: &mut SentenceBuilder) -> BuilderResult<()> {
        static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = cached(&WHITESPACE_REGEX, WHITESPACE_PATTERN);

        let collapsed = run_session(builder, |editor| {
            let runs: Vec<Range<usize>> = match_ranges(regex, editor.text())
                .into_iter()
                .filter(|range| &editor.text()[range.clone()] != " ")
                .collect();

            for range in runs {
                editor.replace(range.start, range.len(), " ")?;
            }
            Ok(())
        })?;

        trace!("Collapsed {} whitespace runs", collapsed);
        Ok(())
    }
}

/// Marks word runs (with inner apostrophes) and single punctuation marks as words
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleTokenizer;

impl TextProcessor for SimpleTokenizer {
    fn name(&self) -> &'static str {
        "tokenizer"
    }

    fn process(&self, builder: &mut SentenceBuilder) -> BuilderResult<()> {
        static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = cached(&WORD_REGEX, WORD_PATTERN);

        let words = run_session(builder, |editor| {
            for range in match_ranges(regex, editor.text()) {
                editor.set_word(range.start, range.len(), None)?;
            }
            Ok(())
        })?;

        trace!("Marked {} words", words);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagKind;

    fn run(text: &str, processors: &[&dyn TextProcessor]) -> SentenceBuilder {
        let mut builder = SentenceBuilder::from_text(text);
        for processor in processors {
            processor.process(&mut builder).unwrap();
        }
        builder
    }

    #[test]
    fn test_xml_tags_become_spaces() {
        let builder = run("a<b>c</b><!-- x --><br/>", &[&XmlTagProcessor]);
        assert_eq!(builder.current_text(), "a c   ");
        assert_eq!(builder.transformations().len(), 4);
        assert!(builder.annotations().contains(&Annotation::new(XML_ANNOTATION)));
    }

    #[test]
    fn test_no_annotation_without_markup() {
        let builder = run("plain text", &[&XmlTagProcessor]);
        assert!(builder.annotations().is_empty());
        assert!(builder.transformations().is_empty());
    }

    #[test]
    fn test_known_entities_are_replaced() {
        let builder = run("a&amp;b &bogus; &#233;", &[&EntityProcessor]);
        assert_eq!(builder.current_text(), "a&b &bogus; \u{e9}");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let builder = run("  a \t b\n", &[&WhitespaceNormalizer]);
        assert_eq!(builder.current_text(), " a b ");

        let builder = run("a b", &[&WhitespaceNormalizer]);
        assert!(builder.transformations().is_empty());
    }

    #[test]
    fn test_tokenizer_splits_punctuation() {
        let mut builder = run("Don't stop, ok?", &[&SimpleTokenizer]);
        let sentence = builder.build().unwrap();
        let texts: Vec<_> = sentence.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Don't", "stop", ",", "ok", "?"]);
    }

    #[test]
    fn test_full_chain() {
        let mut builder = run(
            "<p>Fish&amp;chips</p>  cost &pound;5.",
            &[&XmlTagProcessor, &EntityProcessor, &WhitespaceNormalizer, &SimpleTokenizer],
        );
        let sentence = builder.build().unwrap();

        let words: Vec<_> = sentence.words.iter().map(|w| w.original.as_str()).collect();
        assert_eq!(words, vec!["Fish", "&", "chips", "cost", "\u{a3}", "5", "."]);

        assert_eq!(sentence.tags.len(), 2);
        assert_eq!(sentence.tags[0].kind, TagKind::Opening);
        assert_eq!(sentence.tags[1].kind, TagKind::Closing);
        assert_eq!(sentence.tags[1].position, 3);
        // Spacing comes from the original text, not the normalized one
        assert_eq!(sentence.to_text(false), "Fish&chips  cost \u{a3}5.");
    }
}
