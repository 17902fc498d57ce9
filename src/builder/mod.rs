// WHY: Owns one input string through its edit sessions and turns the committed log into a sentence
// Reused across inputs; initialize/clear reset the buffers without giving the allocations back

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::error::{BuilderError, BuilderResult};
use crate::model::{Annotation, Sentence, TokenFactoryRef, WordFactory};
use crate::spacing::{annotate_sentence, RuleSpaceAnnotator, SpaceAnnotator, SpacedText};

pub mod editor;
pub mod index_map;
pub mod resolver;
pub mod tokenizer;
pub mod transformation;

pub use editor::Editor;
pub use index_map::IndexMap;
pub use resolver::ConflictResolver;
pub use transformation::Transformation;

use editor::EditSession;

/// Reusable document builder
///
/// Typical cycle: [`initialize`](Self::initialize), one or more
/// [`edit`](Self::edit) sessions, then [`build`](Self::build). A builder is
/// not shared between threads while in use; pool whole instances instead.
pub struct SentenceBuilder {
    annotator: Box<dyn SpaceAnnotator>,
    original: String,
    initialized: bool,
    current: String,
    index_map: IndexMap,
    transformations: Vec<Transformation>,
    annotations: HashSet<Annotation>,
    session: EditSession,
    word_factory: TokenFactoryRef,
    resolver: ConflictResolver,
    /// Copy of the log the resolver may trim, so building twice gives the same result
    scratch: Vec<Transformation>,
    spaced: SpacedText,
}

impl SentenceBuilder {
    pub fn new(annotator: Box<dyn SpaceAnnotator>) -> Self {
        Self {
            annotator,
            original: String::new(),
            initialized: false,
            current: String::new(),
            index_map: IndexMap::new(),
            transformations: Vec::new(),
            annotations: HashSet::new(),
            session: EditSession::default(),
            word_factory: WordFactory::shared(),
            resolver: ConflictResolver::new(),
            scratch: Vec::new(),
            spaced: SpacedText::default(),
        }
    }

    /// Builder with the built-in spacing rules for `language`
    pub fn with_language(language: &str) -> Self {
        Self::new(Box::new(RuleSpaceAnnotator::for_language(language)))
    }

    /// English builder already initialized with `text`
    pub fn from_text(text: &str) -> Self {
        let mut builder = Self::with_language("en");
        builder.initialize(text);
        builder
    }

    /// Load a new input string
    ///
    /// Resets the working text, the index map, the committed log and the
    /// annotations. An editor left open by a previous input stays open.
    pub fn initialize(&mut self, text: &str) -> &mut Self {
        self.original.clear();
        self.original.push_str(text);
        self.current.clear();
        self.current.push_str(text);
        self.index_map.initialize(text.len());
        self.transformations.clear();
        self.annotations.clear();
        self.initialized = true;

        debug!("Initialized sentence builder with {} bytes", text.len());
        self
    }

    /// Drop the current input while keeping every buffer for the next one
    pub fn clear(&mut self) -> &mut Self {
        self.original.clear();
        self.current.clear();
        self.index_map.initialize(0);
        self.transformations.clear();
        self.scratch.clear();
        self.annotations.clear();
        self.initialized = false;
        self
    }

    pub fn add_annotation(&mut self, annotation: Annotation) -> &mut Self {
        self.annotations.insert(annotation);
        self
    }

    /// Start an edit session over the working text
    pub fn edit(&mut self) -> BuilderResult<Editor<'_>> {
        Editor::acquire(self)
    }

    /// Resolve conflicts, tokenize and run the spacing pass
    pub fn build(&mut self) -> BuilderResult<Sentence> {
        if !self.initialized {
            return Err(BuilderError::NotInitialized);
        }

        self.scratch.clone_from(&self.transformations);
        let order = self.resolver.resolve(&self.original, &mut self.scratch)?;
        let mut sentence = tokenizer::tokenize(&self.original, &mut self.scratch, order)?;

        if !self.annotations.is_empty() {
            sentence.add_annotations(&self.annotations);
        }

        annotate_sentence(&mut sentence, self.annotator.as_mut(), &mut self.spaced)?;

        debug!(
            "Built sentence: {} words, {} tags from {} transformations",
            sentence.words.len(),
            sentence.tags.len(),
            self.transformations.len()
        );
        Ok(sentence)
    }

    pub fn original_text(&self) -> Option<&str> {
        self.initialized.then_some(self.original.as_str())
    }

    /// Working text after every committed replacement
    pub fn current_text(&self) -> &str {
        &self.current
    }

    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    pub fn annotations(&self) -> &HashSet<Annotation> {
        &self.annotations
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// True while an editor holds the session, including one dropped without commit or abort
    pub fn is_editing(&self) -> bool {
        self.session.in_use
    }

    pub fn index_map(&self) -> &IndexMap {
        &self.index_map
    }
}

impl Default for SentenceBuilder {
    fn default() -> Self {
        Self::with_language("en")
    }
}

impl fmt::Debug for SentenceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentenceBuilder")
            .field("original", &self.original)
            .field("current", &self.current)
            .field("transformations", &self.transformations.len())
            .field("editing", &self.session.in_use)
            .finish()
    }
}

impl fmt::Display for SentenceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::XmlTagFactory;

    fn words_of(sentence: &Sentence) -> Vec<(&str, &str)> {
        sentence
            .words
            .iter()
            .map(|w| (w.text.as_str(), w.original.as_str()))
            .collect()
    }

    #[test]
    fn test_entity_between_words() {
        let text = "Hello&nbsp;world";
        let mut builder = SentenceBuilder::from_text(text);

        let mut editor = builder.edit().unwrap();
        editor.set_word(0, 5, None).unwrap();
        editor.replace(5, 6, " ").unwrap();
        editor.set_word(text.len() - 5, 5, None).unwrap();
        let builder = editor.commit();

        assert_eq!(builder.current_text(), "Hello world");

        let sentence = builder.build().unwrap();
        assert_eq!(words_of(&sentence), vec![("Hello", "Hello"), ("world", "world")]);

        let hello = &sentence.words[0];
        let world = &sentence.words[1];
        assert_eq!(hello.right_space.as_deref(), Some("\u{a0}"));
        assert_eq!(world.left_space.as_deref(), Some("\u{a0}"));
        assert!(!hello.hidden_left_space && !hello.hidden_right_space);
        assert!(!world.hidden_left_space && !world.hidden_right_space);
        assert!(hello.right_space_required && world.left_space_required);
    }

    #[test]
    fn test_earlier_commit_wins_containment() {
        let mut builder = SentenceBuilder::from_text("New York City");

        let mut editor = builder.edit().unwrap();
        editor.set_word(0, 8, None).unwrap();
        let builder = editor.commit();

        let mut editor = builder.edit().unwrap();
        editor.set_word(0, 3, None).unwrap();
        editor.set_word(4, 4, None).unwrap();
        editor.set_word(9, 4, None).unwrap();
        let builder = editor.commit();

        let sentence = builder.build().unwrap();
        assert_eq!(
            words_of(&sentence),
            vec![("New York", "New York"), ("City", "City")]
        );
    }

    #[test]
    fn test_partial_overlap_is_trimmed() {
        let mut builder = SentenceBuilder::from_text("abcdefghij");

        let mut editor = builder.edit().unwrap();
        editor.set_word(0, 5, None).unwrap();
        let builder = editor.commit();

        let mut editor = builder.edit().unwrap();
        editor.set_word(3, 5, None).unwrap();
        let builder = editor.commit();

        let sentence = builder.build().unwrap();
        assert_eq!(words_of(&sentence), vec![("abcde", "abcde"), ("defgh", "fgh")]);
        assert!(sentence.words[1].left_space.is_none());

        // Trimming happens on a copy
        assert_eq!(builder.transformations()[1].start, 3);
        assert_eq!(builder.build().unwrap(), sentence);
    }

    #[test]
    fn test_tags_and_words() {
        let mut builder = SentenceBuilder::from_text("Hi <b>there</b>!");

        let mut editor = builder.edit().unwrap();
        editor.set_tag(3, 3, Some(" "), XmlTagFactory::shared()).unwrap();
        editor.set_tag(11, 4, Some(" "), XmlTagFactory::shared()).unwrap();
        let builder = editor.commit();
        assert_eq!(builder.current_text(), "Hi  there !");

        let mut editor = builder.edit().unwrap();
        editor.set_word(0, 2, None).unwrap();
        editor.set_word(4, 5, None).unwrap();
        editor.set_word(10, 1, None).unwrap();
        let builder = editor.commit();

        let sentence = builder.build().unwrap();
        let spans: Vec<_> = builder.scratch.iter().map(|t| (t.start, t.end)).collect();
        assert_eq!(spans, vec![(3, 6), (11, 15), (0, 2), (6, 11), (15, 16)]);

        assert_eq!(sentence.tags.len(), 2);
        assert_eq!(sentence.tags[0].position, 1);
        assert_eq!(sentence.tags[1].position, 2);

        let there = &sentence.words[1];
        assert!(there.hidden_left_space && there.hidden_right_space);
        assert!(!there.right_space_required);

        assert_eq!(sentence.to_text(true), "Hi <b>there</b>!");
        assert_eq!(sentence.to_text(false), "Hi there!");
    }

    #[test]
    fn test_clear_and_initialize_is_idempotent() {
        fn run(builder: &mut SentenceBuilder, text: &str) -> Sentence {
            builder.initialize(text);
            let mut editor = builder.edit().unwrap();
            editor.replace(5, 3, " ").unwrap();
            editor.set_word(8, 4, None).unwrap();
            let builder = editor.commit();
            let mut editor = builder.edit().unwrap();
            editor.set_word(0, 5, None).unwrap();
            editor.commit().build().unwrap()
        }

        let text = "Hello   you.";
        let mut builder = SentenceBuilder::with_language("en");
        let first = run(&mut builder, text);

        builder.clear();
        assert!(!builder.is_initialized());
        assert_eq!(builder.original_text(), None);

        let second = run(&mut builder, text);
        assert_eq!(first, second);
    }

    #[test]
    fn test_annotations_reset_per_input() {
        let mut builder = SentenceBuilder::from_text("a");
        builder.add_annotation(Annotation::new("has-xml"));
        let sentence = builder.build().unwrap();
        assert!(sentence.has_annotation(&Annotation::new("has-xml")));

        builder.initialize("b");
        assert!(builder.annotations().is_empty());
        assert!(builder.build().unwrap().annotations.is_empty());
    }

    #[test]
    fn test_build_requires_input() {
        let mut builder = SentenceBuilder::default();
        assert!(matches!(builder.build(), Err(BuilderError::NotInitialized)));
    }

    #[test]
    fn test_non_whitespace_round_trip() {
        let text = "  Hi,&amp; <i>bye</i>  ";
        let mut builder = SentenceBuilder::from_text(text);

        let mut editor = builder.edit().unwrap();
        editor.set_tag(11, 3, Some(" "), XmlTagFactory::shared()).unwrap();
        editor.set_tag(17, 4, Some(" "), XmlTagFactory::shared()).unwrap();
        let builder = editor.commit();

        let mut editor = builder.edit().unwrap();
        editor.set_word(2, 2, None).unwrap();
        editor.set_word(4, 1, None).unwrap();
        editor.set_word(5, 5, None).unwrap();
        editor.set_word(12, 3, None).unwrap();
        let builder = editor.commit();

        let sentence = builder.build().unwrap();
        let mut rebuilt = String::new();
        for token in sentence.tokens() {
            rebuilt.push_str(token.left_space().unwrap_or_default());
            rebuilt.push_str(token.text());
            rebuilt.push_str(token.right_space().unwrap_or_default());
        }

        let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        assert_eq!(strip(&rebuilt), strip(text));
        assert_eq!(sentence.words[2].original, "&");
    }

    #[test]
    fn test_display_shows_working_text() {
        let mut builder = SentenceBuilder::from_text("a&lt;b");
        let mut editor = builder.edit().unwrap();
        editor.replace(1, 4, "<").unwrap();
        editor.commit();
        assert_eq!(builder.to_string(), "a<b");
        assert_eq!(builder.original_text(), Some("a&lt;b"));
    }
}
