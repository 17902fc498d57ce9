// WHY: Finished sentence representation produced by the builder
// Words and tags live in separate ordered lists; tags are anchored by word count

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod factory;

pub use factory::{TokenFactory, TokenFactoryRef, WordFactory, XmlTagFactory};

/// Opaque marker attached to a sentence by a processing pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation(pub String);

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A word token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Working-text snippet captured when the word was marked
    pub text: String,
    /// Original characters claimed by this word, entities resolved
    pub original: String,
    pub left_space: Option<String>,
    pub right_space: Option<String>,
    /// Adjacent to a tag with no separating characters on the left
    pub hidden_left_space: bool,
    /// Adjacent to a tag with no separating characters on the right
    pub hidden_right_space: bool,
    pub left_space_required: bool,
    pub right_space_required: bool,
}

impl Word {
    pub fn new(
        text: impl Into<String>,
        original: impl Into<String>,
        left_space: Option<String>,
        right_space: Option<String>,
    ) -> Self {
        Self {
            text: text.into(),
            original: original.into(),
            left_space,
            right_space,
            hidden_left_space: false,
            hidden_right_space: false,
            left_space_required: true,
            right_space_required: true,
        }
    }

    pub fn has_left_space(&self) -> bool {
        self.left_space.is_some()
    }

    pub fn has_right_space(&self) -> bool {
        self.right_space.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    Opening,
    Closing,
    SelfClosing,
    Comment,
}

/// A markup tag token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub kind: TagKind,
    pub name: Option<String>,
    pub text: String,
    pub original: String,
    pub left_space: Option<String>,
    pub right_space: Option<String>,
    /// Number of words preceding this tag in the sentence
    pub position: usize,
}

impl Tag {
    pub fn has_left_space(&self) -> bool {
        self.left_space.is_some()
    }

    pub fn has_right_space(&self) -> bool {
        self.right_space.is_some()
    }
}

/// Output of a token factory, routed by variant rather than runtime type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Token {
    Word(Word),
    Tag(Tag),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Word(word) => &word.text,
            Token::Tag(tag) => &tag.text,
        }
    }

    pub fn original(&self) -> &str {
        match self {
            Token::Word(word) => &word.original,
            Token::Tag(tag) => &tag.original,
        }
    }

    pub fn left_space(&self) -> Option<&str> {
        match self {
            Token::Word(word) => word.left_space.as_deref(),
            Token::Tag(tag) => tag.left_space.as_deref(),
        }
    }

    pub fn right_space(&self) -> Option<&str> {
        match self {
            Token::Word(word) => word.right_space.as_deref(),
            Token::Tag(tag) => tag.right_space.as_deref(),
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Token::Word(_))
    }
}

/// Borrowed view over either token kind, yielded by [`Sentence::tokens`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRef<'a> {
    Word(&'a Word),
    Tag(&'a Tag),
}

impl<'a> TokenRef<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            TokenRef::Word(word) => &word.text,
            TokenRef::Tag(tag) => &tag.text,
        }
    }

    pub fn original(&self) -> &'a str {
        match self {
            TokenRef::Word(word) => &word.original,
            TokenRef::Tag(tag) => &tag.original,
        }
    }

    pub fn left_space(&self) -> Option<&'a str> {
        match self {
            TokenRef::Word(word) => word.left_space.as_deref(),
            TokenRef::Tag(tag) => tag.left_space.as_deref(),
        }
    }

    pub fn right_space(&self) -> Option<&'a str> {
        match self {
            TokenRef::Word(word) => word.right_space.as_deref(),
            TokenRef::Tag(tag) => tag.right_space.as_deref(),
        }
    }
}

/// Tokenized sentence: words, tags and the annotations collected while editing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub words: Vec<Word>,
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub annotations: HashSet<Annotation>,
}

impl Sentence {
    pub fn new(words: Vec<Word>, tags: Vec<Tag>) -> Self {
        Self {
            words,
            tags,
            annotations: HashSet::new(),
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn add_annotations<'a>(&mut self, annotations: impl IntoIterator<Item = &'a Annotation>) {
        self.annotations.extend(annotations.into_iter().cloned());
    }

    pub fn has_annotation(&self, annotation: &Annotation) -> bool {
        self.annotations.contains(annotation)
    }

    /// Words and tags merged in text order; a tag at position `p` precedes word `p`
    pub fn tokens(&self) -> impl Iterator<Item = TokenRef<'_>> + '_ {
        let mut words = self.words.iter().enumerate().peekable();
        let mut tags = self.tags.iter().peekable();

        std::iter::from_fn(move || {
            let tag_first = match (words.peek(), tags.peek()) {
                (Some((index, _)), Some(tag)) => tag.position <= *index,
                (None, Some(_)) => true,
                (_, None) => false,
            };

            if tag_first {
                tags.next().map(TokenRef::Tag)
            } else {
                words.next().map(|(_, word)| TokenRef::Word(word))
            }
        })
    }

    /// Re-assemble the token texts, separated by each token's right space
    pub fn to_text(&self, with_tags: bool) -> String {
        let mut result = String::new();
        let mut pending_space: Option<&str> = None;

        for token in self.tokens() {
            if !with_tags && matches!(token, TokenRef::Tag(_)) {
                // A dropped tag still separates its neighbours if it was spaced
                if pending_space.is_none() {
                    pending_space = token.left_space().or(token.right_space());
                }
                continue;
            }

            if !result.is_empty() {
                if let Some(space) = pending_space {
                    result.push_str(space);
                }
            }
            result.push_str(token.text());
            pending_space = token.right_space();
        }

        result
    }
}
