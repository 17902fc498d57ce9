// WHY: Token capability objects turning a resolved transformation into a concrete token
// The builder only routes on the produced variant and on `is_word` for adjacency flags

use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use super::{Tag, TagKind, Token, Word};

/// Builds a token from a resolved transformation
pub trait TokenFactory: Debug + Send + Sync {
    fn build(
        &self,
        original: &str,
        placeholder: &str,
        left_space: Option<&str>,
        right_space: Option<&str>,
        tag_position: usize,
    ) -> Token;

    /// Whether this factory is the word factory; drives hidden-space detection
    fn is_word(&self) -> bool {
        false
    }
}

pub type TokenFactoryRef = Arc<dyn TokenFactory>;

#[derive(Debug, Default, Clone, Copy)]
pub struct WordFactory;

impl WordFactory {
    /// Shared instance used by `Editor::set_word`
    pub fn shared() -> TokenFactoryRef {
        static WORD_FACTORY: OnceLock<TokenFactoryRef> = OnceLock::new();
        WORD_FACTORY.get_or_init(|| Arc::new(WordFactory)).clone()
    }
}

impl TokenFactory for WordFactory {
    fn build(
        &self,
        original: &str,
        placeholder: &str,
        left_space: Option<&str>,
        right_space: Option<&str>,
        _tag_position: usize,
    ) -> Token {
        Token::Word(Word::new(
            placeholder,
            original,
            left_space.map(str::to_string),
            right_space.map(str::to_string),
        ))
    }

    fn is_word(&self) -> bool {
        true
    }
}

/// Factory for XML-like markup; the kind and name are read from the placeholder
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlTagFactory;

impl XmlTagFactory {
    pub fn shared() -> TokenFactoryRef {
        static XML_TAG_FACTORY: OnceLock<TokenFactoryRef> = OnceLock::new();
        XML_TAG_FACTORY.get_or_init(|| Arc::new(XmlTagFactory)).clone()
    }

    /// Classify markup text like `<b>`, `</b>`, `<br/>` or `<!-- x -->`
    pub fn classify(text: &str) -> (TagKind, Option<String>) {
        let inner = text.trim();
        if inner.starts_with("<!--") {
            return (TagKind::Comment, None);
        }

        let inner = inner.trim_start_matches('<').trim_end_matches('>');
        let (kind, inner) = if let Some(rest) = inner.strip_prefix('/') {
            (TagKind::Closing, rest)
        } else if let Some(rest) = inner.strip_suffix('/') {
            (TagKind::SelfClosing, rest)
        } else {
            (TagKind::Opening, inner)
        };

        let name: String = inner
            .trim_start_matches(['!', '?'])
            .chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            .collect();

        (kind, (!name.is_empty()).then_some(name))
    }
}

impl TokenFactory for XmlTagFactory {
    fn build(
        &self,
        original: &str,
        placeholder: &str,
        left_space: Option<&str>,
        right_space: Option<&str>,
        tag_position: usize,
    ) -> Token {
        let (kind, name) = Self::classify(placeholder);
        Token::Tag(Tag {
            kind,
            name,
            text: placeholder.to_string(),
            original: original.to_string(),
            left_space: left_space.map(str::to_string),
            right_space: right_space.map(str::to_string),
            position: tag_position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tags() {
        assert_eq!(XmlTagFactory::classify("<b>"), (TagKind::Opening, Some("b".into())));
        assert_eq!(XmlTagFactory::classify("</b>"), (TagKind::Closing, Some("b".into())));
        assert_eq!(XmlTagFactory::classify("<br/>"), (TagKind::SelfClosing, Some("br".into())));
        assert_eq!(
            XmlTagFactory::classify("<a href=\"x\">"),
            (TagKind::Opening, Some("a".into()))
        );
        assert_eq!(XmlTagFactory::classify("<!-- note -->"), (TagKind::Comment, None));
    }

    #[test]
    fn test_word_factory_builds_word() {
        let token = WordFactory.build("caf\u{e9}", "cafe", Some(" "), None, 3);
        match token {
            Token::Word(word) => {
                assert_eq!(word.text, "cafe");
                assert_eq!(word.original, "caf\u{e9}");
                assert_eq!(word.left_space.as_deref(), Some(" "));
                assert!(word.right_space.is_none());
            }
            Token::Tag(_) => panic!("word factory produced a tag"),
        }
        assert!(WordFactory.is_word());
        assert!(!XmlTagFactory.is_word());
    }

    #[test]
    fn test_tag_factory_keeps_position() {
        let token = XmlTagFactory.build("<i>", "<i>", None, None, 2);
        match token {
            Token::Tag(tag) => {
                assert_eq!(tag.position, 2);
                assert_eq!(tag.kind, TagKind::Opening);
            }
            Token::Word(_) => panic!("tag factory produced a word"),
        }
    }
}
