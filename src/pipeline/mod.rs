// WHY: Runs a fixed chain of processing passes over pooled sentence builders
// Each input gets a builder from the pool; builders are cleared and returned after build

use std::sync::Mutex;

use tracing::{debug, warn};

use crate::builder::{Editor, SentenceBuilder};
use crate::config::PreprocessorConfig;
use crate::error::BuilderResult;
use crate::model::Sentence;

pub mod processors;

pub use processors::{EntityProcessor, SimpleTokenizer, WhitespaceNormalizer, XmlTagProcessor};

/// One processing pass over a builder's working text
pub trait TextProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, builder: &mut SentenceBuilder) -> BuilderResult<()>;
}

/// Open an edit session, let `record` queue edits, then commit
///
/// The session is aborted if `record` fails. Returns the number of committed edits.
pub fn run_session<F>(builder: &mut SentenceBuilder, record: F) -> BuilderResult<usize>
where
    F: FnOnce(&mut Editor<'_>) -> BuilderResult<()>,
{
    let mut editor = builder.edit()?;
    match record(&mut editor) {
        Ok(()) => {
            let committed = editor.pending();
            editor.commit();
            Ok(committed)
        }
        Err(e) => {
            editor.abort();
            Err(e)
        }
    }
}

/// Free-list of builders sharing one language
#[derive(Debug)]
pub struct BuilderPool {
    language: String,
    max_idle: usize,
    idle: Mutex<Vec<SentenceBuilder>>,
}

impl BuilderPool {
    pub fn new(language: impl Into<String>, max_idle: usize) -> Self {
        Self {
            language: language.into(),
            max_idle,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Take an idle builder, or create one
    pub fn acquire(&self) -> SentenceBuilder {
        let reused = self.lock().pop();
        reused.unwrap_or_else(|| {
            debug!("Creating new sentence builder for language {}", self.language);
            SentenceBuilder::with_language(&self.language)
        })
    }

    /// Clear `builder` and keep it for reuse
    ///
    /// A builder whose editor was never committed or aborted cannot be edited
    /// again, so it is dropped instead.
    pub fn release(&self, mut builder: SentenceBuilder) {
        if builder.is_editing() {
            warn!("Discarding sentence builder with an unfinished edit session");
            return;
        }
        builder.clear();

        let mut idle = self.lock();
        if idle.len() < self.max_idle {
            idle.push(builder);
        }
    }

    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SentenceBuilder>> {
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Text in, sentence out
pub struct Preprocessor {
    config: PreprocessorConfig,
    processors: Vec<Box<dyn TextProcessor>>,
    pool: BuilderPool,
}

impl Preprocessor {
    /// Passes enabled by `config`, in the order markup, entities, whitespace, words
    pub fn new(config: PreprocessorConfig) -> Self {
        let mut processors: Vec<Box<dyn TextProcessor>> = Vec::new();
        if config.xml_tags {
            processors.push(Box::new(XmlTagProcessor));
        }
        if config.unescape_entities {
            processors.push(Box::new(EntityProcessor));
        }
        if config.normalize_whitespace {
            processors.push(Box::new(WhitespaceNormalizer));
        }
        if config.tokenize {
            processors.push(Box::new(SimpleTokenizer));
        }
        Self::with_processors(config, processors)
    }

    pub fn with_processors(config: PreprocessorConfig, processors: Vec<Box<dyn TextProcessor>>) -> Self {
        let names: Vec<_> = processors.iter().map(|p| p.name()).collect();
        debug!("Preprocessor passes: {:?}", names);

        let pool = BuilderPool::new(config.language.clone(), config.pool_size);
        Self {
            config,
            processors,
            pool,
        }
    }

    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    pub fn pool(&self) -> &BuilderPool {
        &self.pool
    }

    pub fn process(&self, text: &str) -> BuilderResult<Sentence> {
        let mut builder = self.pool.acquire();
        builder.initialize(text);

        let result = self.run(&mut builder);
        self.pool.release(builder);
        result
    }

    fn run(&self, builder: &mut SentenceBuilder) -> BuilderResult<Sentence> {
        for processor in &self.processors {
            processor.process(builder).inspect_err(|e| {
                debug!("Pass {} failed: {}", processor.name(), e);
            })?;
        }
        builder.build()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(PreprocessorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuilderError;

    #[test]
    fn test_run_session_aborts_on_error() {
        let mut builder = SentenceBuilder::from_text("abc");
        let result = run_session(&mut builder, |editor| {
            editor.replace(0, 1, "x")?;
            editor.replace(1, 0, "")
        });

        assert!(matches!(result, Err(BuilderError::EmptyInteriorReplacement { .. })));
        assert!(!builder.is_editing());
        assert_eq!(builder.current_text(), "abc");
    }

    #[test]
    fn test_pool_reuses_cleared_builders() {
        let pool = BuilderPool::new("en", 1);
        let mut builder = pool.acquire();
        builder.initialize("hello");
        pool.release(builder);
        assert_eq!(pool.idle(), 1);

        let builder = pool.acquire();
        assert!(!builder.is_initialized());
        assert_eq!(pool.idle(), 0);

        pool.release(builder);
        pool.release(SentenceBuilder::default());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_pool_drops_builder_left_editing() {
        let pool = BuilderPool::new("en", 4);
        let mut builder = pool.acquire();
        builder.initialize("x");
        drop(builder.edit().unwrap());

        pool.release(builder);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_preprocessor_reuses_builder() {
        let preprocessor = Preprocessor::default();
        let first = preprocessor.process("One <b>two</b>.").unwrap();
        let second = preprocessor.process("One <b>two</b>.").unwrap();

        assert_eq!(first, second);
        assert_eq!(preprocessor.pool().idle(), 1);
        assert_eq!(first.to_text(true), "One <b>two</b>.");
    }

    #[test]
    fn test_disabled_passes() {
        let config = PreprocessorConfig {
            xml_tags: false,
            ..PreprocessorConfig::default()
        };
        let sentence = Preprocessor::new(config).process("<b>").unwrap();
        let texts: Vec<_> = sentence.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["<", "b", ">"]);
        assert!(sentence.tags.is_empty());
    }
}
