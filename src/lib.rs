pub mod builder;
pub mod config;
pub mod entity;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod spacing;

// Re-export main types for convenient access
pub use builder::{Editor, SentenceBuilder, Transformation};
pub use config::PreprocessorConfig;
pub use error::{BuilderError, BuilderResult, ErrorCategory};
pub use model::{
    Annotation, Sentence, Tag, TagKind, Token, TokenFactory, TokenFactoryRef, TokenRef, Word,
    WordFactory, XmlTagFactory,
};

// Re-export pipeline and spacing entry points
pub use pipeline::{BuilderPool, Preprocessor, TextProcessor};
pub use spacing::{RuleSpaceAnnotator, SpaceAnnotator, SpaceEvent, SpaceMatch, SpacedText};
