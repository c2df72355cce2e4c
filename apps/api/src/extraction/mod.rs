// Resume extraction core.
// Field extractors run independently over the same DocumentText; scoring is the
// only step that consumes another extractor's output.
// External models (entity recognizer, role classifier) are optional capabilities.

pub mod entities;
pub mod parser;
pub mod patterns;
pub mod role;
pub mod role_model;
pub mod scoring;
pub mod sections;
pub mod text;
pub mod vocabulary;

pub use parser::{ParseResult, ParserConfig, ResumeParser};
pub use scoring::RequiredSkillSet;
pub use text::DocumentText;
