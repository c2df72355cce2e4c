//! ResumeParser: composes the field extractors into one `ParseResult`.
//!
//! Extractors are independent; only scoring consumes another extractor's
//! output (the matched skills). A field that finds nothing is absent, never
//! an error. Decoding failures are the only way a parse does not produce a
//! result, and those happen before the parser is reached.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::decoding::{self, DecodeError};
use crate::extraction::entities::EntityExtractor;
use crate::extraction::patterns::{extract_email, extract_links, extract_phone, ExtractedLinks};
use crate::extraction::role::RoleClassifier;
use crate::extraction::scoring::{score, MatchScore, RequiredSkillSet};
use crate::extraction::sections::{HeadingSegmenter, SectionMap, SectionSegmenter};
use crate::extraction::text::DocumentText;
use crate::extraction::vocabulary::{SubstringMatcher, TermMatcher, Vocabulary};

pub const DEFAULT_SECTIONS: &[&str] = &["education", "experience"];

/// Read-only settings shared by every parse.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub skills: Vocabulary,
    pub languages: Vocabulary,
    pub sections: Vec<String>,
    /// Used when the caller supplies no required skills.
    pub default_required_skills: RequiredSkillSet,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            skills: Vocabulary::default_skills(),
            languages: Vocabulary::default_languages(),
            sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
            default_required_skills: RequiredSkillSet::builtin(),
        }
    }
}

/// Everything extracted from one resume. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub links: ExtractedLinks,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub sections: SectionMap,
    pub predicted_role: String,
    pub resume_score: MatchScore,
}

impl ParseResult {
    /// Key/value text listing, one field per paragraph.
    pub fn to_listing(&self) -> String {
        fn opt(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("None")
        }

        let mut entries: Vec<(String, String)> = vec![
            ("Name".to_string(), opt(&self.name).to_string()),
            ("Email".to_string(), opt(&self.email).to_string()),
            ("Phone".to_string(), opt(&self.phone).to_string()),
            ("Linkedin".to_string(), opt(&self.links.linkedin).to_string()),
            ("Github".to_string(), opt(&self.links.github).to_string()),
            ("Skills".to_string(), self.skills.join(", ")),
            ("Languages".to_string(), self.languages.join(", ")),
        ];
        for (section, body) in &self.sections {
            entries.push((capitalize(section), body.clone()));
        }
        entries.push(("Predicted_role".to_string(), self.predicted_role.clone()));
        entries.push(("Resume_score".to_string(), self.resume_score.to_string()));

        entries
            .iter()
            .map(|(key, value)| format!("{key}: {value}\n\n"))
            .collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The extraction pipeline. Construct once at startup and share behind an
/// `Arc`; `parse` takes `&self` and keeps no per-call state.
pub struct ResumeParser {
    config: ParserConfig,
    entities: EntityExtractor,
    roles: RoleClassifier,
    matcher: Arc<dyn TermMatcher>,
    segmenter: Arc<dyn SectionSegmenter>,
}

impl ResumeParser {
    pub fn new(config: ParserConfig, entities: EntityExtractor, roles: RoleClassifier) -> Self {
        Self {
            config,
            entities,
            roles,
            matcher: Arc::new(SubstringMatcher),
            segmenter: Arc::new(HeadingSegmenter),
        }
    }

    /// A parser with no external models: name absent, role is the sentinel.
    pub fn without_models(config: ParserConfig) -> Self {
        Self::new(config, EntityExtractor::disabled(), RoleClassifier::unavailable())
    }

    pub fn with_term_matcher(mut self, matcher: Arc<dyn TermMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn SectionSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn has_entity_recognizer(&self) -> bool {
        self.entities.is_available()
    }

    pub fn has_role_model(&self) -> bool {
        self.roles.is_available()
    }

    /// Resolves the caller's required skills: `None` or an empty set falls
    /// back to the configured default.
    pub fn required_skills(&self, requested: Option<RequiredSkillSet>) -> RequiredSkillSet {
        match requested {
            Some(skills) if !skills.is_empty() => skills,
            _ => self.config.default_required_skills.clone(),
        }
    }

    pub async fn parse(
        &self,
        text: &DocumentText,
        required_skills: Option<RequiredSkillSet>,
    ) -> ParseResult {
        let required = self.required_skills(required_skills);
        let raw = text.as_str();

        let (name, predicted_role) =
            tokio::join!(self.entities.extract_name(text), self.roles.predict_role(text));

        let skills = self.matcher.find_terms(text, &self.config.skills);
        let languages = self.matcher.find_terms(text, &self.config.languages);
        let resume_score = score(&skills, &required);

        let result = ParseResult {
            name,
            email: extract_email(raw),
            phone: extract_phone(raw),
            links: extract_links(raw),
            skills,
            languages,
            sections: self.segmenter.extract_sections(raw, &self.config.sections),
            predicted_role,
            resume_score,
        };

        debug!(
            "Parsed resume: {} skills, {} languages, {} sections, score {}",
            result.skills.len(),
            result.languages.len(),
            result.sections.len(),
            result.resume_score
        );
        result
    }

    /// Decodes a `.pdf` or `.docx` file and parses it.
    pub async fn parse_file(
        &self,
        path: &Path,
        required_skills: Option<RequiredSkillSet>,
    ) -> Result<ParseResult, DecodeError> {
        let text = decoding::decode_file(path.to_path_buf()).await?;
        Ok(self.parse(&text, required_skills).await)
    }
}
