use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::extraction::scoring::RequiredSkillSet;
use crate::extraction::vocabulary::Vocabulary;
use crate::extraction::ParserConfig;

/// Application configuration loaded from environment variables.
/// Every variable is optional; unset values fall back to built-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub skills_vocabulary: Option<String>,
    pub languages_vocabulary: Option<String>,
    pub default_required_skills: Option<String>,
    pub resume_sections: Option<String>,
    pub role_model_path: Option<PathBuf>,
    pub role_vectorizer_path: Option<PathBuf>,
    pub ner_service_url: Option<String>,
    /// Fail startup when the entity recognizer cannot be reached.
    pub ner_required: bool,
    pub model_timeout: Duration,
    pub max_concurrent_parses: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            skills_vocabulary: optional_env("SKILLS_VOCABULARY"),
            languages_vocabulary: optional_env("LANGUAGES_VOCABULARY"),
            default_required_skills: optional_env("DEFAULT_REQUIRED_SKILLS"),
            resume_sections: optional_env("RESUME_SECTIONS"),
            role_model_path: optional_env("ROLE_MODEL_PATH").map(PathBuf::from),
            role_vectorizer_path: optional_env("ROLE_VECTORIZER_PATH").map(PathBuf::from),
            ner_service_url: optional_env("NER_SERVICE_URL"),
            ner_required: parse_env("NER_REQUIRED", false)?,
            model_timeout: Duration::from_millis(parse_env("MODEL_TIMEOUT_MS", 5000)?),
            max_concurrent_parses: parse_env::<usize>("MAX_CONCURRENT_PARSES", 4)?.max(1),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// Builds the read-only extraction settings, validating vocabularies.
    pub fn parser_config(&self) -> Result<ParserConfig> {
        let mut parser_config = ParserConfig::default();

        if let Some(csv) = &self.skills_vocabulary {
            parser_config.skills =
                Vocabulary::new(split_csv(csv)).context("SKILLS_VOCABULARY is invalid")?;
        }
        if let Some(csv) = &self.languages_vocabulary {
            parser_config.languages =
                Vocabulary::new(split_csv(csv)).context("LANGUAGES_VOCABULARY is invalid")?;
        }
        if let Some(csv) = &self.default_required_skills {
            parser_config.default_required_skills = RequiredSkillSet::from_csv(csv);
        }
        if let Some(csv) = &self.resume_sections {
            parser_config.sections = split_csv(csv).map(str::to_lowercase).collect();
        }

        Ok(parser_config)
    }
}

fn split_csv(csv: &str) -> impl Iterator<Item = &str> {
    csv.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            skills_vocabulary: None,
            languages_vocabulary: None,
            default_required_skills: None,
            resume_sections: None,
            role_model_path: None,
            role_vectorizer_path: None,
            ner_service_url: None,
            ner_required: false,
            model_timeout: Duration::from_secs(5),
            max_concurrent_parses: 4,
            max_upload_bytes: 1024,
        }
    }

    #[test]
    fn test_defaults_produce_builtin_parser_config() {
        let parser_config = base_config().parser_config().unwrap();
        assert_eq!(parser_config.skills, Vocabulary::default_skills());
        assert_eq!(parser_config.languages, Vocabulary::default_languages());
        assert_eq!(parser_config.sections, vec!["education", "experience"]);
        assert_eq!(
            parser_config.default_required_skills,
            RequiredSkillSet::builtin()
        );
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config {
            skills_vocabulary: Some("Rust, Go ,kubernetes".to_string()),
            default_required_skills: Some("rust,go".to_string()),
            resume_sections: Some("Education, Projects".to_string()),
            ..base_config()
        };
        let parser_config = config.parser_config().unwrap();
        assert_eq!(parser_config.skills.terms(), &["rust", "go", "kubernetes"]);
        assert_eq!(parser_config.default_required_skills.skills(), &["rust", "go"]);
        assert_eq!(parser_config.sections, vec!["education", "projects"]);
    }

    #[test]
    fn test_duplicate_vocabulary_is_rejected() {
        let config = Config {
            languages_vocabulary: Some("english,English".to_string()),
            ..base_config()
        };
        let err = config.parser_config().unwrap_err();
        assert!(err.to_string().contains("LANGUAGES_VOCABULARY"));
    }
}
