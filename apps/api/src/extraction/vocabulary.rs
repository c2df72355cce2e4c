//! Skill and language vocabularies, and the substring matcher run against them.

use serde::Serialize;
use thiserror::Error;

use crate::extraction::text::DocumentText;

pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "java",
    "sql",
    "machine learning",
    "deep learning",
    "data analysis",
    "django",
    "flask",
    "excel",
];

pub const DEFAULT_LANGUAGES: &[&str] = &[
    "english", "hindi", "telugu", "tamil", "kannada", "french", "german",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Duplicate vocabulary term: '{0}'")]
    Duplicate(String),

    #[error("Vocabulary terms must not be empty")]
    EmptyTerm,
}

/// Ordered list of canonical lowercase terms. Built once at startup and
/// shared read-only; duplicates are rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn new<I, S>(terms: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if term.is_empty() {
                return Err(VocabularyError::EmptyTerm);
            }
            if canonical.contains(&term) {
                return Err(VocabularyError::Duplicate(term));
            }
            canonical.push(term);
        }
        Ok(Self { terms: canonical })
    }

    pub fn default_skills() -> Self {
        Self::from_static(DEFAULT_SKILLS)
    }

    pub fn default_languages() -> Self {
        Self::from_static(DEFAULT_LANGUAGES)
    }

    fn from_static(terms: &[&str]) -> Self {
        Self {
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Looks up vocabulary terms in a document. Implement this to swap the
/// matching strategy (e.g. word-boundary tokenization) without touching the
/// orchestrator.
pub trait TermMatcher: Send + Sync {
    /// Returns matching terms in vocabulary order.
    fn find_terms(&self, text: &DocumentText, vocabulary: &Vocabulary) -> Vec<String>;
}

/// Case-insensitive substring containment. "sql" matches inside "mysql";
/// this imprecision is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl TermMatcher for SubstringMatcher {
    fn find_terms(&self, text: &DocumentText, vocabulary: &Vocabulary) -> Vec<String> {
        let lowered = text.to_lowercase();
        vocabulary
            .terms()
            .iter()
            .filter(|term| lowered.contains(term.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(s: &str) -> DocumentText {
        DocumentText::new(s).unwrap()
    }

    #[test]
    fn test_duplicate_terms_rejected() {
        let err = Vocabulary::new(["python", "SQL", "sql"]).unwrap_err();
        assert_eq!(err, VocabularyError::Duplicate("sql".to_string()));
    }

    #[test]
    fn test_empty_term_rejected() {
        assert_eq!(
            Vocabulary::new(["python", "  "]).unwrap_err(),
            VocabularyError::EmptyTerm
        );
    }

    #[test]
    fn test_terms_are_canonicalized() {
        let vocab = Vocabulary::new([" Machine Learning ", "Rust"]).unwrap();
        assert_eq!(vocab.terms(), &["machine learning", "rust"]);
    }

    #[test]
    fn test_default_vocabularies_are_valid() {
        let skills = Vocabulary::default_skills();
        assert_eq!(Vocabulary::new(skills.terms()).unwrap(), skills);
        let languages = Vocabulary::default_languages();
        assert_eq!(Vocabulary::new(languages.terms()).unwrap(), languages);
    }

    #[test]
    fn test_matches_are_case_insensitive() {
        let found = SubstringMatcher.find_terms(
            &doc("Built ETL in PYTHON and Excel"),
            &Vocabulary::default_skills(),
        );
        assert_eq!(found, vec!["python", "excel"]);
    }

    #[test]
    fn test_output_follows_vocabulary_order() {
        let text = doc("Flask, Django, SQL, Java");
        let found = SubstringMatcher.find_terms(&text, &Vocabulary::default_skills());
        assert_eq!(found, vec!["java", "sql", "django", "flask"]);
    }

    #[test]
    fn test_substring_semantics_match_inside_tokens() {
        let found = SubstringMatcher.find_terms(
            &doc("Administered MySQL clusters"),
            &Vocabulary::default_skills(),
        );
        assert_eq!(found, vec!["sql"]);
    }

    #[test]
    fn test_matches_are_subset_of_vocabulary_and_present_in_text() {
        let text = doc("Fluent in English and German; Data Analysis with Python, javascript");
        let vocab = Vocabulary::default_skills();
        let found = SubstringMatcher.find_terms(&text, &vocab);
        let lowered = text.to_lowercase();
        for term in &found {
            assert!(vocab.terms().contains(term));
            assert!(lowered.contains(term.as_str()));
        }
        // "java" appears inside "javascript"
        assert_eq!(found, vec!["python", "java", "data analysis"]);
    }

    #[test]
    fn test_languages_vocabulary() {
        let found = SubstringMatcher.find_terms(
            &doc("Languages: Telugu, English, French"),
            &Vocabulary::default_languages(),
        );
        assert_eq!(found, vec!["english", "telugu", "french"]);
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let found = SubstringMatcher.find_terms(
            &doc("Carpentry and woodwork"),
            &Vocabulary::default_skills(),
        );
        assert!(found.is_empty());
    }
}
