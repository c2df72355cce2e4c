//! Pattern extractors: stateless first-hit regex scans for contact fields.
//!
//! Every extractor returns the first match in document order, or `None`.
//! No validation beyond the syntactic shape of the pattern is performed.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
});

// Recall over precision: optional country code, then three 3–5 digit groups.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?\d{1,3})?[\s-]?\(?\d{3,5}\)?[\s-]?\d{3,5}[\s-]?\d{3,5}")
        .expect("valid phone regex")
});

static LINKEDIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https?://)?(www\.)?linkedin\.com/in/[a-zA-Z0-9\-_/]+")
        .expect("valid linkedin regex")
});

static GITHUB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https?://)?(www\.)?github\.com/[a-zA-Z0-9\-_/]+").expect("valid github regex")
});

/// Profile links found in a resume. Each field resolves independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLinks {
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

pub fn extract_email(text: &str) -> Option<String> {
    first_match(&EMAIL_RE, text)
}

pub fn extract_phone(text: &str) -> Option<String> {
    first_match(&PHONE_RE, text)
}

pub fn extract_links(text: &str) -> ExtractedLinks {
    ExtractedLinks {
        linkedin: first_match(&LINKEDIN_RE, text),
        github: first_match(&GITHUB_RE, text),
    }
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_string())
}
