//! Resume scoring: percentage of required skills covered by extracted skills.

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

pub const DEFAULT_REQUIRED_SKILLS: &[&str] = &["python", "sql", "data analysis"];

/// Caller-supplied target skills. Terms are trimmed, lowercased and
/// de-duplicated (first occurrence kept) so they compare against the
/// canonical terms produced by the skill matcher.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RequiredSkillSet(Vec<String>);

impl RequiredSkillSet {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical: Vec<String> = Vec::new();
        for skill in skills {
            let skill = skill.as_ref().trim().to_lowercase();
            if !skill.is_empty() && !canonical.contains(&skill) {
                canonical.push(skill);
            }
        }
        Self(canonical)
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_REQUIRED_SKILLS)
    }

    /// Parses a comma-separated list, as sent by form fields and env vars.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn skills(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Skill-match percentage in `[0, 100]`. Kept unrounded; rendering (and
/// serialization) formats it to two decimals as `"66.67% match"`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct MatchScore(f64);

impl MatchScore {
    pub fn percent(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}% match", self.0)
    }
}

impl Serialize for MatchScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `|extracted ∩ required| / |required| × 100`.
///
/// An empty required set scores 0 rather than dividing by zero. Comparison is
/// exact on the canonical lowercase terms.
pub fn score(extracted: &[String], required: &RequiredSkillSet) -> MatchScore {
    if required.is_empty() {
        return MatchScore(0.0);
    }

    let extracted: HashSet<&str> = extracted.iter().map(String::as_str).collect();
    let matched = required
        .skills()
        .iter()
        .filter(|skill| extracted.contains(skill.as_str()))
        .count();

    let raw = matched as f64 / required.skills().len() as f64 * 100.0;
    MatchScore(raw.clamp(0.0, 100.0))
}
