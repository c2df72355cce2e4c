//! Section segmentation: heading-shaped boundaries slice resume text into
//! labeled blocks such as "education" and "experience".
//!
//! A section starts at the first case-insensitive occurrence of its name,
//! optionally followed by `:` or `-`. The body runs until the earliest of:
//! a blank line, a line that looks like a new heading (uppercase letter, then
//! letters/spaces, then `:`), or the end of the text.
//!
//! The boundary check looks only at heading shape, not at known section
//! names, so a body line such as "Note: ..." ends the section early.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

static HEADING_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[A-Z][a-zA-Z ]+:").expect("valid heading boundary regex"));

/// Section name → section body. A key is present only when its heading was found.
pub type SectionMap = BTreeMap<String, String>;

/// Splits text into named sections. Implement this to replace the heuristic
/// without touching the orchestrator.
pub trait SectionSegmenter: Send + Sync {
    fn extract_section(&self, text: &str, section_name: &str) -> Option<String>;

    fn extract_sections(&self, text: &str, section_names: &[String]) -> SectionMap {
        section_names
            .iter()
            .filter_map(|name| {
                self.extract_section(text, name)
                    .map(|body| (name.clone(), body))
            })
            .collect()
    }
}

/// The default blank-line / heading-shape heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingSegmenter;

impl SectionSegmenter for HeadingSegmenter {
    fn extract_section(&self, text: &str, section_name: &str) -> Option<String> {
        extract_section(text, section_name)
    }
}

/// Returns the trimmed body under the first `section_name` heading, `Some("")`
/// for a heading with no body, or `None` if the heading never appears.
pub fn extract_section(text: &str, section_name: &str) -> Option<String> {
    let heading = RegexBuilder::new(&format!(r"{}[ \t]*[:\-]?", regex::escape(section_name)))
        .case_insensitive(true)
        .build()
        .ok()?;

    let start = heading.find(text)?.end();
    let rest = &text[start..];
    let end = section_boundary(rest);

    Some(rest[..end].trim().to_string())
}

/// Byte offset of the earliest boundary in `rest`, or its length.
fn section_boundary(rest: &str) -> usize {
    let blank_line = rest.find("\n\n");
    let next_heading = HEADING_BOUNDARY_RE.find(rest).map(|m| m.start());

    match (blank_line, next_heading) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => rest.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Education:\nBSc CS\n\nExperience:\nIntern";

    #[test]
    fn test_education_stops_at_blank_line() {
        assert_eq!(extract_section(SAMPLE, "education").as_deref(), Some("BSc CS"));
    }

    #[test]
    fn test_last_section_runs_to_end_of_text() {
        assert_eq!(extract_section(SAMPLE, "experience").as_deref(), Some("Intern"));
    }

    #[test]
    fn test_missing_heading_is_absent() {
        assert_eq!(extract_section(SAMPLE, "projects"), None);
    }

    #[test]
    fn test_heading_without_body_is_empty_string() {
        let text = "Education:\n\nExperience:\nIntern at Acme";
        assert_eq!(extract_section(text, "education").as_deref(), Some(""));
    }

    #[test]
    fn test_stops_at_next_heading_shaped_line() {
        let text = "EDUCATION - MSc Physics\nThesis on optics\nWork History: Lab assistant";
        assert_eq!(
            extract_section(text, "education").as_deref(),
            Some("MSc Physics\nThesis on optics")
        );
    }

    #[test]
    fn test_only_first_occurrence_is_used() {
        let text = "Experience:\nFirst job\n\nExperience:\nSecond job";
        assert_eq!(extract_section(text, "experience").as_deref(), Some("First job"));
    }

    #[test]
    fn test_heading_shaped_body_line_truncates_early() {
        let text = "Experience:\nBackend developer\nNote: contract role\nMaintained APIs";
        assert_eq!(
            extract_section(text, "experience").as_deref(),
            Some("Backend developer")
        );
    }

    #[test]
    fn test_lowercase_line_is_not_a_boundary() {
        let text = "Experience:\nBuilt pipelines\nkey tools: airflow\nEnd";
        assert_eq!(
            extract_section(text, "experience").as_deref(),
            Some("Built pipelines\nkey tools: airflow\nEnd")
        );
    }

    #[test]
    fn test_section_name_is_regex_escaped() {
        let text = "C++ (advanced): templates\n\nOther";
        assert_eq!(
            extract_section(text, "c++ (advanced)").as_deref(),
            Some("templates")
        );
    }

    #[test]
    fn test_extract_sections_only_includes_found_keys() {
        let names = vec![
            "education".to_string(),
            "experience".to_string(),
            "certifications".to_string(),
        ];
        let sections = HeadingSegmenter.extract_sections(SAMPLE, &names);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["education"], "BSc CS");
        assert_eq!(sections["experience"], "Intern");
        assert!(!sections.contains_key("certifications"));
    }
}
