//! DOCX text extraction: one line per body paragraph of `word/document.xml`.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use zip::ZipArchive;

use super::DecodeError;

const DOCUMENT_PART: &str = "word/document.xml";

// Order matters: a self-closing paragraph must win over an opening tag.
static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
        (?P<pempty><w:p(?:\s[^>]*)?/>)
        | (?P<pstart><w:p(?:\s[^>]*)?>)
        | (?P<pend></w:p>)
        | <w:t(?:\s[^>]*)?>(?P<text>[^<]*)</w:t>
        | (?P<tab><w:tab(?:\s[^>]*)?/>)
        | (?P<brk><w:(?:br|cr)(?:\s[^>]*)?/>)
        "#,
    )
    .expect("valid docx markup regex")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(amp|lt|gt|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").expect("valid entity regex")
});

pub fn extract_text(bytes: &[u8]) -> Result<String, DecodeError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    match archive.by_name(DOCUMENT_PART) {
        Ok(mut part) => {
            part.read_to_string(&mut xml)
                .map_err(|e| DecodeError::Docx(format!("unreadable {DOCUMENT_PART}: {e}")))?;
        }
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(DecodeError::Docx(format!("missing {DOCUMENT_PART}")));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(paragraphs(&xml).join("\n"))
}

/// Paragraph texts in document order. Runs are concatenated; tabs and
/// breaks inside a paragraph become `\t` and `\n`.
fn paragraphs(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;

    for caps in MARKUP_RE.captures_iter(xml) {
        if caps.name("pempty").is_some() {
            paragraphs.push(String::new());
        } else if caps.name("pstart").is_some() {
            current = Some(String::new());
        } else if caps.name("pend").is_some() {
            if let Some(text) = current.take() {
                paragraphs.push(text);
            }
        } else if let Some(buf) = current.as_mut() {
            if let Some(text) = caps.name("text") {
                buf.push_str(&unescape(text.as_str()));
            } else if caps.name("tab").is_some() {
                buf.push('\t');
            } else if caps.name("brk").is_some() {
                buf.push('\n');
            }
        }
    }

    paragraphs
}

fn unescape(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            match entity {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}
