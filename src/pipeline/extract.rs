//! Text extraction: OCR text → candidate name and GPA.
//!
//! Both extractors are plain pattern matching over free text and never fail.
//! Anything they cannot find comes back as a sentinel (`"UNKNOWN"`) or `None`
//! and is surfaced downstream as a `GPA NOT FOUND` verdict.
//!
//! ## Ordering rules
//!
//! * Name: an explicit `NAME OF THE CANDIDATE` label wins over the
//!   all-caps heuristic, and the first label in the document is used.
//! * GPA: a labelled value wins over a bare decimal, and among several
//!   matches the **last** one in the document is used. Transcripts usually
//!   print the cumulative figure below the per-term ones. Unrelated decimals
//!   after the real GPA (course codes such as `3.14`) will misfire; that is
//!   accepted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Returned when no name can be found.
pub const UNKNOWN_NAME: &str = "UNKNOWN";

/// Label introducing the candidate's name on the next line.
const NAME_LABEL: &str = "NAME OF THE CANDIDATE";

/// Only this many non-blank lines are scanned by the all-caps fallback.
const NAME_SCAN_LINES: usize = 20;

/// Label, any run of non-digits, then `digits.digits`.
static LABELLED_GPA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(CGPA|GPA|CUMULATIVE GRADE POINT AVERAGE)[^\d]*([0-9]+\.[0-9]+)")
        .expect("valid regex")
});

/// `digits.digits`, ASCII digits only.
static BARE_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+\.[0-9]+").expect("valid regex"));

/// Name and GPA derived from one OCR text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Title-cased name, or [`UNKNOWN_NAME`].
    pub name: String,
    /// GPA if any candidate decimal was found.
    pub gpa: Option<f64>,
}

/// Run both extractors over the OCR text.
pub fn extract(ocr_text: &str) -> ExtractionResult {
    let result = ExtractionResult {
        name: extract_name(ocr_text),
        gpa: extract_gpa(ocr_text),
    };
    debug!("Extracted name={:?} gpa={:?}", result.name, result.gpa);
    result
}

/// Find the candidate's name.
///
/// 1. First line containing `NAME OF THE CANDIDATE` (any case): the next
///    non-blank line, or if the label is the last line, the text after its
///    last colon.
/// 2. Otherwise the first upper-case line with 2–4 words among the first 20
///    non-blank lines.
/// 3. Otherwise [`UNKNOWN_NAME`].
pub fn extract_name(ocr_text: &str) -> String {
    let lines: Vec<&str> = ocr_text
        .split(is_line_break)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if let Some(i) = lines
        .iter()
        .position(|l| l.to_uppercase().contains(NAME_LABEL))
    {
        let raw = match lines.get(i + 1) {
            Some(next) => *next,
            None => lines[i].rsplit(':').next().unwrap_or(lines[i]),
        };
        return clean_name(raw);
    }

    lines
        .iter()
        .take(NAME_SCAN_LINES)
        .find(|l| is_upper(l) && (2..=4).contains(&l.split_whitespace().count()))
        .map(|l| clean_name(l))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Normalise a raw name line.
///
/// Drops the last token when there are more than two tokens and it is a
/// single character (`JOHN SMITH Q` → `JOHN SMITH`), collapses whitespace,
/// and title-cases. An empty result becomes [`UNKNOWN_NAME`].
pub fn clean_name(raw: &str) -> String {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() > 2 && tokens.last().is_some_and(|t| t.chars().count() == 1) {
        tokens.pop();
    }

    let cleaned = title_case(&tokens.join(" "));
    if cleaned.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        cleaned
    }
}

/// Find the GPA.
///
/// The last labelled match (`CGPA`, `GPA`, `CUMULATIVE GRADE POINT AVERAGE`)
/// wins; failing that, the last bare `digits.digits` in the text.
pub fn extract_gpa(ocr_text: &str) -> Option<f64> {
    let labelled = LABELLED_GPA
        .captures_iter(ocr_text)
        .last()
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse::<f64>().ok());
    if labelled.is_some() {
        return labelled;
    }

    BARE_DECIMAL
        .find_iter(ocr_text)
        .last()
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Line boundaries, including the form feed tesseract emits after each page.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// True when the line has at least one cased character and none of its
/// cased characters are lower-case.
fn is_upper(line: &str) -> bool {
    let mut cased = false;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
