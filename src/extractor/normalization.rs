// WHY: every pass over a document must see byte-identical lines, so line cleanup lives in
// one pure module shared by the pre-scan, the metadata extractors and the structural scan

use quick_xml::escape::unescape_with;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

/// Footnote anchor the source site leaves in front of the first note reference
const FOOTNOTE_ANCHOR: &str = r##"<a href="#_ftn1" name="_ftnref1" title="" id="_ftnref1">[1]</a>"##;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));
static SPAN_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<span.*>").expect("Invalid span regex"));
static NOTE_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d{1,4}\]").expect("Invalid note mark regex"));
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Labels of table-of-contents entries that never name a structural division
const NON_STRUCTURAL_LABELS: [&str; 3] = ["Notes", "Variantes", "PDF"];

/// Clean one raw line: non-breaking spaces become spaces, the footnote anchor
/// is dropped and surrounding line terminators are stripped.
pub fn normalize_line(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .replace(FOOTNOTE_ANCHOR, "")
        .trim_matches(|c| c == '\n' || c == '\r')
        .to_string()
}

/// Remove every markup tag, keeping the text between tags.
pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(&text.replace('\u{a0}', " "), "").into_owned()
}

/// Named HTML entities found in play pages
fn html_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "nbsp" => " ",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "laquo" => "«",
        "raquo" => "»",
        "hellip" => "…",
        "rsquo" => "’",
        "lsquo" => "‘",
        "oelig" => "œ",
        "OElig" => "Œ",
        _ => return None,
    };
    Some(value)
}

/// Replace character references with the characters they stand for.
/// Text with an unknown entity or a bare `&` is returned unchanged.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    match unescape_with(text, html_entity) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!("Keeping undecodable text as is: {}", e);
            Cow::Borrowed(text)
        }
    }
}

/// Clean a heading or table-of-contents label.
/// Returns an empty string for labels that are not part of the play structure.
pub fn clean_scene_name(label: &str) -> String {
    let without_spans = label.replace("</span>", "");
    let without_spans = SPAN_OPEN.replace_all(&without_spans, "");
    let without_notes = NOTE_MARK.replace_all(&without_spans, "");
    let text = strip_tags(&without_notes);

    let mut cleaned = text.strip_prefix(' ').unwrap_or(&text);
    cleaned = cleaned.strip_suffix(',').unwrap_or(cleaned);
    cleaned = cleaned.strip_suffix(' ').unwrap_or(cleaned);

    if NON_STRUCTURAL_LABELS.contains(&cleaned) || cleaned.contains("PDF") {
        return String::new();
    }
    cleaned.trim().to_string()
}

/// Derive the canonical identifier of a character name.
///
/// "CLÉANTE." becomes "cléante", "M. JOURDAIN" becomes "m.-jourdain".
pub fn normalize_character_name(name: &str) -> String {
    let trimmed = name.trim();
    let without_period = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let lowered: String = without_period
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '*' | '[' | ']' | '(' | ')'))
        .collect();
    let untagged = strip_tags(&lowered);
    SPACE_RUN.replace_all(untagged.trim(), "-").into_owned()
}
