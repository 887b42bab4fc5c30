// WHY: the scanners are line-oriented, so markup split over physical lines or wrapped in
// presentational spans must be regularized before the line normalizer runs

use regex::Regex;
use std::sync::LazyLock;

static DOUBLE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:<span style=[^>]*">){2}(.*)(?:</span>){2}"#).expect("Invalid double span regex")
});
static SINGLE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span style=[^>]*">(.*)</span>"#).expect("Invalid span regex"));

/// Join paragraphs opened on one line and closed on a later one
pub fn join_split_paragraphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<String> = None;

    for line in text.lines() {
        match pending.as_mut() {
            Some(joined) => {
                joined.push_str(line);
                if line.contains("</p>") {
                    out.push_str(joined);
                    out.push('\n');
                    pending = None;
                }
            }
            None => {
                if line.contains("<p") && !line.contains("</p>") {
                    pending = Some(line.trim_end().to_string());
                } else {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
    }
    if let Some(joined) = pending {
        out.push_str(&joined);
        out.push('\n');
    }
    out
}

/// Unwrap doubly then singly nested styling spans
pub fn remove_style_spans(text: &str) -> String {
    let unwrapped = DOUBLE_SPAN.replace_all(text, "$1");
    SINGLE_SPAN.replace_all(&unwrapped, "$1").into_owned()
}

/// Full pre-normalization of a raw HTML page
pub fn prenormalize(text: &str) -> String {
    let joined = join_split_paragraphs(text);
    remove_style_spans(&joined).replace('\x01', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_split_paragraph() {
        let joined = join_split_paragraphs("<p>Hé quoi,\nmonsieur ?</p>\n<p>Non.</p>\n");
        assert_eq!(joined, "<p>Hé quoi,monsieur ?</p>\n<p>Non.</p>\n");
    }

    #[test]
    fn test_join_over_several_lines() {
        let joined = join_split_paragraphs("<p align=\"center\">\nVALÈRE,\n<em>seul</em></p>");
        assert_eq!(joined, "<p align=\"center\">VALÈRE,<em>seul</em></p>\n");
    }

    #[test]
    fn test_remove_spans() {
        let text = r#"<p><span style="font-size:12pt"><span style="color:red">Sire,</span></span></p>"#;
        assert_eq!(remove_style_spans(text), "<p>Sire,</p>");
        let text = r#"<p><span style="x">Madame</span></p>"#;
        assert_eq!(remove_style_spans(text), "<p>Madame</p>");
    }

    #[test]
    fn test_prenormalize_removes_control_characters() {
        assert_eq!(prenormalize("<p>A\x01B</p>"), "<p>AB</p>\n");
    }
}
