// WHY: the corpus states dates in a handful of recurring narrative phrasings that overlap;
// precedence is encoded as ordered (pattern, handler) tables evaluated first-match-wins

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

/// A recovered date: a single ISO-like value or a year range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlayDate {
    /// "YYYY", "YYYY-MM" or "YYYY-MM-DD"
    When(String),
    Range { not_before: String, not_after: String },
}

impl PlayDate {
    fn when(value: impl Into<String>) -> Self {
        PlayDate::When(value.into())
    }
}

/// The three canonical dates with the lines they were read from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayDates {
    pub written: Option<PlayDate>,
    pub print: Option<PlayDate>,
    pub premiere: Option<PlayDate>,
    pub written_line: Option<String>,
    pub print_line: Option<String>,
    pub premiere_line: Option<String>,
}

impl PlayDates {
    fn any_found(&self) -> bool {
        self.written.is_some() || self.print.is_some() || self.premiere.is_some()
    }
}

const MONTHS: [(&str, &str); 12] = [
    ("janvier", "01"),
    ("fevrier", "02"),
    ("mars", "03"),
    ("avril", "04"),
    ("mai", "05"),
    ("juin", "06"),
    ("juillet", "07"),
    ("aout", "08"),
    ("septembre", "09"),
    ("octobre", "10"),
    ("novembre", "11"),
    ("decembre", "12"),
];

/// Two-digit month number of a French month name, tolerant to accents and known typos
pub fn month_number(month: &str) -> Option<&'static str> {
    let folded = month
        .to_lowercase()
        .replace('é', "e")
        .replace("août", "aout")
        .replace("levrier", "fevrier")
        .replace("fevier", "fevrier");
    MONTHS
        .iter()
        .find(|(name, _)| *name == folded)
        .map(|(_, number)| *number)
}

/// OCR renders "1" as "l" or "|"
fn fix_ocr_digits(value: &str) -> String {
    value.replace(['l', '|'], "1")
}

/// Format a day/month/year triple as "YYYY-MM-DD".
/// Returns `None` when the month name is unknown.
pub fn format_date_yyyymmdd(day: &str, month: &str, year: &str) -> Option<String> {
    let mut day = day.replace("<sup>er</sup>", "");
    if day.chars().count() == 1 {
        day = format!("0{day}");
    }
    let day = fix_ocr_digits(&day).replace("premier", "01");
    let month = month_number(month)?;
    Some(format!("{}-{}-{}", fix_ocr_digits(year), month, day))
}

/// Format a month/year pair as "YYYY-MM"
pub fn format_date_yyyymm(month: &str, year: &str) -> Option<String> {
    let month = month_number(month)?;
    Some(format!("{year}-{month}"))
}

/// Outcome of one line-level rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleOutcome {
    NoMatch,
    Matched,
    Stop,
}

type LineHandler = fn(&Captures<'_>, &str, &mut PlayDates) -> RuleOutcome;

/// One line-level rule: applies only while `guard` holds
struct DateRule {
    name: &'static str,
    guard: fn(&PlayDates) -> bool,
    pattern: Regex,
    handler: LineHandler,
}

impl DateRule {
    fn new(name: &'static str, guard: fn(&PlayDates) -> bool, pattern: &str, handler: LineHandler) -> Self {
        Self {
            name,
            guard,
            pattern: Regex::new(pattern).expect("Invalid date rule regex"),
            handler,
        }
    }
}

type PhraseHandler = fn(&Captures<'_>) -> Option<PlayDate>;

/// One rule of a sub-cascade applied to an extracted phrase
struct PhraseRule {
    pattern: Regex,
    handler: PhraseHandler,
}

impl PhraseRule {
    fn new(pattern: &str, handler: PhraseHandler) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("Invalid date phrase regex"),
            handler,
        }
    }
}

fn first_date(rules: &[PhraseRule], phrase: &str) -> Option<PlayDate> {
    rules.iter().find_map(|rule| {
        rule.pattern
            .captures(phrase)
            .and_then(|caps| (rule.handler)(&caps))
    })
}

fn paragraph_text(line: &str) -> String {
    line.replace("<p>", "").replace("</p>", "")
}

const DAY: &str = r"([l|]?[0-9]+|1<sup>er</sup>|premier)";
const PLAIN_DAY: &str = r"([0-9]+|1<sup>er</sup>|premier)";
const YEAR: &str = r"([l|]?[0-9]+)";

static WRITTEN_PHRASE_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    vec![
        PhraseRule::new(r".*le ([0-9]+) ([^ ]+) ([0-9]+).*", |c| {
            format_date_yyyymmdd(&c[1], &c[2], &c[3]).map(PlayDate::When)
        }),
        PhraseRule::new(r".*en ([0-9]+).*", |c| Some(PlayDate::when(&c[1]))),
        PhraseRule::new(r".*en ([^0-9 ]+) ([0-9]+).*", |c| {
            format_date_yyyymm(&c[1], &c[2]).map(PlayDate::When)
        }),
    ]
});

static PERFORMANCE_PHRASE_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    let one_plain_date = format!(r".* {PLAIN_DAY}[ ]+([^ ]+) ([0-9]+).*");
    let en_year = r".* en ([0-9]+).*";
    vec![
        // first of two full dates
        PhraseRule::new(&format!("{one_plain_date}{one_plain_date}"), |c| {
            format_date_yyyymmdd(&c[1], &c[2], &c[3]).map(PlayDate::When)
        }),
        PhraseRule::new(&format!(r".* {DAY}[ ]+([^ ]+) {YEAR}.*"), |c| {
            format_date_yyyymmdd(&c[1], &c[2], &c[3]).map(PlayDate::When)
        }),
        // day followed by two words, one of which is the month
        PhraseRule::new(&format!(r".* {DAY}[ ]+([^ ]+)[ ]+([^ ]+) {YEAR}.*"), |c| {
            let month = if month_number(&c[2]).is_some() { &c[2] } else { &c[3] };
            format_date_yyyymmdd(&c[1], month, &c[4]).map(PlayDate::When)
        }),
        PhraseRule::new(r".* ([0-9]+)-([0-9]+).*", |c| {
            Some(PlayDate::Range {
                not_before: c[1].to_string(),
                not_after: c[2].to_string(),
            })
        }),
        PhraseRule::new(&en_year.repeat(3), |c| Some(PlayDate::when(&c[1]))),
        PhraseRule::new(&en_year.repeat(2), |c| Some(PlayDate::when(&c[1]))),
        PhraseRule::new(en_year, |c| Some(PlayDate::when(&c[1]))),
        PhraseRule::new(r".* (en|le|de) ([^ ]+) ([0-9]+).*", |c| {
            let formatted = match FUSED_DAY.captures(&c[2]) {
                Some(fused) => format_date_yyyymmdd(&fused[1], &fused[2], &c[3]),
                None => format_date_yyyymm(&c[2], &c[3]),
            };
            formatted.map(PlayDate::When)
        }),
        PhraseRule::new(r".* (en|le|de)([0-9]+) ([^ ]+) ([0-9]+).*", |c| {
            format_date_yyyymmdd(&c[2], &c[3], &c[4]).map(PlayDate::When)
        }),
    ]
});

static FUSED_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)(.*)").expect("Invalid fused day regex"));

fn always(_: &PlayDates) -> bool {
    true
}

static LINE_RULES: LazyLock<Vec<DateRule>> = LazyLock::new(|| {
    vec![
        DateRule::new(
            "cast-header",
            always,
            r#".*<strong><em>Personnages.*</em></strong>.*|<p align="center" style="text-align:center"><b><i>Personnages.*</span></i></b></p>"#,
            |_, _, _| RuleOutcome::Stop,
        ),
        DateRule::new("blank-after-date", PlayDates::any_found, r"^<p> </p>$", |_, _, _| {
            RuleOutcome::Stop
        }),
        DateRule::new("not-performed", always, r"<p>Non représenté[^0-9]*</p>", |_, line, dates| {
            dates.premiere_line = Some(paragraph_text(line));
            RuleOutcome::Stop
        }),
        DateRule::new(
            "written-and-published",
            |d| d.written.is_none() && d.print.is_none(),
            r"<p>.*[ÉéEe]crit en ([0-9]+).* et [op]ublié.* en ([0-9]+).*</p>",
            |c, line, dates| {
                let text = paragraph_text(line);
                dates.written = Some(PlayDate::when(&c[1]));
                dates.print = Some(PlayDate::when(&c[2]));
                dates.written_line = Some(text.clone());
                dates.print_line = Some(text);
                RuleOutcome::Matched
            },
        ),
        DateRule::new(
            "written",
            |d| d.written.is_none(),
            r"<p>.*[ÉéEe]crite? (.*)</p>",
            |c, line, dates| match first_date(&WRITTEN_PHRASE_RULES, &c[1]) {
                Some(date) => {
                    dates.written = Some(date);
                    dates.written_line = Some(paragraph_text(line));
                    RuleOutcome::Matched
                }
                None => RuleOutcome::NoMatch,
            },
        ),
        DateRule::new(
            "published-and-performed-on-day",
            |d| d.premiere.is_none() && d.print.is_none(),
            &format!(r"<p>Publié.* ([0-9]+) et représenté.* {PLAIN_DAY} ([^ ]+) ([0-9]+).*</p>"),
            |c, line, dates| match format_date_yyyymmdd(&c[2], &c[3], &c[4]) {
                Some(day) => {
                    let text = paragraph_text(line);
                    dates.print = Some(PlayDate::when(&c[1]));
                    dates.premiere = Some(PlayDate::When(day));
                    dates.print_line = Some(text.clone());
                    dates.premiere_line = Some(text);
                    RuleOutcome::Matched
                }
                None => RuleOutcome::NoMatch,
            },
        ),
        DateRule::new(
            "published-and-performed",
            |d| d.premiere.is_none() && d.print.is_none(),
            r"<p>Publié.* ([0-9]+) et représenté.* ([0-9]+).*</p>",
            |c, line, dates| {
                let text = paragraph_text(line);
                dates.print = Some(PlayDate::when(&c[1]));
                dates.premiere = Some(PlayDate::when(&c[2]));
                dates.print_line = Some(text.clone());
                dates.premiere_line = Some(text);
                RuleOutcome::Matched
            },
        ),
        DateRule::new(
            "performed",
            |d| d.premiere.is_none(),
            r"<p>.*(fut joué.*)</p>|<p>.*([Rr]eprésenté.*)</p>",
            |c, _, dates| {
                let phrase = c.get(1).or_else(|| c.get(2)).map_or("", |m| m.as_str());
                dates.premiere_line = Some(phrase.to_string());
                match first_date(&PERFORMANCE_PHRASE_RULES, phrase) {
                    Some(date) => {
                        dates.premiere = Some(date);
                        RuleOutcome::Matched
                    }
                    None => RuleOutcome::NoMatch,
                }
            },
        ),
        DateRule::new(
            "print-year",
            |d| d.print.is_none(),
            r"<p>([0-9]+).*</p>|<p>Imprimée en ([0-9]+).*</p>|<p>Non représentée[,\.] ([0-9]+).*</p>",
            |c, line, dates| {
                let year = c
                    .get(1)
                    .or_else(|| c.get(2))
                    .or_else(|| c.get(3))
                    .map_or("", |m| m.as_str());
                if year.len() != 4 {
                    return RuleOutcome::NoMatch;
                }
                dates.print = Some(PlayDate::when(year));
                dates.print_line = Some(paragraph_text(line));
                RuleOutcome::Matched
            },
        ),
    ]
});

/// Recover written, print and premiere dates from the header paragraphs
pub fn extract_dates(lines: &[String]) -> PlayDates {
    let mut dates = PlayDates::default();

    'lines: for line in lines {
        for rule in LINE_RULES.iter() {
            if !(rule.guard)(&dates) {
                continue;
            }
            let Some(caps) = rule.pattern.captures(line) else {
                continue;
            };
            match (rule.handler)(&caps, line, &mut dates) {
                RuleOutcome::Stop => {
                    debug!("Date scan stopped by rule {}", rule.name);
                    break 'lines;
                }
                RuleOutcome::Matched => debug!("Date rule {} matched: {}", rule.name, line),
                RuleOutcome::NoMatch => {}
            }
        }
    }
    dates
}
