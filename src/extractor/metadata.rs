// WHY: title, author, genre and verse form are each recovered by an independent best-effort
// recognizer over the whole line sequence; misses leave documented defaults

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use super::dates::{extract_dates, PlayDates};

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>(.*)</title>").expect("Invalid title regex"));
static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p>(.*)</p>").expect("Invalid paragraph regex"));
static ACT_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(un|deux|trois|quatre|cinq|six|sept) actes?").expect("Invalid act count regex")
});

/// Closed genre vocabulary of the source corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Genre {
    Tragedie,
    Comedie,
    TragiComedie,
    Farce,
    Vaudeville,
    Proverbe,
    Pastorale,
    ComedieMusicale,
    Dialogue,
    Monologue,
    #[default]
    Undefined,
}

/// Accent-stripped keywords in match priority order
const GENRE_KEYWORDS: [(&str, Genre); 11] = [
    ("tragedie", Genre::Tragedie),
    ("comedie", Genre::Comedie),
    ("tragicomedie", Genre::TragiComedie),
    ("tragi-comedie", Genre::TragiComedie),
    ("farce", Genre::Farce),
    ("vaudeville", Genre::Vaudeville),
    ("proverbe", Genre::Proverbe),
    ("pastorale", Genre::Pastorale),
    ("comedie musicale", Genre::ComedieMusicale),
    ("dialogue", Genre::Dialogue),
    ("monologue", Genre::Monologue),
];

impl Genre {
    pub fn label(self) -> &'static str {
        match self {
            Genre::Tragedie => "Tragédie",
            Genre::Comedie => "Comédie",
            Genre::TragiComedie => "Tragi-Comédie",
            Genre::Farce => "Farce",
            Genre::Vaudeville => "Vaudeville",
            Genre::Proverbe => "Proverbe",
            Genre::Pastorale => "Pastorale",
            Genre::ComedieMusicale => "Comédie Musicale",
            Genre::Dialogue => "Dialogue",
            Genre::Monologue => "Monologue",
            Genre::Undefined => "[indéfini]",
        }
    }

    pub fn is_defined(self) -> bool {
        self != Genre::Undefined
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum VerseForm {
    #[default]
    Prose,
    Verse,
}

impl VerseForm {
    pub fn label(self) -> &'static str {
        match self {
            VerseForm::Prose => "prose",
            VerseForm::Verse => "vers",
        }
    }
}

/// Author name split by the corpus' orthographic convention
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorName {
    pub forenames: Vec<String>,
    /// Fully upper-case tokens
    pub surnames: Vec<String>,
}

impl AuthorName {
    pub fn is_empty(&self) -> bool {
        self.forenames.is_empty() && self.surnames.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenreInfo {
    pub genre: Genre,
    pub verse_form: VerseForm,
    /// Act count stated in the header paragraphs
    pub declared_acts: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayMetadata {
    pub title: String,
    pub author: AuthorName,
    pub genre: Genre,
    pub verse_form: VerseForm,
    pub declared_acts: Option<u32>,
    pub dates: PlayDates,
}

/// Run every metadata recognizer over the normalized lines of one document
pub fn extract_metadata(lines: &[String]) -> PlayMetadata {
    let (title, author) = lines
        .iter()
        .find_map(|line| extract_title_and_author(line))
        .unwrap_or_default();
    let info = extract_genre_info(lines);
    let dates = extract_dates(lines);

    debug!(
        "Metadata: title={:?} genre={} verse={} declared_acts={:?}",
        title,
        info.genre.label(),
        info.verse_form.label(),
        info.declared_acts
    );

    PlayMetadata {
        title,
        author,
        genre: info.genre,
        verse_form: info.verse_form,
        declared_acts: info.declared_acts,
        dates,
    }
}

/// Parse `<title>Title (AUTHOR) | site</title>`
pub fn extract_title_and_author(line: &str) -> Option<(String, AuthorName)> {
    let caps = TITLE_LINE.captures(line)?;
    let mut text = caps[1].trim();
    if let Some((before_site, _)) = text.rsplit_once('|') {
        text = before_site.trim();
    }

    if let Some(stripped) = text.strip_suffix(')') {
        if let Some((title, author)) = stripped.rsplit_once(" (") {
            return Some((title.trim().to_string(), split_author(author)));
        }
    }
    Some((text.replace(')', "").trim().to_string(), AuthorName::default()))
}

fn split_author(author: &str) -> AuthorName {
    let mut name = AuthorName::default();
    for token in author.split(' ').filter(|t| !t.is_empty()) {
        if is_upper_token(token) {
            name.surnames.push(token.to_string());
        } else {
            name.forenames.push(token.to_string());
        }
    }
    name
}

/// At least one cased character and no lower-case one
fn is_upper_token(token: &str) -> bool {
    let mut cased = false;
    for c in token.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

fn accent_fold(text: &str) -> String {
    text.to_lowercase().replace('é', "e")
}

/// Genre, verse form and declared act count from the header paragraphs.
/// Scanning stops at the first blank paragraph; each field keeps its first detection.
pub fn extract_genre_info(lines: &[String]) -> GenreInfo {
    let mut info = GenreInfo::default();
    let mut genre_found = false;
    let mut verse_found = false;

    for line in lines {
        let Some(caps) = PARAGRAPH.captures(line) else {
            continue;
        };
        if &caps[1] == " " {
            break;
        }
        let content = accent_fold(&caps[1]);

        if !genre_found {
            if let Some((_, genre)) = GENRE_KEYWORDS.iter().find(|(kw, _)| content.contains(kw)) {
                info.genre = *genre;
                genre_found = true;
            }
        }
        if !verse_found {
            if content.contains("prose") {
                info.verse_form = VerseForm::Prose;
                verse_found = true;
            } else if content.contains("vers") {
                info.verse_form = VerseForm::Verse;
                verse_found = true;
            }
        }
        if info.declared_acts.is_none() {
            if let Some(count) = ACT_COUNT.captures(&content) {
                info.declared_acts = french_number(&count[1]);
            }
        }
        if genre_found && verse_found && info.declared_acts.is_some() {
            break;
        }
    }
    info
}

fn french_number(word: &str) -> Option<u32> {
    let value = match word {
        "un" => 1,
        "deux" => 2,
        "trois" => 3,
        "quatre" => 4,
        "cinq" => 5,
        "six" => 6,
        "sept" => 7,
        _ => return None,
    };
    Some(value)
}
