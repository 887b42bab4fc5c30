// WHY: the corpus dialect is a fixed skeleton filled from the document tree; every text node
// passes through strip_tags, entity decoding and XML escaping so the output stays well-formed whatever the source

use quick_xml::escape::escape;
use tracing::warn;

use crate::extractor::dates::PlayDate;
use crate::extractor::metadata::{AuthorName, Genre, PlayMetadata};
use crate::extractor::model::{Act, FrontBlock, PlayBody, Replique, Scene};
use crate::extractor::normalization::{decode_entities, strip_tags};
use crate::extractor::resolver::speaker_identifier;
use crate::extractor::PlayDocument;

/// Closing line that marks a complete output file
pub const TEI_END: &str = "</TEI>\n";

const WIKIDATA_SCHEME: &str = "http://www.wikidata.org/entity/";

const EDITOR: &str = "Adrien Roumégous, dans le cadre d'un stage de M1 Informatique encadré par Aaron Boussidan et Philippe Gambette.";

const LEGAL_NOTICE_URL: &str = "http://théâtre-documentation.com/content/mentions-l%C3%A9gales#Mentions_legales";

/// Per-document serialization inputs not carried by the tree
#[derive(Debug, Clone)]
pub struct TeiOptions {
    /// Source page URL from the side-table
    pub source_url: String,
    /// Date recorded in revisionDesc (YYYY-MM-DD)
    pub change_date: String,
}

impl Default for TeiOptions {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            change_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

/// Wikidata class of a genre; `None` for genres without an identifier
pub fn wikidata_code(genre: Genre) -> Option<&'static str> {
    match genre {
        Genre::Tragedie => Some("Q80930"),
        Genre::Comedie => Some("Q40831"),
        Genre::TragiComedie => Some("Q192881"),
        Genre::Farce => Some("Q193979"),
        Genre::Vaudeville => Some("Q186286"),
        Genre::Proverbe => Some("Q2406762"),
        Genre::Pastorale | Genre::Dialogue | Genre::Undefined => None,
        Genre::ComedieMusicale | Genre::Monologue => {
            warn!("Unknown genre: {}", genre.label());
            None
        }
    }
}

/// Escaped, tag-free text content; source entities are decoded first so they are escaped once
fn text(raw: &str) -> String {
    let untagged = strip_tags(raw);
    escape(decode_entities(untagged.trim()).trim()).into_owned()
}

fn attr(raw: &str) -> String {
    escape(&decode_entities(raw)).into_owned()
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn date_attributes(date: &PlayDate) -> String {
    match date {
        PlayDate::When(when) => format!(r#"when="{}""#, attr(when)),
        PlayDate::Range { not_before, not_after } => {
            format!(r#"notBefore="{}" notAfter="{}""#, attr(not_before), attr(not_after))
        }
    }
}

/// Indented element writer over a `String`
struct TeiWriter {
    out: String,
    depth: usize,
    line_number: usize,
}

impl TeiWriter {
    fn new() -> Self {
        Self {
            out: String::with_capacity(16 * 1024),
            depth: 0,
            line_number: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn raw_line(&mut self, line: &str) {
        self.indent();
        self.out.push_str(line);
        self.out.push('\n');
    }

    /// `start` is the tag name followed by any attributes
    fn open(&mut self, start: &str) {
        self.raw_line(&format!("<{start}>"));
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.raw_line(&format!("</{name}>"));
    }

    /// Element with already-escaped content
    fn leaf(&mut self, start: &str, content: &str) {
        let name = start.split(' ').next().unwrap_or(start);
        self.raw_line(&format!("<{start}>{content}</{name}>"));
    }

    fn empty(&mut self, start: &str) {
        self.raw_line(&format!("<{start}/>"));
    }

    fn header(&mut self, document: &PlayDocument, options: &TeiOptions) {
        let metadata = &document.metadata;
        self.open("teiHeader");
        self.open("fileDesc");

        self.open("titleStmt");
        self.leaf(r#"title type="main""#, &text(&metadata.title));
        if metadata.genre.is_defined() {
            self.leaf(r#"title type="sub""#, &text(metadata.genre.label()));
        }
        if !metadata.author.is_empty() {
            self.author(&metadata.author);
        }
        self.leaf("editor", &text(EDITOR));
        self.close("titleStmt");

        self.open("publicationStmt");
        self.leaf(r#"publisher xml:id="dracor""#, "DraCor");
        self.leaf(r#"idno type="URL""#, "https://dracor.org");
        self.open("availability");
        self.open("licence");
        self.leaf("ab", "CC BY-NC-SA 4.0");
        self.leaf(r#"ref target="https://creativecommons.org/licenses/by-nc-sa/4.0/""#, "Licence");
        self.close("licence");
        self.close("availability");
        self.close("publicationStmt");

        self.source_desc(metadata, options);
        self.close("fileDesc");

        self.open("profileDesc");
        self.open("particDesc");
        self.open("listPerson");
        for member in &document.cast {
            // sex is not stated on the source pages
            self.open(&format!(r#"person xml:id="{}" sex="UNKNOWN""#, attr(&member.id)));
            self.leaf("persName", &text(&member.full_name));
            self.close("person");
        }
        self.close("listPerson");
        self.close("particDesc");
        self.open("textClass");
        self.open(r#"keywords scheme="http://theatre-documentation.com""#);
        self.leaf("term", &text(metadata.genre.label()));
        self.leaf("term", metadata.verse_form.label());
        self.close("keywords");
        if let Some(code) = wikidata_code(metadata.genre) {
            self.leaf(&format!(r#"classCode scheme="{WIKIDATA_SCHEME}""#), code);
        }
        self.close("textClass");
        self.close("profileDesc");

        self.open("revisionDesc");
        self.open("listChange");
        self.leaf(
            &format!(r#"change when="{}""#, attr(&options.change_date)),
            "file conversion from source",
        );
        self.close("listChange");
        self.close("revisionDesc");
        self.close("teiHeader");
    }

    fn author(&mut self, author: &AuthorName) {
        self.open("author");
        self.open("persName");
        for name in &author.forenames {
            match name.as_str() {
                "de" | "d'" => self.leaf("linkname", &text(name)),
                "Abbé" => self.leaf("rolename", &text(name)),
                _ => self.leaf("forename", &text(name)),
            }
        }
        for name in &author.surnames {
            match name.as_str() {
                "DE" | "D'" => self.leaf("linkname", &text(&name.to_lowercase())),
                _ => self.leaf("surname", &text(&capitalize(name))),
            }
        }
        self.close("persName");
        self.close("author");
    }

    fn source_desc(&mut self, metadata: &PlayMetadata, options: &TeiOptions) {
        let dates = &metadata.dates;
        self.open("sourceDesc");
        self.open(r#"bibl type="digitalSource""#);
        self.leaf("name", "Théâtre Documentation");
        self.leaf(r#"idno type="URL""#, &text(&options.source_url));
        self.open("availability");
        self.open("licence");
        self.leaf(
            "ab",
            "loi française n° 92-597 du 1er juillet 1992 et loi n°78-753 du 17 juillet 1978",
        );
        self.leaf(&format!(r#"ref target="{}""#, attr(LEGAL_NOTICE_URL)), "Mentions légales");
        self.close("licence");
        self.close("availability");

        self.open(r#"bibl type="originalSource""#);
        if let Some(date) = &dates.written {
            self.empty(&format!(r#"date type="written" {}"#, date_attributes(date)));
        }
        if let Some(date) = &dates.print {
            self.empty(&format!(r#"date type="print" {}"#, date_attributes(date)));
        }
        if let Some(date) = &dates.premiere {
            let line = dates.premiere_line.as_deref().unwrap_or_default();
            self.leaf(&format!(r#"date type="premiere" {}"#, date_attributes(date)), &text(line));
        }
        self.close("bibl");
        self.close("bibl");
        self.close("sourceDesc");
    }

    fn front(&mut self, document: &PlayDocument) {
        let metadata = &document.metadata;
        self.open("front");
        self.open("docTitle");
        self.leaf(r#"titlePart type="main""#, &text(&metadata.title.to_uppercase()));
        if metadata.genre.is_defined() {
            self.leaf(r#"titlePart type="sub""#, &text(&metadata.genre.label().to_uppercase()));
        }
        self.close("docTitle");

        if let Some(date) = &metadata.dates.print {
            let line = metadata.dates.print_line.as_deref().unwrap_or_default();
            self.leaf(&format!("docDate {}", date_attributes(date)), &text(line));
        }
        if let Some(line) = &metadata.dates.premiere_line {
            self.open("performance");
            self.leaf(r#"ab type="premiere""#, &text(line));
            self.close("performance");
        }

        if !document.cast.is_empty() {
            self.open("castList");
            self.leaf("head", "PERSONNAGES");
            for member in &document.cast {
                let role = text(&member.role);
                let name = text(&member.full_name);
                let corresp = attr(&member.id);
                self.raw_line(&format!(r##"<castItem><role corresp="#{corresp}">{name}</role>{role}</castItem>"##));
            }
            self.close("castList");
        }

        if let Some(block) = &document.dedication {
            self.front_block("dedication", block);
        }
        if let Some(block) = &document.preface {
            self.front_block("preface", block);
        }
        self.close("front");
    }

    fn front_block(&mut self, kind: &str, block: &FrontBlock) {
        self.open(&format!(r#"div type="{kind}""#));
        self.leaf("head", &text(&block.header));
        for paragraph in &block.paragraphs {
            self.leaf("p", &text(paragraph));
        }
        self.close("div");
    }

    fn body(&mut self, body: &PlayBody) {
        self.open("body");
        match body {
            PlayBody::Empty => {}
            PlayBody::Acts(acts) => {
                for act in acts {
                    self.act(act);
                }
            }
            PlayBody::Scenes(scenes) => {
                for (index, scene) in scenes.iter().enumerate() {
                    self.scene(&format!("s{}", index + 1), scene);
                }
            }
        }
        self.leaf("trailer", "FIN");
        self.close("body");
    }

    fn act(&mut self, act: &Act) {
        self.open(&format!(r#"div type="act" xml:id="a{}""#, act.ordinal));
        self.leaf("head", &text(&act.name));
        if let Some(stage) = &act.stage_indication {
            self.leaf("stage", &text(stage));
        }
        for (index, scene) in act.scenes.iter().enumerate() {
            self.scene(&format!("a{}-s{}", act.ordinal, index + 1), scene);
        }
        self.close("div");
    }

    fn scene(&mut self, id: &str, scene: &Scene) {
        self.open(&format!(r#"div type="scene" xml:id="{id}""#));
        self.leaf("head", &text(&scene.name));
        if let Some(speakers) = &scene.speakers_text {
            self.leaf(r#"stage type="characters""#, &text(speakers));
        }

        let mut in_speech = false;
        for replique in &scene.repliques {
            match replique {
                Replique::Speaker { text: raw, character_id } => {
                    if in_speech {
                        self.close("sp");
                    }
                    let who = character_id.clone().unwrap_or_else(|| speaker_identifier(raw));
                    if who.is_empty() {
                        self.open("sp");
                    } else {
                        self.open(&format!(r##"sp who="#{}""##, attr(&who)));
                    }
                    self.leaf("speaker", &text(raw));
                    in_speech = true;
                }
                Replique::Dialogue { text: line } => {
                    self.line_number += 1;
                    let start = format!(r#"l n="{}""#, self.line_number);
                    self.leaf(&start, &text(line));
                }
                Replique::Stage { text: stage } => self.leaf("stage", &text(stage)),
            }
        }
        if in_speech {
            self.close("sp");
        }
        self.close("div");
    }
}

/// Render a document as a complete TEI file, ending with [`TEI_END`]
pub fn render_tei(document: &PlayDocument, options: &TeiOptions) -> String {
    let mut writer = TeiWriter::new();
    writer.raw_line(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    writer.open(r#"TEI xmlns="http://www.tei-c.org/ns/1.0" xml:lang="fre""#);
    writer.header(document, options);
    writer.open("text");
    writer.front(document);
    writer.body(&document.body);
    writer.close("text");
    writer.close("TEI");
    writer.out
}
