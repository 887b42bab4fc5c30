// WHY: act and scene headings are only reliably recognized when cross-checked against the
// play's own table of contents, which precedes the content it describes

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use super::model::DeclaredAct;
use super::normalization::clean_scene_name;

/// Name given to the synthetic act holding scenes declared without an act
pub const SINGLE_ACT_NAME: &str = "Acte unique";

const LIST_OPENERS: [&str; 2] = ["<div class='toc-list'>", "<div class=\"toc-list\">"];
const SKIPPED_LIST_LINES: [&str; 3] = ["<ul>", "</ul>", "</li>"];

static LEVEL1_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<li class="toc-level-1"><a href=[^>]*>(?:<strong>)?(?P<name>[^<]+)(?:</strong>)?</a>"#)
        .expect("Invalid level-1 entry regex")
});
static LEVEL2_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<li class="toc-level-2"><a href=.*><strong>(?P<scene>.+)</strong></a></li>|<li class="toc-level-1"><a href=.*>(?P<inline>.*Scène.*)</a>"#,
    )
    .expect("Invalid level-2 entry regex")
});
static SCENE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Jj]ournée|[Ss]cène|[Tt]ableau|[Ee]ntrée").expect("Invalid scene type regex")
});
pub(crate) static DEDICATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A *À|\A *AU|.* À M\. .*").expect("Invalid dedication header regex")
});
pub(crate) static PREFACE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Préface|PREFACE|PRÉFACE").expect("Invalid preface header regex"));

/// Result of the table-of-contents pre-scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneList {
    pub entries: Vec<DeclaredAct>,
    /// Header text of a dedication listed in the contents
    pub dedication_header: Option<String>,
    /// Header text of a preface listed in the contents
    pub preface_header: Option<String>,
}

impl SceneList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry lists its scenes, so the play is known to be divided in acts
    pub fn is_structured(&self) -> bool {
        self.entries.first().is_some_and(DeclaredAct::is_structured)
    }
}

/// Line-by-line recognizer of the declared table of contents
#[derive(Debug, Default)]
pub struct SceneListScanner {
    list: SceneList,
    in_list: bool,
    finished: bool,
}

impl SceneListScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner positioned inside an already opened list
    pub fn inside_list() -> Self {
        Self {
            in_list: true,
            ..Self::default()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn entries(&self) -> &[DeclaredAct] {
        &self.list.entries
    }

    /// Feed the next normalized line
    pub fn scan_line(&mut self, line: &str) {
        if self.finished {
            return;
        }
        if !self.in_list {
            if LIST_OPENERS.contains(&line.trim()) {
                debug!("Declared scene list opened");
                self.in_list = true;
            }
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || SKIPPED_LIST_LINES.contains(&trimmed) {
            return;
        }

        if let Some(caps) = LEVEL1_ENTRY.captures(line) {
            let raw_name = &caps["name"];
            if !raw_name.contains("Scène") {
                self.record_level1(raw_name);
                return;
            }
        }

        if let Some(caps) = LEVEL2_ENTRY.captures(line) {
            let raw_name = caps
                .name("scene")
                .or_else(|| caps.name("inline"))
                .map_or("", |m| m.as_str());
            self.record_level2(raw_name);
            return;
        }

        // any other line closes the list
        self.in_list = false;
        if self.list.entries.is_empty() {
            debug!("Declared scene list closed without entries");
        } else {
            debug!("Declared scene list closed with {} entries", self.list.entries.len());
            self.finished = true;
        }
    }

    fn record_level1(&mut self, raw_name: &str) {
        let name = clean_scene_name(raw_name);
        if DEDICATION_HEADER.is_match(&name) {
            debug!("Dedication header declared: {}", name);
            self.list.dedication_header = Some(name);
        } else if PREFACE_HEADER.is_match(&name) {
            debug!("Preface header declared: {}", name);
            self.list.preface_header = Some(name);
        } else if !name.is_empty() {
            self.list.entries.push(DeclaredAct::new(name, Vec::new()));
        }
    }

    fn record_level2(&mut self, raw_name: &str) {
        let name = clean_scene_name(raw_name);
        if DEDICATION_HEADER.is_match(&name) {
            self.list.dedication_header = Some(name);
        } else if PREFACE_HEADER.is_match(&name) {
            self.list.preface_header = Some(name);
        } else if name.is_empty() {
            // non-structural label
        } else if let Some(current) = self.list.entries.last_mut() {
            current.scenes.push(name);
        } else if SCENE_TYPE.is_match(&name) {
            self.list
                .entries
                .push(DeclaredAct::new(SINGLE_ACT_NAME, vec![name]));
        } else {
            debug!("Discarding unclassifiable contents entry: {}", name);
        }
    }

    /// Declared list, available once the list was closed with entries
    pub fn finish(self) -> SceneList {
        if self.finished {
            self.list
        } else {
            SceneList {
                entries: Vec::new(),
                ..self.list
            }
        }
    }
}
