// WHY: cast list, dedication and preface are bounded blocks recognized by header and
// footer markers; each collector is fed one line at a time by the pass that owns it

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::model::{CastMember, FrontBlock};
use super::normalization::{clean_scene_name, normalize_character_name, strip_tags};

static CAST_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<strong><em>Personnages</em></strong>|<p align="center" style="text-align:center"><b><i>(<span style="letter-spacing:-\.3pt">)?Personnages(</span>)?</i></b></p>"#,
    )
    .expect("Invalid cast header regex")
});
static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h[12]").expect("Invalid section heading regex"));
static PLAIN_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p>(.*)</p>").expect("Invalid paragraph regex"));
static ANY_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p[^>]*>(.*)</p>").expect("Invalid paragraph regex"));
static NAME_AND_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^,]+)(,.*)").expect("Invalid cast entry regex"));
pub(crate) static H1_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*<h1[^>]*>(.*)</h1>").expect("Invalid h1 regex"));

/// Character names this short are formatting debris
const MIN_NAME_CHARS: usize = 3;

/// Collects the declared cast list during the pre-scan
#[derive(Debug, Default)]
pub struct CastCollector {
    members: Vec<CastMember>,
    active: bool,
    end_line: Option<usize>,
}

impl CastCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed line `index` of the document
    pub fn feed(&mut self, index: usize, line: &str) {
        let before = self.members.len();

        if CAST_HEADER.is_match(line) {
            if !self.active {
                debug!("Cast list opened at line {}", index + 1);
            }
            self.active = true;
        } else if self.active {
            self.collect(line);
        }

        if before != 0 && self.members.len() == before && self.end_line.is_none() {
            self.end_line = Some(index);
        }
    }

    fn collect(&mut self, line: &str) {
        if SECTION_HEADING.is_match(line) {
            self.active = false;
            return;
        }
        let Some(caps) = PLAIN_PARAGRAPH.captures(line) else {
            return;
        };
        let entry = &caps[1];
        if entry.chars().count() == 1 {
            if !self.members.is_empty() {
                self.active = false;
            }
            return;
        }

        let (name, role) = match NAME_AND_ROLE.captures(entry) {
            Some(parts) => (strip_tags(&parts[1]), strip_tags(&parts[2])),
            None => (strip_tags(entry), String::new()),
        };
        let name = name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return;
        }
        let role = role.trim_start_matches(',').trim().to_string();
        self.members.push(CastMember {
            id: normalize_character_name(name),
            full_name: name.to_string(),
            role,
        });
    }

    pub fn members(&self) -> &[CastMember] {
        &self.members
    }

    /// Line index from which body text may be read
    pub fn end_line(&self) -> Option<usize> {
        self.end_line
    }

    pub fn finish(self) -> (Vec<CastMember>, Option<usize>) {
        (self.members, self.end_line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Pending,
    Inside,
    Finished,
}

/// Collects a dedication or preface announced by the declared scene list
#[derive(Debug)]
pub struct BlockCollector {
    block: FrontBlock,
    state: BlockState,
}

impl BlockCollector {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            block: FrontBlock {
                header: header.into(),
                paragraphs: Vec::new(),
            },
            state: BlockState::Pending,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == BlockState::Finished
    }

    pub fn header(&self) -> &str {
        &self.block.header
    }

    /// Feed the next line; `is_division_heading` tells whether it opens an act or scene
    pub fn feed(&mut self, line: &str, is_division_heading: bool) {
        match self.state {
            BlockState::Finished => {}
            BlockState::Inside => {
                if is_division_heading {
                    debug!("Block '{}' closed", self.block.header);
                    self.state = BlockState::Finished;
                } else if let Some(caps) = ANY_PARAGRAPH.captures(line) {
                    let text = caps[1].replace('\u{a0}', " ");
                    if text != " " {
                        self.block.paragraphs.push(text);
                    }
                }
            }
            BlockState::Pending => {
                if let Some(caps) = H1_HEADING.captures(line) {
                    if clean_scene_name(&caps[1]) == self.block.header {
                        debug!("Block '{}' opened", self.block.header);
                        self.state = BlockState::Inside;
                    }
                }
            }
        }
    }

    /// Collected block, if it was closed
    pub fn finish(self) -> Option<FrontBlock> {
        self.is_finished().then_some(self.block)
    }
}
