// WHY: a single forward pass assembles acts, scenes and repliques; each line is classified
// by heading shapes compiled into one multi-pattern automaton, then by paragraph shapes

use anyhow::Result;
use regex::Regex;
use regex_automata::meta::Regex as MultiRegex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::front_matter::{BlockCollector, H1_HEADING};
use super::model::{Act, FrontBlock, PlayBody, Replique, Scene};
use super::normalization::{clean_scene_name, strip_tags};
use super::scene_list::SceneList;
use crate::errors::StructureError;

/// Canonical act-heading words
pub const ACT_WORDS: [&str; 9] = [
    "ACTE", "JOURNÉE", "TABLEAU", "PARTIE", "PROLOGUE", "Prologue", "ÉPOQUE", "Partie", "Tableau",
];

/// Scene heading shapes, leftmost-first in declaration order:
/// `<h2 ...><strong>LABEL</strong></h2>`, `<h2 ...>Scène ...</h2>`, `<h1 ...>... Scène ...</h1>`
pub struct HeadingPatterns {
    scene: MultiRegex,
}

impl HeadingPatterns {
    pub fn new() -> Result<Self> {
        let any = ".*";
        let label = "(.*)";
        let strong_h2 = format!("{any}<h2 {any}<strong>{label}</strong>{any}</h2>");
        let plain_h2 = format!("{any}<h2{any}>(Scène{any})</h2>");
        let scene_h1 = format!("<h1{any}>({any}Scène{any})</h1>");

        let scene = MultiRegex::new_many(&[strong_h2, plain_h2, scene_h1])?;
        Ok(Self { scene })
    }

    /// Label of a scene heading
    pub fn match_scene<'h>(&self, line: &'h str) -> Option<&'h str> {
        let mut caps = self.scene.create_captures();
        self.scene.captures(line, &mut caps);
        caps.pattern()?;
        let span = caps.get_group(1)?;
        Some(&line[span.start..span.end])
    }
}

static HEADINGS: LazyLock<HeadingPatterns> =
    LazyLock::new(|| HeadingPatterns::new().expect("Invalid scene heading patterns"));

static CENTERED_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p align=.*center[^>]*>(.*)</p>").expect("Invalid centered paragraph regex"));
static ANY_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p[^>]*>(.*)</p>").expect("Invalid paragraph regex"));
static ACT_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ACTE (.*)").expect("Invalid act number regex"));
static SCENE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Scène (.*)").expect("Invalid scene number regex"));

/// Label of an act or scene: the text after the keyword, else a slug of the name
fn division_label(name: &str, keyword: &Regex) -> String {
    match keyword.captures(name) {
        Some(caps) => caps[1].to_string(),
        None => name.to_lowercase().replace(' ', "-"),
    }
}

/// Scene heading label in `line`, if any
pub fn scene_heading(line: &str) -> Option<&str> {
    HEADINGS.match_scene(line)
}

/// Where the pre-scan located the cast list
#[derive(Debug, Clone, Copy, Default)]
pub struct CastBounds {
    pub has_cast: bool,
    /// First line from which body text may be read
    pub end_line: Option<usize>,
}

/// What the scan produced besides the tree
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub body: PlayBody,
    pub act_headings: usize,
    pub dedication: Option<FrontBlock>,
    pub preface: Option<FrontBlock>,
}

/// Forward state machine over the normalized lines of one document
pub struct StructureScanner<'a> {
    scene_list: &'a SceneList,
    act_names: Vec<String>,
    cast: CastBounds,
    cast_finished: bool,
    body: PlayBody,
    act_headings: usize,
    scenes_in_act: usize,
    speaker_active: bool,
    dedication: Option<BlockCollector>,
    preface: Option<BlockCollector>,
}

impl<'a> StructureScanner<'a> {
    pub fn new(scene_list: &'a SceneList, cast: CastBounds) -> Self {
        let act_names = scene_list
            .entries
            .iter()
            .map(|entry| clean_scene_name(&entry.name.replace('*', "")))
            .filter(|name| !name.is_empty())
            .collect();

        Self {
            scene_list,
            act_names,
            cast,
            cast_finished: false,
            body: PlayBody::Empty,
            act_headings: 0,
            scenes_in_act: 0,
            speaker_active: false,
            dedication: scene_list.dedication_header.as_deref().map(BlockCollector::new),
            preface: scene_list.preface_header.as_deref().map(BlockCollector::new),
        }
    }

    /// Classify line `index` (0-based)
    pub fn scan_line(&mut self, index: usize, line: &str) -> Result<(), StructureError> {
        if self.cast.end_line == Some(index) {
            self.cast_finished = true;
        }

        if self.dedication.is_some() || self.preface.is_some() {
            let is_division_heading = H1_HEADING.is_match(line) || scene_heading(line).is_some();
            for block in [&mut self.dedication, &mut self.preface].into_iter().flatten() {
                block.feed(line, is_division_heading);
            }
            let pending = [&self.dedication, &self.preface]
                .into_iter()
                .flatten()
                .any(|block| !block.is_finished());
            if pending {
                return Ok(());
            }
        }

        self.scan_act_heading(line);
        self.scan_scene_heading(index, line)?;

        let text_allowed = !self.body.is_empty() && (self.cast_finished || !self.cast.has_cast);
        if text_allowed {
            let consumed = self.scan_centered(line);
            self.speaker_active = self
                .body
                .current_scene()
                .is_some_and(|scene| !scene.repliques.is_empty() && (self.speaker_active || scene.last_is_speaker()));
            if self.speaker_active && !consumed {
                self.scan_text(line);
            }
        }
        Ok(())
    }

    fn is_act_heading(&self, heading: &str) -> bool {
        if ACT_WORDS.iter().any(|word| heading.contains(word)) {
            return true;
        }
        !self.body.is_act_less() && self.act_names.iter().any(|name| heading.contains(name.as_str()))
    }

    fn scan_act_heading(&mut self, line: &str) {
        let Some(caps) = H1_HEADING.captures(line) else {
            return;
        };
        let heading = &caps[1];
        if !self.is_act_heading(heading) {
            return;
        }

        let name = heading.replace("<strong>", "").replace("</strong>", "");
        let label = division_label(&name, &ACT_NUMBER);
        self.scenes_in_act = 0;

        match &mut self.body {
            PlayBody::Scenes(scenes) => {
                debug!("Act heading '{}' kept as a scene of an act-less play", name);
                scenes.push(Scene::new(label, name));
            }
            PlayBody::Acts(acts) => {
                self.act_headings += 1;
                acts.push(Act {
                    ordinal: acts.len() + 1,
                    label,
                    name,
                    ..Default::default()
                });
            }
            PlayBody::Empty => {
                self.act_headings += 1;
                self.body = PlayBody::Acts(vec![Act {
                    ordinal: 1,
                    label,
                    name,
                    ..Default::default()
                }]);
            }
        }
    }

    fn scan_scene_heading(&mut self, index: usize, line: &str) -> Result<(), StructureError> {
        let Some(raw_name) = scene_heading(line) else {
            return Ok(());
        };
        let name = strip_tags(raw_name).trim().to_string();
        let scene = Scene::new(division_label(&name, &SCENE_NUMBER), name);
        self.scenes_in_act += 1;

        match &mut self.body {
            PlayBody::Acts(acts) => {
                // acts is never empty once created
                if let Some(act) = acts.last_mut() {
                    act.scenes.push(scene);
                }
            }
            PlayBody::Scenes(scenes) => scenes.push(scene),
            PlayBody::Empty => {
                if self.scene_list.is_structured() {
                    return Err(StructureError::SceneOutsideAct {
                        scene: scene.name,
                        line: index + 1,
                    });
                }
                debug!("Scene '{}' before any act: play has no acts", scene.name);
                self.body = PlayBody::Scenes(vec![scene]);
            }
        }
        Ok(())
    }

    /// Centered paragraph: speaker, act stage indication, or disambiguated entry.
    /// Returns whether the line was consumed.
    fn scan_centered(&mut self, line: &str) -> bool {
        let Some(caps) = CENTERED_PARAGRAPH.captures(line) else {
            return false;
        };
        let text = &caps[1];
        if text.trim().is_empty() || text.contains("Personnages") {
            return false;
        }

        if let PlayBody::Acts(acts) = &mut self.body {
            if let Some(act) = acts.last_mut().filter(|act| act.scenes.is_empty()) {
                act.stage_indication = Some(strip_tags(text).trim().to_string());
                return true;
            }
        }

        let Some(scene) = self.body.current_scene_mut() else {
            return false;
        };
        if !scene.last_is_speaker() {
            scene.repliques.push(Replique::speaker(text));
        } else if scene.repliques.len() == 1 && scene.speakers_text.is_none() {
            // leading "characters present" line
            if let Some(previous) = scene.repliques.pop() {
                scene.speakers_text = Some(previous.text().to_string());
            }
            scene.repliques.push(Replique::speaker(text));
        } else if text.contains("<em>") {
            scene.repliques.push(Replique::stage(strip_tags(text).trim()));
        } else {
            warn!("Two consecutive character names? '{}' kept as dialogue in scene '{}'", text, scene.name);
            scene.repliques.push(Replique::dialogue(strip_tags(text).trim()));
        }
        true
    }

    fn scan_text(&mut self, line: &str) {
        let Some(caps) = ANY_PARAGRAPH.captures(line) else {
            return;
        };
        let raw = caps[1].replace('\u{a0}', " ");
        if raw.trim().is_empty() {
            return;
        }
        let text = strip_tags(&raw).trim().to_string();
        let entry = if raw.trim_start().starts_with("<em>") {
            Replique::stage(text)
        } else {
            Replique::dialogue(text)
        };
        if let Some(scene) = self.body.current_scene_mut() {
            scene.repliques.push(entry);
        }
    }

    /// Close the scan; a declared dedication that never appeared is an error
    pub fn finish(self) -> Result<ScanOutcome, StructureError> {
        let dedication = match self.dedication {
            Some(block) if !block.is_finished() => {
                return Err(StructureError::UncollectedDedication {
                    header: block.header().to_string(),
                });
            }
            Some(block) => block.finish(),
            None => None,
        };
        let preface = match self.preface {
            Some(block) if !block.is_finished() => {
                warn!("Preface '{}' declared but not collected", block.header());
                None
            }
            Some(block) => block.finish(),
            None => None,
        };

        Ok(ScanOutcome {
            body: self.body,
            act_headings: self.act_headings,
            dedication,
            preface,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::model::DeclaredAct;

    fn run(scene_list: &SceneList, lines: &[&str]) -> Result<ScanOutcome, StructureError> {
        let mut scanner = StructureScanner::new(scene_list, CastBounds::default());
        for (index, line) in lines.iter().enumerate() {
            scanner.scan_line(index, line)?;
        }
        scanner.finish()
    }

    #[test]
    fn test_scene_heading_labels() {
        let patterns = HeadingPatterns::new().unwrap();
        assert_eq!(
            patterns.match_scene(r#"<h2 class="rtecenter"><strong>Scène II</strong></h2>"#),
            Some("Scène II")
        );
        assert_eq!(
            patterns.match_scene(r#"<h2 class="c">Scène III</h2>"#),
            Some("Scène III")
        );
        assert_eq!(
            patterns.match_scene(r#"<h1 class="c">ACTE I, Scène 1</h1>"#),
            Some("ACTE I, Scène 1")
        );
        assert_eq!(patterns.match_scene("<h1>ACTE I</h1>"), None);
        assert_eq!(scene_heading(r#"<h2 class="c">Scène III</h2>"#), Some("Scène III"));
    }

    #[test]
    fn test_acts_scenes_and_repliques() {
        let outcome = run(
            &SceneList::default(),
            &[
                "<h1><strong>ACTE I</strong></h1>",
                r#"<p align="center" style="text-align:center">Un salon.</p>"#,
                r#"<h2 class="c"><strong>Scène première</strong></h2>"#,
                r#"<p align="center" style="text-align:center">VALÈRE, ÉLISE.</p>"#,
                r#"<p align="center" style="text-align:center">VALÈRE.</p>"#,
                "<p>Hé quoi ?</p>",
                "<p><em>Il sort.</em></p>",
                r#"<p align="center" style="text-align:center">ÉLISE.</p>"#,
                "<p> </p>",
                "<p>Non.</p>",
                "<h1><strong>ACTE II</strong></h1>",
            ],
        )
        .unwrap();

        assert_eq!(outcome.act_headings, 2);
        let acts = outcome.body.acts();
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].label, "I");
        assert_eq!(acts[0].stage_indication.as_deref(), Some("Un salon."));
        let scene = &acts[0].scenes[0];
        assert_eq!(scene.number, "première");
        assert_eq!(scene.speakers_text.as_deref(), Some("VALÈRE, ÉLISE."));
        assert_eq!(
            scene.repliques,
            vec![
                Replique::speaker("VALÈRE."),
                Replique::dialogue("Hé quoi ?"),
                Replique::stage("Il sort."),
                Replique::speaker("ÉLISE."),
                Replique::dialogue("Non."),
            ]
        );
    }

    #[test]
    fn test_consecutive_speakers_disambiguation() {
        let outcome = run(
            &SceneList::default(),
            &[
                "<h1>ACTE I</h1>",
                r#"<h2 class="c"><strong>Scène 1</strong></h2>"#,
                r#"<p align="center">ORGON.</p>"#,
                "<p>Et Tartuffe ?</p>",
                r#"<p align="center">DORINE.</p>"#,
                r#"<p align="center"><em>à part</em></p>"#,
                r#"<p align="center">ORGON.</p>"#,
            ],
        )
        .unwrap();
        let scene = &outcome.body.acts()[0].scenes[0];
        assert_eq!(scene.speakers_text, None);
        assert_eq!(
            scene.repliques,
            vec![
                Replique::speaker("ORGON."),
                Replique::dialogue("Et Tartuffe ?"),
                Replique::speaker("DORINE."),
                Replique::stage("à part"),
                Replique::speaker("ORGON."),
            ]
        );
    }

    #[test]
    fn test_ambiguous_speaker_kept_as_dialogue() {
        let outcome = run(
            &SceneList::default(),
            &[
                "<h1>ACTE I</h1>",
                r#"<h2 class="c"><strong>Scène 1</strong></h2>"#,
                r#"<p align="center">ORGON.</p>"#,
                "<p>Et Tartuffe ?</p>",
                r#"<p align="center">DORINE.</p>"#,
                r#"<p align="center">ORGON.</p>"#,
            ],
        )
        .unwrap();
        let repliques = &outcome.body.acts()[0].scenes[0].repliques;
        assert_eq!(repliques.last(), Some(&Replique::dialogue("ORGON.")));
    }

    #[test]
    fn test_scenes_without_acts() {
        let outcome = run(
            &SceneList::default(),
            &[
                r#"<h2 class="c"><strong>Scène 1</strong></h2>"#,
                r#"<p align="center">ARLEQUIN.</p>"#,
                "<p>Bonjour.</p>",
                "<h1>ACTE FINAL</h1>",
            ],
        )
        .unwrap();
        assert!(outcome.body.is_act_less());
        assert_eq!(outcome.act_headings, 0);
        assert_eq!(outcome.body.scenes().count(), 2);
    }

    #[test]
    fn test_scene_before_declared_act_is_fatal() {
        let scene_list = SceneList {
            entries: vec![DeclaredAct::new("ACTE I", vec!["Scène 1".into()])],
            ..Default::default()
        };
        let result = run(&scene_list, &[r#"<h2 class="c"><strong>Scène 1</strong></h2>"#]);
        assert!(matches!(result, Err(StructureError::SceneOutsideAct { line: 1, .. })));
    }

    #[test]
    fn test_declared_act_name_is_recognized() {
        let scene_list = SceneList {
            entries: vec![DeclaredAct::new("LE BAL", vec![])],
            ..Default::default()
        };
        let outcome = run(&scene_list, &["<h1>LE BAL</h1>", "<h1>INTERMÈDE</h1>"]).unwrap();
        assert_eq!(outcome.act_headings, 1);
        assert_eq!(outcome.body.acts()[0].label, "le-bal");
    }

    #[test]
    fn test_text_waits_for_cast_list_end() {
        let scene_list = SceneList::default();
        let cast = CastBounds {
            has_cast: true,
            end_line: Some(4),
        };
        let mut scanner = StructureScanner::new(&scene_list, cast);
        let lines = [
            "<h1>ACTE I</h1>",
            r#"<h2 class="c"><strong>Scène 1</strong></h2>"#,
            r#"<p align="center">ORGON.</p>"#,
            "<p>Ignoré.</p>",
            r#"<p align="center">ORGON.</p>"#,
            "<p>Lu.</p>",
        ];
        for (index, line) in lines.iter().enumerate() {
            scanner.scan_line(index, line).unwrap();
        }
        let outcome = scanner.finish().unwrap();
        assert_eq!(
            outcome.body.acts()[0].scenes[0].repliques,
            vec![Replique::speaker("ORGON."), Replique::dialogue("Lu.")]
        );
    }

    #[test]
    fn test_dedication_suspends_scan() {
        let scene_list = SceneList {
            dedication_header: Some("AU ROI".into()),
            ..Default::default()
        };
        let outcome = run(
            &scene_list,
            &[
                "<h1>AU ROI</h1>",
                "<p>Sire,</p>",
                "<h1>ACTE I</h1>",
                r#"<h2 class="c"><strong>Scène 1</strong></h2>"#,
            ],
        )
        .unwrap();
        assert_eq!(outcome.dedication.unwrap().paragraphs, vec!["Sire,"]);
        assert_eq!(outcome.act_headings, 1);
        assert_eq!(outcome.body.acts()[0].scenes.len(), 1);
    }

    #[test]
    fn test_missing_dedication_is_fatal() {
        let scene_list = SceneList {
            dedication_header: Some("AU ROI".into()),
            ..Default::default()
        };
        let result = run(&scene_list, &["<h1>ACTE I</h1>"]);
        assert!(matches!(result, Err(StructureError::UncollectedDedication { .. })));
    }
}
