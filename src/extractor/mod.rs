// WHY: one document flows through normalize -> metadata -> pre-scan -> structure -> resolution;
// every stage receives the previous stage's output explicitly, nothing is shared across documents

pub mod dates;
pub mod front_matter;
pub mod metadata;
pub mod model;
pub mod normalization;
pub mod resolver;
pub mod scene_list;
pub mod structure;

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::StructureError;
use front_matter::CastCollector;
use metadata::{extract_metadata, PlayMetadata};
use model::{CastMember, FrontBlock, PlayBody};
use normalization::normalize_line;
use resolver::{resolve_characters, CharacterRegistry, ConversionConfig};
use scene_list::{SceneList, SceneListScanner};
use structure::{CastBounds, StructureScanner};

/// Per-document counters feeding the run summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    /// Act nodes in the final tree
    pub acts_found: usize,
    /// Act headings recognized during the structural pass
    pub act_headings: usize,
    pub scenes_found: usize,
    pub declared_acts: Option<u32>,
    pub cast_found: bool,
    pub cast_members: usize,
    pub scene_list_found: bool,
    /// Speaker identifiers that needed more than an exact match
    pub undeclared_ids: usize,
    pub unresolved_ids: Vec<String>,
}

impl DocumentReport {
    pub fn has_unguessed(&self) -> bool {
        !self.unresolved_ids.is_empty()
    }

    pub fn act_count_matches(&self) -> bool {
        self.declared_acts
            .is_some_and(|declared| usize::try_from(declared).is_ok_and(|d| d == self.acts_found))
    }
}

/// A fully extracted play, ready for serialization
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayDocument {
    pub metadata: PlayMetadata,
    pub cast: Vec<CastMember>,
    pub scene_list: SceneList,
    pub dedication: Option<FrontBlock>,
    pub preface: Option<FrontBlock>,
    pub body: PlayBody,
    pub report: DocumentReport,
}

/// Output of the first pass over a document
#[derive(Debug, Default)]
pub struct PreScan {
    pub scene_list: SceneList,
    pub cast: Vec<CastMember>,
    pub cast_end_line: Option<usize>,
}

/// First pass: declared table of contents and cast list
pub fn pre_scan(lines: &[String]) -> PreScan {
    let mut toc = SceneListScanner::new();
    let mut cast = CastCollector::new();

    for (index, line) in lines.iter().enumerate() {
        if !toc.is_finished() {
            toc.scan_line(line);
        }
        cast.feed(index, line);
    }

    let (cast, cast_end_line) = cast.finish();
    PreScan {
        scene_list: toc.finish(),
        cast,
        cast_end_line,
    }
}

/// Convert the raw lines of one HTML play into its document tree and metadata
pub fn extract_play(raw_lines: &[String], config: &ConversionConfig) -> Result<PlayDocument, StructureError> {
    let lines: Vec<String> = raw_lines.iter().map(|line| normalize_line(line)).collect();

    let metadata = extract_metadata(&lines);
    let PreScan {
        scene_list,
        cast,
        cast_end_line,
    } = pre_scan(&lines);
    debug!(
        "Pre-scan: {} declared acts, {} cast members, cast ends at {:?}",
        scene_list.entries.len(),
        cast.len(),
        cast_end_line
    );

    let bounds = CastBounds {
        has_cast: !cast.is_empty(),
        end_line: cast_end_line,
    };
    let mut scanner = StructureScanner::new(&scene_list, bounds);
    for (index, line) in lines.iter().enumerate() {
        scanner.scan_line(index, line)?;
    }
    let outcome = scanner.finish()?;

    let mut body = outcome.body;
    let mut registry = CharacterRegistry::new(cast);
    resolve_characters(&mut body, &mut registry, config);

    let report = DocumentReport {
        acts_found: body.acts().len(),
        act_headings: outcome.act_headings,
        scenes_found: body.scenes().count(),
        declared_acts: metadata.declared_acts,
        cast_found: !registry.is_empty(),
        cast_members: registry.members().len(),
        scene_list_found: !scene_list.is_empty(),
        undeclared_ids: registry.undeclared_count(),
        unresolved_ids: registry.unresolved().iter().cloned().collect(),
    };
    info!(
        "Extracted '{}': {} acts, {} scenes, {} cast members",
        metadata.title,
        report.acts_found,
        report.scenes_found,
        registry.members().len()
    );

    Ok(PlayDocument {
        metadata,
        cast: registry.members().to_vec(),
        scene_list,
        dedication: outcome.dedication,
        preface: outcome.preface,
        body,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::Replique;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_pre_scan_stops_toc_after_close() {
        let prescan = pre_scan(&lines(&[
            "<div class='toc-list'>",
            "<ul>",
            r#"<li class="toc-level-1"><a href="x"><strong>ACTE I</strong></a></li>"#,
            "</ul>",
            "</div>",
            "<p><strong><em>Personnages</em></strong></p>",
            "<p>HARPAGON, père de Cléante.</p>",
            "<p> </p>",
        ]));
        assert_eq!(prescan.scene_list.entries.len(), 1);
        assert_eq!(prescan.scene_list.entries[0].name, "ACTE I");
        assert_eq!(prescan.cast.len(), 1);
        assert_eq!(prescan.cast_end_line, Some(7));
    }

    #[test]
    fn test_extract_small_play() {
        let raw = lines(&[
            "<title>L'Avare (MOLIÈRE) | théâtre-documentation.com</title>",
            "<p>Comédie en un acte.</p>",
            "<p> </p>",
            "<p><strong><em>Personnages</em></strong></p>",
            "<p>HARPAGON, père.</p>",
            "<p>CLÉANTE, fils.</p>",
            "<p> </p>",
            "<h1>ACTE I</h1>",
            r#"<h2 class="c"><strong>Scène 1</strong></h2>"#,
            r#"<p align="center">HARPAGON.</p>"#,
            "<p>Au voleur !</p>",
            r#"<p align="center">CLEANTE.</p>"#,
            "<p>Mon\u{a0}père ?</p>",
        ]);
        let document = extract_play(&raw, &ConversionConfig::default()).unwrap();

        assert_eq!(document.metadata.title, "L'Avare");
        assert_eq!(document.report.acts_found, 1);
        assert_eq!(document.report.act_headings, 1);
        assert!(document.report.act_count_matches());
        assert!(document.report.cast_found);
        assert!(!document.report.has_unguessed());
        assert_eq!(document.report.undeclared_ids, 1);

        let scene = &document.body.acts()[0].scenes[0];
        assert_eq!(
            scene.repliques[2],
            Replique::Speaker {
                text: "CLEANTE.".into(),
                character_id: Some("cléante".into()),
            }
        );
        assert_eq!(scene.repliques[3], Replique::dialogue("Mon père ?"));
    }
}
