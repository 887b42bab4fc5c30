// WHY: the play tree is a closed set of node kinds, so consumers match exhaustively
// instead of probing loosely-typed records for keys

use serde::Serialize;
use std::collections::BTreeSet;

/// One unit of scene content, in reading order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Replique {
    /// Speaker declaration; `character_id` is filled by the resolver
    Speaker {
        text: String,
        character_id: Option<String>,
    },
    Dialogue { text: String },
    Stage { text: String },
}

impl Replique {
    pub fn speaker(text: impl Into<String>) -> Self {
        Replique::Speaker {
            text: text.into(),
            character_id: None,
        }
    }

    pub fn dialogue(text: impl Into<String>) -> Self {
        Replique::Dialogue { text: text.into() }
    }

    pub fn stage(text: impl Into<String>) -> Self {
        Replique::Stage { text: text.into() }
    }

    pub fn is_speaker(&self) -> bool {
        matches!(self, Replique::Speaker { .. })
    }

    pub fn character_id(&self) -> Option<&str> {
        match self {
            Replique::Speaker { character_id, .. } => character_id.as_deref(),
            _ => None,
        }
    }

    /// Raw text of the entry regardless of kind
    pub fn text(&self) -> &str {
        match self {
            Replique::Speaker { text, .. } | Replique::Dialogue { text } | Replique::Stage { text } => text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scene {
    /// Label after "Scène ", or a slug of the heading
    pub number: String,
    pub name: String,
    /// Leading "characters present" line moved out of the entries
    pub speakers_text: Option<String>,
    /// Canonical identifiers expected in this scene, derived from `speakers_text`
    pub speaker_ids: BTreeSet<String>,
    pub repliques: Vec<Replique>,
}

impl Scene {
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn last_is_speaker(&self) -> bool {
        self.repliques.last().is_some_and(Replique::is_speaker)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Act {
    /// 1-based position among the acts of the play
    pub ordinal: usize,
    /// Label after "ACTE ", or a slug of the heading
    pub label: String,
    pub name: String,
    pub stage_indication: Option<String>,
    pub scenes: Vec<Scene>,
}

/// Top level of the play: acts, or scenes directly when the play has no acts.
/// The mode is fixed by the first division pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "divisions", rename_all = "lowercase")]
pub enum PlayBody {
    #[default]
    Empty,
    Acts(Vec<Act>),
    Scenes(Vec<Scene>),
}

impl PlayBody {
    pub fn is_empty(&self) -> bool {
        match self {
            PlayBody::Empty => true,
            PlayBody::Acts(acts) => acts.is_empty(),
            PlayBody::Scenes(scenes) => scenes.is_empty(),
        }
    }

    pub fn is_act_less(&self) -> bool {
        matches!(self, PlayBody::Scenes(_))
    }

    pub fn acts(&self) -> &[Act] {
        match self {
            PlayBody::Acts(acts) => acts,
            _ => &[],
        }
    }

    /// Scene currently receiving content, if any
    pub fn current_scene(&self) -> Option<&Scene> {
        match self {
            PlayBody::Empty => None,
            PlayBody::Acts(acts) => acts.last().and_then(|act| act.scenes.last()),
            PlayBody::Scenes(scenes) => scenes.last(),
        }
    }

    pub fn current_scene_mut(&mut self) -> Option<&mut Scene> {
        match self {
            PlayBody::Empty => None,
            PlayBody::Acts(acts) => acts.last_mut().and_then(|act| act.scenes.last_mut()),
            PlayBody::Scenes(scenes) => scenes.last_mut(),
        }
    }

    pub fn scenes(&self) -> Box<dyn Iterator<Item = &Scene> + '_> {
        match self {
            PlayBody::Empty => Box::new(std::iter::empty()),
            PlayBody::Acts(acts) => Box::new(acts.iter().flat_map(|act| act.scenes.iter())),
            PlayBody::Scenes(scenes) => Box::new(scenes.iter()),
        }
    }

    pub fn scenes_mut(&mut self) -> Box<dyn Iterator<Item = &mut Scene> + '_> {
        match self {
            PlayBody::Empty => Box::new(std::iter::empty()),
            PlayBody::Acts(acts) => Box::new(acts.iter_mut().flat_map(|act| act.scenes.iter_mut())),
            PlayBody::Scenes(scenes) => Box::new(scenes.iter_mut()),
        }
    }
}

/// One declared cast member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CastMember {
    pub id: String,
    pub full_name: String,
    /// Role annotation after the first comma, without the comma
    pub role: String,
}

/// Declared table-of-contents entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredAct {
    pub name: String,
    pub scenes: Vec<String>,
}

impl DeclaredAct {
    pub fn new(name: impl Into<String>, scenes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            scenes,
        }
    }

    /// True when the entry lists scenes, all named "Scène ..."
    pub fn is_structured(&self) -> bool {
        !self.scenes.is_empty() && self.scenes.iter().all(|s| s.contains("Scène"))
    }
}

/// A collected dedication or preface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontBlock {
    pub header: String,
    pub paragraphs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_scene_follows_last_act() {
        let mut first = Act { ordinal: 1, ..Default::default() };
        first.scenes.push(Scene::new("1", "Scène 1"));
        let second = Act { ordinal: 2, ..Default::default() };
        let body = PlayBody::Acts(vec![first, second]);

        // the open act has no scene yet
        assert!(body.current_scene().is_none());
        assert_eq!(body.scenes().count(), 1);
    }

    #[test]
    fn test_declared_act_structure() {
        assert!(DeclaredAct::new("ACTE I", vec!["Scène 1".into()]).is_structured());
        assert!(!DeclaredAct::new("PROLOGUE", vec![]).is_structured());
        assert!(!DeclaredAct::new("Acte unique", vec!["Tableau 1".into()]).is_structured());
    }
}
