// WHY: speaker names in the body drift from the cast list (abbreviations, typos, asides);
// resolution maps each one to a registry identifier and memoizes the decision per document

use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::model::{CastMember, PlayBody, Replique, Scene};
use super::normalization::{normalize_character_name, strip_tags};

static CONNECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:puis|et)\b").expect("Invalid connector regex"));

/// Thresholds for the edit-distance fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Accepted distance for any registry entry
    pub max_edit_distance: usize,
    /// Accepted distance for a speaker declared in the current scene
    pub scene_edit_distance: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: 3,
            scene_edit_distance: 5,
        }
    }
}

/// How a raw identifier was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Exact(String),
    /// Substring or edit-distance match
    Guessed(String),
    /// Kept as its own identifier
    Unresolved(String),
}

impl Resolution {
    pub fn id(&self) -> &str {
        match self {
            Resolution::Exact(id) | Resolution::Guessed(id) | Resolution::Unresolved(id) => id,
        }
    }

    pub fn into_id(self) -> String {
        match self {
            Resolution::Exact(id) | Resolution::Guessed(id) | Resolution::Unresolved(id) => id,
        }
    }
}

/// Declared cast plus the per-document memo of resolved identifiers
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    members: Vec<CastMember>,
    resolved: HashMap<String, String>,
    unresolved: BTreeSet<String>,
    fuzzy_computations: usize,
}

impl CharacterRegistry {
    pub fn new(members: Vec<CastMember>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    /// Registry built from bare identifiers
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                CastMember {
                    full_name: id.clone(),
                    id,
                    role: String::new(),
                }
            })
            .collect();
        Self::new(members)
    }

    pub fn members(&self) -> &[CastMember] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Raw identifiers that needed more than an exact match
    pub fn undeclared_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn unresolved(&self) -> &BTreeSet<String> {
        &self.unresolved
    }

    pub fn has_unguessed(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Number of edit-distance searches performed so far
    pub fn fuzzy_computations(&self) -> usize {
        self.fuzzy_computations
    }

    /// Exact, memoized or substring match, without the edit-distance fallback
    pub fn lookup(&mut self, raw_id: &str) -> Option<Resolution> {
        if self.contains(raw_id) {
            return Some(Resolution::Exact(raw_id.to_string()));
        }
        if let Some(known) = self.resolved.get(raw_id) {
            return Some(if self.unresolved.contains(raw_id) {
                Resolution::Unresolved(known.clone())
            } else {
                Resolution::Guessed(known.clone())
            });
        }
        if raw_id.is_empty() {
            return None;
        }
        let candidate = self
            .members
            .iter()
            .find(|m| m.id.contains(raw_id) || raw_id.contains(m.id.as_str()))?
            .id
            .clone();
        info!("Guessed character '{}' as '{}' by containment", raw_id, candidate);
        self.resolved.insert(raw_id.to_string(), candidate.clone());
        Some(Resolution::Guessed(candidate))
    }

    /// Full resolution: lookup, then the closest registry entry within the configured distances
    pub fn resolve(
        &mut self,
        raw_id: &str,
        scene_speakers: &BTreeSet<String>,
        config: &ConversionConfig,
    ) -> Resolution {
        if let Some(resolution) = self.lookup(raw_id) {
            return resolution;
        }

        self.fuzzy_computations += 1;
        let closest = self
            .members
            .iter()
            .map(|m| (m.id.as_str(), strsim::levenshtein(raw_id, &m.id)))
            .min_by_key(|(_, distance)| *distance);

        let accepted = closest.filter(|(id, distance)| {
            (scene_speakers.contains(*id) && *distance <= config.scene_edit_distance)
                || *distance <= config.max_edit_distance
        });

        match accepted {
            Some((id, distance)) => {
                let id = id.to_string();
                info!("Guessed character '{}' as '{}' (distance {})", raw_id, id, distance);
                self.resolved.insert(raw_id.to_string(), id.clone());
                Resolution::Guessed(id)
            }
            None => {
                warn!("Could not resolve character '{}'", raw_id);
                self.resolved.insert(raw_id.to_string(), raw_id.to_string());
                self.unresolved.insert(raw_id.to_string());
                Resolution::Unresolved(raw_id.to_string())
            }
        }
    }
}

/// Identifier of a speaker declaration: asides and emphasis clauses removed
pub fn speaker_identifier(raw: &str) -> String {
    let before_emphasis = raw.split("<em>").next().unwrap_or(raw);
    let untagged = strip_tags(before_emphasis);
    let name = untagged.split(',').next().unwrap_or(&untagged);
    normalize_character_name(name)
}

/// Identifiers named by a scene's "characters present" line that the registry knows
pub fn scene_speaker_ids(speakers_text: &str, registry: &mut CharacterRegistry) -> BTreeSet<String> {
    let separated = CONNECTOR.replace_all(speakers_text, ",");
    strip_tags(&separated)
        .split(',')
        .map(normalize_character_name)
        .filter(|id| !id.is_empty())
        .filter_map(|id| registry.lookup(&id))
        .filter(|resolution| !matches!(resolution, Resolution::Unresolved(_)))
        .map(Resolution::into_id)
        .collect()
}

fn resolve_scene(scene: &mut Scene, registry: &mut CharacterRegistry, config: &ConversionConfig) {
    if let Some(text) = &scene.speakers_text {
        scene.speaker_ids = scene_speaker_ids(text, registry);
    }
    for replique in &mut scene.repliques {
        if let Replique::Speaker { text, character_id } = replique {
            let raw_id = speaker_identifier(text);
            if raw_id.is_empty() {
                debug!("Speaker line without a name: {:?}", text);
                *character_id = None;
                continue;
            }
            *character_id = Some(registry.resolve(&raw_id, &scene.speaker_ids, config).into_id());
        }
    }
}

/// Assign a canonical identifier to every speaker of the play
pub fn resolve_characters(body: &mut PlayBody, registry: &mut CharacterRegistry, config: &ConversionConfig) {
    for scene in body.scenes_mut() {
        resolve_scene(scene, registry, config);
    }
    debug!(
        "Resolved speakers: {} undeclared, {} unresolved",
        registry.undeclared_count(),
        registry.unresolved().len()
    );
}
