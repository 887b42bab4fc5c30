// WHY: recognition misses degrade to defaults, but a broken act/scene hierarchy cannot be
// repaired without guessing; those cases abort the document with a typed error

use thiserror::Error;

/// Structural inconsistencies that make a document's tree unverifiable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// Scene heading found before any act, while the declared scene list expects acts
    #[error("scene '{scene}' at line {line} appears before any act")]
    SceneOutsideAct { scene: String, line: usize },

    /// Dedication announced in the scene list but never found in the body
    #[error("dedication '{header}' was declared but not collected")]
    UncollectedDedication { header: String },
}
