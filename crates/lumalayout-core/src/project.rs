//! Serialized project document.

use crate::id::SceneId;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Current project file format version.
pub const PROJECT_FORMAT_VERSION: u32 = 1;

/// Import failures. A failed import never partially applies: the in-memory
/// document is left untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid project JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported project version {0}")]
    UnsupportedVersion(u32),
    #[error("project has no scenes")]
    NoScenes,
    #[error("duplicate scene id {0}")]
    DuplicateSceneId(SceneId),
    #[error("current scene {0} is not in the scene list")]
    UnknownCurrentScene(SceneId),
}

/// Versioned on-disk form of a project: the scene list plus the
/// current-scene reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub version: u32,
    pub scenes: Vec<Scene>,
    pub current_scene_id: SceneId,
}

impl ProjectDocument {
    pub fn new(scenes: Vec<Scene>, current_scene_id: SceneId) -> Self {
        Self {
            version: PROJECT_FORMAT_VERSION,
            scenes,
            current_scene_id,
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a project document.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Check the document invariants: a supported version, a non-empty
    /// scene list with unique ids, and a resolvable current-scene id.
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.version > PROJECT_FORMAT_VERSION {
            return Err(ImportError::UnsupportedVersion(self.version));
        }
        if self.scenes.is_empty() {
            return Err(ImportError::NoScenes);
        }
        let mut seen = HashSet::new();
        for scene in &self.scenes {
            if !seen.insert(scene.id) {
                return Err(ImportError::DuplicateSceneId(scene.id));
            }
        }
        if !seen.contains(&self.current_scene_id) {
            return Err(ImportError::UnknownCurrentScene(self.current_scene_id));
        }
        Ok(())
    }
}
