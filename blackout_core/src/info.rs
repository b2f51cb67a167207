//! Read-only snapshots of entity and file state.

use crate::entity::{Entity, EntityKind};
use crate::file::File;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What an observer sees of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,

    /// Content delivered so far
    pub data: String,

    pub size: usize,

    pub is_complete: bool,
}

impl From<&File> for FileInfo {
    fn from(file: &File) -> Self {
        Self {
            filename: file.name().to_string(),
            data: file.content().to_string(),
            size: file.size(),
            is_complete: file.is_complete(),
        }
    }
}

/// What an observer sees of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub id: String,

    /// Angular position in degrees
    pub position: f64,

    /// Distance from the body centre in km
    pub height: f64,

    #[serde(rename = "type")]
    pub kind: EntityKind,

    pub files: BTreeMap<String, FileInfo>,
}

impl From<&Entity> for EntityInfo {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id().to_string(),
            position: entity.position(),
            height: entity.height(),
            kind: entity.kind(),
            files: entity
                .files()
                .iter()
                .map(|(name, file)| (name.clone(), FileInfo::from(file)))
                .collect(),
        }
    }
}
