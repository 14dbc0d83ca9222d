//! Data model for versions, components, and download tasks.
//!
//! Everything here is transient: records are fetched for one action
//! invocation, turned into a task list, and dropped. Nothing is persisted.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Opaque identifier for a tracked asset version, as supplied by the host
/// selection payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct VersionRef(String);

impl VersionRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user whose session receives progress messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A named, typed file attachment belonging to one version.
#[derive(Debug, Clone, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    /// File suffix including the leading dot, e.g. ".mov".
    pub file_type: String,
}

/// One segment of a version's display path (the breadcrumb).
#[derive(Debug, Clone, Deserialize)]
pub struct LinkSegment {
    pub name: String,
}

/// Full version record as returned by the batched query.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetVersion {
    pub id: String,
    #[serde(default)]
    pub components: Vec<Component>,
    /// Display path; the last segment is the human-readable version name.
    #[serde(default)]
    pub link: Vec<LinkSegment>,
}

impl AssetVersion {
    /// Human-readable version name: last breadcrumb segment with spaces
    /// replaced by underscores. Empty when the breadcrumb is empty.
    pub fn version_name(&self) -> String {
        self.link
            .last()
            .map(|segment| segment.name.replace(' ', "_"))
            .unwrap_or_default()
    }
}

/// Entity reference as delivered by the host selection payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectedEntity {
    #[serde(rename = "entityType")]
    pub entity_type: String,
    #[serde(rename = "entityId")]
    pub entity_id: String,
}

/// One file to download. Created once per eligible component, consumed
/// exactly once by the download step; list order is discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub file_name: String,
    pub source_url: String,
    pub destination: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_with_link(names: &[&str]) -> AssetVersion {
        AssetVersion {
            id: "v1".to_string(),
            components: Vec::new(),
            link: names
                .iter()
                .map(|n| LinkSegment {
                    name: n.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn version_name_uses_last_link_segment() {
        let version = version_with_link(&["Project", "Shot010", "Shot010 v3"]);
        assert_eq!(version.version_name(), "Shot010_v3");
    }

    #[test]
    fn version_name_empty_link() {
        let version = version_with_link(&[]);
        assert_eq!(version.version_name(), "");
    }

    #[test]
    fn selected_entity_decodes_host_payload() {
        let entity: SelectedEntity = serde_json::from_str(
            r#"{"entityType": "AssetVersion", "entityId": "abc-123"}"#,
        )
        .unwrap();
        assert_eq!(entity.entity_type, "AssetVersion");
        assert_eq!(entity.entity_id, "abc-123");
    }

    #[test]
    fn asset_version_decodes_with_missing_fields() {
        let version: AssetVersion = serde_json::from_str(r#"{"id": "v9"}"#).unwrap();
        assert_eq!(version.id, "v9");
        assert!(version.components.is_empty());
        assert!(version.link.is_empty());
    }
}
