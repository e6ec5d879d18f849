//! Core library types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown in place of an empty title or artist.
pub const MISSING_FIELD_PLACEHOLDER: &str = "—";

/// Opaque unique identifier for a track. Merge/dedupe key of the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for TrackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata describing one track in the local library.
///
/// Field names are persisted in camelCase (`folderPath`, `isBundled`,
/// `stemsReady`). Missing fields in a stored entry fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackRecord {
    /// Unique id, stable for the track's lifetime.
    pub id: TrackId,
    /// Display name derived from the imported file or folder name.
    pub title: String,
    /// Display artist name.
    pub artist: String,
    /// Folder holding the audio payload, relative to the storage root.
    pub folder_path: String,
    /// True for content shipped with the application.
    pub is_bundled: bool,
    /// Reserved for multi-stem processing.
    pub stems_ready: bool,
}

impl TrackRecord {
    /// Create a record. `stems_ready` always starts out false.
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        folder_path: impl Into<String>,
        is_bundled: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            folder_path: folder_path.into(),
            is_bundled,
            stems_ready: false,
        }
    }

    pub fn display_title(&self) -> &str {
        non_empty_or_placeholder(&self.title)
    }

    pub fn display_artist(&self) -> &str {
        non_empty_or_placeholder(&self.artist)
    }
}

fn non_empty_or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        MISSING_FIELD_PLACEHOLDER
    } else {
        value
    }
}

/// Root of the persisted `library.json` document.
///
/// `tracks` is optional so that an empty-root placeholder (`{}`) parses and
/// can be told apart from a real, possibly empty, track list.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LibraryDocument {
    #[serde(default)]
    pub tracks: Option<Vec<TrackRecord>>,
}

/// Borrowed view used when writing the document.
#[derive(Debug, Serialize)]
pub(crate) struct LibraryDocumentRef<'a> {
    pub tracks: &'a [TrackRecord],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_record_uses_camel_case_fields() {
        let track = TrackRecord::new(
            TrackId::from("id-1"),
            "Song",
            "Demo",
            "DemoTracks/id-1/",
            true,
        );
        let json = serde_json::to_value(&track).unwrap();

        assert_eq!(json["id"], "id-1");
        assert_eq!(json["title"], "Song");
        assert_eq!(json["artist"], "Demo");
        assert_eq!(json["folderPath"], "DemoTracks/id-1/");
        assert_eq!(json["isBundled"], true);
        assert_eq!(json["stemsReady"], false);
        assert_eq!(json.as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_track_record_missing_fields_default() {
        let track: TrackRecord = serde_json::from_str(r#"{"id":"x","title":"T"}"#).unwrap();
        assert_eq!(track.id, TrackId::from("x"));
        assert_eq!(track.artist, "");
        assert!(!track.is_bundled);
        assert!(!track.stems_ready);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = TrackId::generate();
        let b = TrackId::generate();
        assert_ne!(a, b);
        assert!(!a.is_blank());
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_blank_ids() {
        assert!(TrackId::default().is_blank());
        assert!(TrackId::from("   ").is_blank());
        assert!(!TrackId::from("a").is_blank());
    }

    #[test]
    fn test_display_placeholders() {
        let mut track = TrackRecord::default();
        assert_eq!(track.display_title(), MISSING_FIELD_PLACEHOLDER);
        assert_eq!(track.display_artist(), MISSING_FIELD_PLACEHOLDER);

        track.title = "Intro".to_string();
        track.artist = "Demo".to_string();
        assert_eq!(track.display_title(), "Intro");
        assert_eq!(track.display_artist(), "Demo");
    }

    #[test]
    fn test_document_distinguishes_empty_root() {
        let empty_root: LibraryDocument = serde_json::from_str("{}").unwrap();
        assert!(empty_root.tracks.is_none());

        let empty_list: LibraryDocument = serde_json::from_str(r#"{"tracks":[]}"#).unwrap();
        assert_eq!(empty_list.tracks, Some(vec![]));
    }
}
