//! On-disk layout of the library storage root.
//!
//! ```text
//! <root>/
//!   DemoTracks/<id>/...
//!   UserTracks/<id>/original.mp3
//!   library.json
//! ```
//!
//! Every `folderPath` stored in a track record is relative to `<root>`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{LibraryError, Result};
use crate::library::TrackRecord;

/// Subdirectory holding copied demo content.
pub const DEMO_TRACKS_DIR: &str = "DemoTracks";
/// Subdirectory holding user-imported tracks.
pub const USER_TRACKS_DIR: &str = "UserTracks";
/// Name of the library metadata file.
pub const LIBRARY_FILE_NAME: &str = "library.json";
/// Canonical audio payload name inside a track folder.
pub const ORIGINAL_FILE_NAME: &str = "original.mp3";
/// Placeholder written when the metadata file is first created.
pub const EMPTY_ROOT_DOCUMENT: &str = "{}";

/// Which storage area a track folder lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackArea {
    Demo,
    User,
}

impl TrackArea {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Demo => DEMO_TRACKS_DIR,
            Self::User => USER_TRACKS_DIR,
        }
    }
}

/// Resolved paths of the storage root. Computed once, then passed around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
    demo_tracks: PathBuf,
    user_tracks: PathBuf,
    library_file: PathBuf,
}

impl StorageLayout {
    /// Compute the layout under `root` without touching the filesystem.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        Self {
            demo_tracks: root.join(DEMO_TRACKS_DIR),
            user_tracks: root.join(USER_TRACKS_DIR),
            library_file: root.join(LIBRARY_FILE_NAME),
            root,
        }
    }

    /// Compute the layout under `root` and make sure it exists on disk.
    pub fn open<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let layout = Self::new(root);
        layout.ensure_structure()?;
        Ok(layout)
    }

    /// Resolve the storage root from settings: `<data_dir>/<app_folder_name>`.
    pub fn root_from_settings(settings: &Settings) -> Result<PathBuf> {
        let data_dir = match &settings.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir().ok_or(LibraryError::NoDataDir)?,
        };
        Ok(data_dir.join(&settings.app_folder_name))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn demo_tracks_dir(&self) -> &Path {
        &self.demo_tracks
    }

    pub fn user_tracks_dir(&self) -> &Path {
        &self.user_tracks
    }

    pub fn library_file(&self) -> &Path {
        &self.library_file
    }

    pub fn area_dir(&self, area: TrackArea) -> &Path {
        match area {
            TrackArea::Demo => &self.demo_tracks,
            TrackArea::User => &self.user_tracks,
        }
    }

    /// Create the root, both track areas and the metadata file if missing.
    ///
    /// Safe to call repeatedly. An existing metadata file is never rewritten.
    pub fn ensure_structure(&self) -> Result<()> {
        for dir in [&self.root, &self.demo_tracks, &self.user_tracks] {
            fs::create_dir_all(dir).map_err(|e| {
                log::error!("Failed to create {:?}: {}", dir, e);
                LibraryError::io(dir, e)
            })?;
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.library_file)
        {
            Ok(mut file) => {
                file.write_all(EMPTY_ROOT_DOCUMENT.as_bytes())
                    .map_err(|e| LibraryError::io(&self.library_file, e))?;
                log::info!("Created library file at {:?}", self.library_file);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                log::error!("Failed to create {:?}: {}", self.library_file, e);
                return Err(LibraryError::io(&self.library_file, e));
            }
        }

        Ok(())
    }

    /// Relative folder path recorded for a track, e.g. `UserTracks/<id>/`.
    pub fn relative_track_folder(area: TrackArea, id: &str) -> String {
        format!("{}/{}/", area.dir_name(), id)
    }

    /// Absolute destination folder for a track id in the given area.
    pub fn track_dir(&self, area: TrackArea, id: &str) -> PathBuf {
        self.area_dir(area).join(id)
    }

    /// Join a record's relative `folderPath` onto the root.
    pub fn resolve_folder(&self, folder_path: &str) -> PathBuf {
        let relative = folder_path.trim_end_matches(['/', '\\']);
        let mut path = self.root.clone();
        for part in relative.split(['/', '\\']).filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path
    }

    /// Location of a track's `original.mp3`, if it exists on disk.
    pub fn original_audio_path(&self, track: &TrackRecord) -> Option<PathBuf> {
        if track.folder_path.trim().is_empty() {
            return None;
        }

        let path = self
            .resolve_folder(&track.folder_path)
            .join(ORIGINAL_FILE_NAME);
        if path.is_file() {
            Some(path)
        } else {
            log::warn!("Audio file not found for '{}': {:?}", track.title, path);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::library::TrackId;

    #[test]
    fn test_paths_derive_from_root() {
        let layout = StorageLayout::new("/data/Cadence");
        assert_eq!(layout.root(), Path::new("/data/Cadence"));
        assert_eq!(
            layout.demo_tracks_dir(),
            Path::new("/data/Cadence/DemoTracks")
        );
        assert_eq!(
            layout.user_tracks_dir(),
            Path::new("/data/Cadence/UserTracks")
        );
        assert_eq!(
            layout.library_file(),
            Path::new("/data/Cadence/library.json")
        );
    }

    #[test]
    fn test_ensure_structure_creates_everything() {
        let temp_dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(temp_dir.path().join("Cadence"));

        layout.ensure_structure().unwrap();

        assert!(layout.root().is_dir());
        assert!(layout.demo_tracks_dir().is_dir());
        assert!(layout.user_tracks_dir().is_dir());
        assert_eq!(
            fs::read_to_string(layout.library_file()).unwrap(),
            EMPTY_ROOT_DOCUMENT
        );
    }

    #[test]
    fn test_ensure_structure_is_idempotent_and_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let layout = StorageLayout::open(temp_dir.path()).unwrap();

        let existing = r#"{"tracks":[{"id":"a","title":"A","artist":"X","folderPath":"UserTracks/a/","isBundled":false,"stemsReady":false}]}"#;
        fs::write(layout.library_file(), existing).unwrap();
        fs::write(layout.user_tracks_dir().join("keep.txt"), b"keep").unwrap();

        for _ in 0..3 {
            layout.ensure_structure().unwrap();
        }

        assert_eq!(fs::read_to_string(layout.library_file()).unwrap(), existing);
        assert!(layout.user_tracks_dir().join("keep.txt").is_file());

        let mut names: Vec<String> = fs::read_dir(layout.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["DemoTracks", "UserTracks", "library.json"]);
    }

    #[test]
    fn test_ensure_structure_reports_io_errors() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the root directory should go.
        let blocker = temp_dir.path().join("Cadence");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = StorageLayout::open(&blocker).unwrap_err();
        assert!(matches!(err, LibraryError::Io { .. }));
    }

    #[test]
    fn test_root_from_settings_uses_data_dir_override() {
        let settings = Settings {
            data_dir: Some(PathBuf::from("/srv/music")),
            app_folder_name: "Visualizer".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            StorageLayout::root_from_settings(&settings).unwrap(),
            PathBuf::from("/srv/music/Visualizer")
        );
    }

    #[test]
    fn test_relative_track_folder() {
        assert_eq!(
            StorageLayout::relative_track_folder(TrackArea::Demo, "abc"),
            "DemoTracks/abc/"
        );
        assert_eq!(
            StorageLayout::relative_track_folder(TrackArea::User, "abc"),
            "UserTracks/abc/"
        );
    }

    #[test]
    fn test_original_audio_path_resolves_relative_folder() {
        let temp_dir = TempDir::new().unwrap();
        let layout = StorageLayout::open(temp_dir.path()).unwrap();

        let folder = layout.track_dir(TrackArea::User, "t1");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join(ORIGINAL_FILE_NAME), b"mp3").unwrap();

        let track = TrackRecord::new(
            TrackId::from("t1"),
            "Song",
            "Unknown",
            StorageLayout::relative_track_folder(TrackArea::User, "t1"),
            false,
        );
        assert_eq!(
            layout.original_audio_path(&track),
            Some(folder.join(ORIGINAL_FILE_NAME))
        );

        let missing = TrackRecord::new(
            TrackId::from("t2"),
            "Gone",
            "Unknown",
            "UserTracks/t2/",
            false,
        );
        assert_eq!(layout.original_audio_path(&missing), None);
    }
}
