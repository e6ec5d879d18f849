//! Demo seeding and user track import.
//!
//! Both flows copy audio into the storage root under a fresh track id and
//! register a [`TrackRecord`] with the [`LibraryStore`].

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{LibraryError, Result};
use crate::layout::{StorageLayout, TrackArea, ORIGINAL_FILE_NAME};

use super::store::LibraryStore;
use super::types::{TrackId, TrackRecord};

/// Artist recorded for bundled demo tracks.
pub const DEMO_ARTIST: &str = "Demo";
/// Artist recorded for user imports (no tag extraction).
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// A demo entry that could not be imported.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// Outcome of seeding the library with demo content.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub imported: Vec<TrackRecord>,
    pub skipped: Vec<SkippedEntry>,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.imported.is_empty() && self.skipped.is_empty()
    }
}

/// Copy bundled demo content into `DemoTracks/` and register it.
///
/// Only runs when the library is empty and `source_dir` exists. Each
/// non-hidden top-level entry becomes one track; files are copied as-is and
/// directories have their contents copied without an extra nesting level.
/// A failed copy skips that entry and the rest still get imported. Errors
/// saving the library are returned.
pub fn seed_demo_tracks<P: AsRef<Path>>(
    store: &mut LibraryStore,
    source_dir: P,
) -> Result<SeedReport> {
    let source_dir = source_dir.as_ref();
    let mut report = SeedReport::default();

    store.ensure_loaded();
    if !store.is_empty() {
        log::debug!(
            "Library already has {} tracks, skipping demo seeding",
            store.len()
        );
        return Ok(report);
    }

    if !source_dir.is_dir() {
        log::info!("No demo source folder at {:?}, skipping", source_dir);
        return Ok(report);
    }

    let read_dir = match fs::read_dir(source_dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            log::error!("Cannot read demo folder {:?}: {}", source_dir, e);
            return Ok(report);
        }
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        match entry {
            Ok(entry) => entries.push(entry.path()),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {:?}: {}", source_dir, e);
                report.skipped.push(SkippedEntry {
                    name: source_dir.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    entries.sort();

    log::info!("Seeding demo tracks from {:?}", source_dir);

    for source in entries {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let name = file_name.to_string_lossy().into_owned();
        if name.starts_with('.') {
            log::debug!("Skipping hidden demo entry {:?}", source);
            continue;
        }

        let id = TrackId::generate();
        let dest = store.layout().track_dir(TrackArea::Demo, id.as_str());

        if let Err(e) = fs::create_dir_all(&dest)
            .map_err(|e| LibraryError::io(&dest, e))
            .and_then(|_| copy_into_folder(&source, &dest))
        {
            log::error!("Failed to copy demo '{}': {}", name, e);
            remove_partial_folder(&dest);
            report.skipped.push(SkippedEntry {
                name,
                reason: e.to_string(),
            });
            continue;
        }

        let title = if source.is_dir() {
            name
        } else {
            file_stem_or(&source, &name)
        };

        let folder_path = StorageLayout::relative_track_folder(TrackArea::Demo, id.as_str());
        let track = TrackRecord::new(id, title, DEMO_ARTIST, folder_path, true);

        store.add_track(track.clone())?;
        log::info!("Imported demo track '{}' ({})", track.title, track.id);
        report.imported.push(track);
    }

    log::info!(
        "Demo seeding finished: {} imported, {} skipped",
        report.imported.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Copy one user-selected audio file into `UserTracks/<id>/original.mp3`
/// and register it.
///
/// Nothing is added to the library if the copy fails.
pub fn import_user_track<P: AsRef<Path>>(
    store: &mut LibraryStore,
    source: P,
) -> Result<TrackRecord> {
    let source = source.as_ref();

    if source.as_os_str().is_empty() || !source.is_file() {
        log::warn!("No valid file selected: {:?}", source);
        return Err(LibraryError::SourceNotFound(source.to_path_buf()));
    }

    log::info!("Importing user track: {:?}", source);

    let id = TrackId::generate();
    let dest = store.layout().track_dir(TrackArea::User, id.as_str());

    if let Err(e) = fs::create_dir_all(&dest)
        .map_err(|e| LibraryError::io(&dest, e))
        .and_then(|_| copy_file(source, &dest.join(ORIGINAL_FILE_NAME)))
    {
        log::error!("Failed to copy {:?}: {}", source, e);
        remove_partial_folder(&dest);
        return Err(e);
    }

    let title = file_stem_or(source, "Unknown");
    let folder_path = StorageLayout::relative_track_folder(TrackArea::User, id.as_str());
    let track = TrackRecord::new(id, title, UNKNOWN_ARTIST, folder_path, false);

    store.add_track(track.clone())?;
    log::info!("Imported '{}' as {}", track.title, track.id);
    Ok(track)
}

fn file_stem_or(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

/// Best-effort removal of a track folder left behind by a failed copy.
fn remove_partial_folder(dest: &Path) {
    if let Err(e) = fs::remove_dir_all(dest) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("Failed to clean up {:?}, folder left behind: {}", dest, e);
        }
    }
}

/// Copy a file or the contents of a directory into `dest_dir`.
fn copy_into_folder(source: &Path, dest_dir: &Path) -> Result<()> {
    if source.is_file() {
        let file_name = source
            .file_name()
            .ok_or_else(|| LibraryError::SourceNotFound(source.to_path_buf()))?;
        return copy_file(source, &dest_dir.join(file_name));
    }

    if source.is_dir() {
        return copy_dir_contents(source, dest_dir);
    }

    Err(LibraryError::io(
        source,
        io::Error::new(io::ErrorKind::InvalidInput, "not a file or directory"),
    ))
}

fn copy_dir_contents(source_dir: &Path, dest_dir: &Path) -> Result<()> {
    let entries = fs::read_dir(source_dir).map_err(|e| LibraryError::io(source_dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| LibraryError::io(source_dir, e))?;
        let path = entry.path();
        let dest = dest_dir.join(entry.file_name());

        if path.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| LibraryError::io(&dest, e))?;
            copy_dir_contents(&path, &dest)?;
        } else {
            copy_file(&path, &dest)?;
        }
    }

    Ok(())
}

/// Copy a single file, refusing to overwrite an existing destination.
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        return Err(LibraryError::io(
            dest,
            io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
        ));
    }

    fs::copy(source, dest).map_err(|e| LibraryError::io(source, e))?;
    Ok(())
}
