//! JSON-backed store that owns the track collection.

use std::fs;

use crate::error::{LibraryError, Result};
use crate::layout::StorageLayout;

use super::events::{ChangeNotifier, SubscriptionId};
use super::types::{LibraryDocument, LibraryDocumentRef, TrackRecord};

/// Written in place of the serializer output when the library is empty.
pub const EMPTY_LIBRARY_JSON: &str = r#"{"tracks":[]}"#;

/// Lifecycle of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loaded,
}

/// Authoritative owner of the track collection.
///
/// The library file is read once, on first access through any read or
/// mutation, or explicitly via [`LibraryStore::load`]. Every effective mutation rewrites `library.json` in full and then notifies
/// subscribers. Readers always get copies. The store is not synchronized;
/// callers sharing it across threads must wrap it in a mutex.
#[derive(Debug)]
pub struct LibraryStore {
    layout: StorageLayout,
    tracks: Vec<TrackRecord>,
    state: StoreState,
    notifier: ChangeNotifier,
}

impl LibraryStore {
    /// Create an unloaded store backed by the layout's library file.
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            layout,
            tracks: Vec::new(),
            state: StoreState::Uninitialized,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Create a store and load it immediately.
    pub fn open(layout: StorageLayout) -> Self {
        let mut store = Self::new(layout);
        store.load();
        store
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Load the library if that has not happened yet.
    pub fn ensure_loaded(&mut self) {
        if self.state == StoreState::Uninitialized {
            self.load();
        }
    }

    /// Read `library.json` into memory.
    ///
    /// A missing, blank, unparsable or root-less file resets the library to
    /// empty and overwrites the file with the canonical empty document. This
    /// never fails; a failed recovery write is only logged.
    pub fn load(&mut self) {
        let path = self.layout.library_file();

        match read_document(&self.layout) {
            Ok(Some(tracks)) => {
                log::info!("Loaded {} tracks from {:?}", tracks.len(), path);
                self.tracks = tracks;
            }
            Ok(None) => {
                log::warn!("No track list in {:?}, starting with an empty library", path);
                self.reset_to_empty();
            }
            Err(e) => {
                log::warn!("Library load failed, initializing empty library: {}", e);
                self.reset_to_empty();
            }
        }

        self.state = StoreState::Loaded;
        self.notifier.notify();
    }

    /// All tracks in library order. Loads the library on first access.
    pub fn all_tracks(&mut self) -> Vec<TrackRecord> {
        self.ensure_loaded();
        self.tracks.clone()
    }

    /// Look up a single track by id.
    pub fn get_track(&mut self, id: &str) -> Option<TrackRecord> {
        self.ensure_loaded();
        self.tracks.iter().find(|t| t.id.as_str() == id).cloned()
    }

    pub fn len(&mut self) -> usize {
        self.ensure_loaded();
        self.tracks.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.ensure_loaded();
        self.tracks.is_empty()
    }

    /// Insert a track, or replace the one with the same id in place.
    ///
    /// A record with a blank id is rejected with a warning and `Ok(false)`.
    /// If the save fails the in-memory change is kept and the error returned.
    pub fn add_track(&mut self, track: TrackRecord) -> Result<bool> {
        if track.id.is_blank() {
            log::warn!("add_track: ignoring track '{}' without an id", track.title);
            return Ok(false);
        }

        self.ensure_loaded();

        match self.tracks.iter_mut().find(|t| t.id == track.id) {
            Some(existing) => {
                log::debug!("Replacing track {}", track.id);
                *existing = track;
            }
            None => {
                log::debug!("Adding track {}", track.id);
                self.tracks.push(track);
            }
        }

        self.save()?;
        self.notifier.notify();
        Ok(true)
    }

    /// Remove every track with the given id. Returns how many were removed.
    pub fn remove_track(&mut self, id: &str) -> Result<usize> {
        if id.is_empty() {
            return Ok(0);
        }

        self.ensure_loaded();

        if self.tracks.is_empty() {
            return Ok(0);
        }

        let before = self.tracks.len();
        self.tracks.retain(|t| t.id.as_str() != id);
        let removed = before - self.tracks.len();

        if removed > 0 {
            log::info!("Removed {} track(s) with id {}", removed, id);
            self.save()?;
            self.notifier.notify();
        } else {
            log::debug!("remove_track: no track with id {}", id);
        }

        Ok(removed)
    }

    /// Subscribe to library changes (load, add, effective remove).
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut() + Send + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Write the whole collection to `library.json`.
    fn save(&self) -> Result<()> {
        let path = self.layout.library_file();

        let json = if self.tracks.is_empty() {
            EMPTY_LIBRARY_JSON.to_string()
        } else {
            serde_json::to_string_pretty(&LibraryDocumentRef {
                tracks: &self.tracks,
            })?
        };

        fs::write(path, json).map_err(|e| {
            log::error!("Library save failed for {:?}: {}", path, e);
            LibraryError::io(path, e)
        })?;

        log::debug!("Saved {} tracks to {:?}", self.tracks.len(), path);
        Ok(())
    }

    fn reset_to_empty(&mut self) {
        self.tracks.clear();
        if let Err(e) = self.save() {
            log::error!("Failed to write empty library: {}", e);
        }
    }
}

/// `Ok(None)` means the file exists but holds no usable track list.
fn read_document(layout: &StorageLayout) -> Result<Option<Vec<TrackRecord>>> {
    let path = layout.library_file();

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| LibraryError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    // Only an object root is a document; derived structs also accept arrays.
    let value: serde_json::Value = serde_json::from_str(&content)?;
    if !value.is_object() {
        return Err(LibraryError::MalformedDocument(path.to_path_buf()));
    }

    let document: LibraryDocument = serde_json::from_value(value)?;
    Ok(document.tracks)
}
