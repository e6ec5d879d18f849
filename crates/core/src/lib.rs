//! Cadence track library
//!
//! Local, file-backed catalog of the tracks the visualizer can play.
//!
//! # Features
//!
//! - Storage root with `DemoTracks/`, `UserTracks/` and `library.json`
//! - JSON track store with upsert/remove and change notification
//! - Self-healing load of a missing or corrupt library file
//! - First-run seeding from bundled demo content
//! - Import of user-selected audio files

pub mod config;
pub mod error;
pub mod layout;
pub mod library;

pub use config::{ConfigError, ConfigManager, ConfigSchema, Settings};
pub use error::LibraryError;
pub use layout::{StorageLayout, TrackArea};
pub use library::{
    import_user_track, seed_demo_tracks, LibraryStore, SeedReport, SubscriptionId, TrackId,
    TrackRecord,
};
