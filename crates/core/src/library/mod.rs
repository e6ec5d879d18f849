//! Library module for track records, persistence and import flows.

mod types;

pub mod events;
pub mod import;
pub mod store;

pub use events::{ChangeNotifier, SubscriptionId};
pub use import::{
    import_user_track, seed_demo_tracks, SeedReport, SkippedEntry, DEMO_ARTIST, UNKNOWN_ARTIST,
};
pub use store::{LibraryStore, StoreState, EMPTY_LIBRARY_JSON};
pub use types::{TrackId, TrackRecord, MISSING_FIELD_PLACEHOLDER};
