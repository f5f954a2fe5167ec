//! Caching for API responses and user preferences
//!
//! `ResponseCache` is an in-memory store of decoded responses with per-entry
//! TTLs and lazy eviction. `PreferenceStore` persists the few user preference
//! keys (last team, favourites) to a JSON file on disk.

mod prefs;
mod response;

pub use prefs::{PreferenceStore, Preferences, PrefsError};
pub use response::{ResponseCache, DEFAULT_TTL};
