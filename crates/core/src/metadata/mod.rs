use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TITLE_KEY: &str = "title";
pub const TRACKER_KEY: &str = "tracker";
pub const UNKNOWN_TRACKER: &str = "Unknown";
pub const NO_SONG_TITLE: &str = "No Song Loaded";
pub const LOADING_TITLE: &str = "Loading...";
pub const EMPTY_INFO: &str = "-- / --";

/// Key/value metadata reported by the engine for the loaded module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata(BTreeMap<String, String>);

impl TrackMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value for `key`. Values that are empty or contain only
    /// whitespace are trimmed away and count as missing, so they trigger the
    /// same fallbacks as an absent key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TrackMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// The two strings shown in the title and info regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayText {
    pub title: String,
    pub info: String,
}

impl DisplayText {
    /// Placeholder shown before anything is loaded and after stop.
    pub fn no_song() -> Self {
        Self {
            title: NO_SONG_TITLE.to_string(),
            info: EMPTY_INFO.to_string(),
        }
    }

    pub fn loading() -> Self {
        Self {
            title: LOADING_TITLE.to_string(),
            info: EMPTY_INFO.to_string(),
        }
    }
}

/// Formats engine metadata for display, falling back to the file name for the
/// title and to "Unknown" for the tracker.
pub fn present(metadata: &TrackMetadata, file_name: &str) -> DisplayText {
    let title = metadata.get(TITLE_KEY).unwrap_or(file_name);
    let tracker = metadata.get(TRACKER_KEY).unwrap_or(UNKNOWN_TRACKER);
    DisplayText {
        title: title.to_string(),
        info: format!("Tracker: {tracker}"),
    }
}
