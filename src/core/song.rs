use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The structured result of extracting a song page.
///
/// Immutable once extraction completes; the cache stores and returns it by
/// value so the rendering side never observes a record mid-build. Every field
/// round-trips losslessly through serde_json, which is the cache wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    /// Performer name as published; empty if unmatched.
    pub artist: String,

    /// Song title; empty if unmatched.
    pub title: String,

    /// Site-local cover image path (host and query stripped); empty if the
    /// page carried no usable image metadata.
    pub image: String,

    /// Concatenated inner markup of every lyrics container, in document
    /// order. Empty is a valid state, not an error.
    pub lyrics: String,

    /// Credit role to contributor. Absence of a role is the "unknown" state;
    /// no empty-string placeholders.
    pub credits: HashMap<String, String>,

    pub about: About,
}

/// Description text with an optional character-truncated preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct About {
    pub full: String,

    /// First 250 characters of `full` plus "...", present only when `full`
    /// exceeds 250 characters; empty otherwise.
    pub short: String,
}
