//! Song page extraction rules.
//!
//! Converts a parsed page into a [`SongRecord`]. The source markup is
//! uncontrolled and partial matches are routine, so extraction never fails:
//! every rule degrades to an empty field when its fragment is absent. The
//! selectors match on attribute markers and class-name substrings because the
//! site's generated class names are unstable; each rule owns exactly one
//! predicate so a markup change means updating one constant.

use std::collections::HashMap;
use url::Url;

use crate::core::document::SongDocument;
use crate::core::song::{About, SongRecord};

/// Lyrics fragments are flagged with an attribute marker, not a class name.
const LYRICS_CONTAINER: &str = "[data-lyrics-container='true']";
const ARTIST_LINK: &str = "a[class*='Artist']";
const TITLE_HEADING: &str = "h1[class*='Title']";
const COVER_IMAGE_META: &str = "meta[property='og:image']";
const CREDIT_ROW: &str = "[class*='SongInfo__Credit']";
const DESCRIPTION: &str = "[class*='SongDescription__Content']";

/// Local route the rendered page serves cover images from.
const IMAGE_ROUTE: &str = "/images";

/// Preview length for the description, counted in characters, not bytes.
const ABOUT_PREVIEW_CHARS: usize = 250;

pub fn extract(doc: &SongDocument) -> SongRecord {
    let (artist, title, image) = extract_metadata(doc);

    SongRecord {
        artist,
        title,
        image,
        lyrics: extract_lyrics(doc),
        credits: extract_credits(doc),
        about: extract_about(doc),
    }
}

/// Inner markup of every lyrics container, concatenated in document order
/// with no separator.
fn extract_lyrics(doc: &SongDocument) -> String {
    doc.inner_html_all(LYRICS_CONTAINER).concat()
}

fn extract_metadata(doc: &SongDocument) -> (String, String, String) {
    let artist = doc.first_text(ARTIST_LINK).unwrap_or_default();
    let title = doc.first_text(TITLE_HEADING).unwrap_or_default();

    let image = doc
        .first_attr(COVER_IMAGE_META, "content")
        .map(|content| image_route(&content))
        .unwrap_or_default();

    (artist, title, image)
}

/// Rewrites the source cover URL to a site-local path, keeping only the path
/// component. A URL that fails to parse is treated the same as a missing one.
fn image_route(content: &str) -> String {
    match Url::parse(content) {
        Ok(url) => format!("{}{}", IMAGE_ROUTE, url.path()),
        Err(_) => String::new(),
    }
}

/// Credit rows carry the role in their first child and the contributor in
/// their last. A later duplicate role overwrites an earlier one.
fn extract_credits(doc: &SongDocument) -> HashMap<String, String> {
    let mut credits = HashMap::new();

    for (role, value) in doc.child_edge_texts(CREDIT_ROW) {
        credits.insert(role, value);
    }

    credits
}

fn extract_about(doc: &SongDocument) -> About {
    let full = doc.first_text(DESCRIPTION).unwrap_or_default();

    // Truncation is by character count, mid-word; the preview exists only
    // when the full text actually exceeds it.
    let short = if full.chars().count() > ABOUT_PREVIEW_CHARS {
        let mut preview: String = full.chars().take(ABOUT_PREVIEW_CHARS).collect();
        preview.push_str("...");
        preview
    } else {
        String::new()
    };

    About { full, short }
}
