//! Manifest parsing
//!
//! This module decodes a fetched JSON manifest into the normalized
//! [`VideoAsset`] model. Two structurally different schemas are recognized
//! and tried in a fixed order:
//!
//! 1. [`legacy`] - an array of `{id, assets[]}` groups
//! 2. [`versioned`] - an object `{version: 1, assets[]}`
//!
//! Each attempt returns a [`ParseAttempt`]; the first one that matches wins.
//! If none matches, the result is an empty list rather than an error, so an
//! unrecognized manifest degrades to "zero matching videos".
//!
//! # Examples
//!
//! ```rust
//! use aerial_fetcher::app::manifest::parse_manifest;
//!
//! let json = r#"[{"id":"g1","assets":[{"id":"a","url":"https://x/a.mov","type":"video","timeOfDay":"day"}]}]"#;
//! let videos = parse_manifest(json);
//! assert_eq!(videos.len(), 1);
//! assert_eq!(videos[0].to_string(), "<No Label> by Day (a) with 1 Url(s)");
//! ```

pub mod legacy;
pub mod types;
pub mod versioned;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info};

pub use types::{ManifestFormat, ManifestStats, ParseAttempt};

use crate::app::models::VideoAsset;

/// Parser that tries each known manifest schema in order
#[derive(Debug, Default)]
pub struct ManifestParser {
    stats: ManifestStats,
}

impl ManifestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a manifest into an ordered, deduplicated list of videos
    ///
    /// Never fails: input that matches neither schema yields an empty list.
    pub fn parse(&mut self, json: &str) -> Vec<VideoAsset> {
        self.stats = ManifestStats::default();

        let attempts: [(ManifestFormat, fn(&str, &mut ManifestStats) -> ParseAttempt); 2] = [
            (ManifestFormat::Legacy, legacy::attempt),
            (ManifestFormat::Versioned, versioned::attempt),
        ];

        let mut matched = None;
        for (format, attempt) in attempts {
            let mut stats = ManifestStats {
                format,
                ..Default::default()
            };
            if let Some(videos) = attempt(json, &mut stats).into_videos() {
                self.stats = stats;
                matched = Some(videos);
                break;
            }
        }

        let Some(videos) = matched else {
            info!("Manifest does not match any known format");
            return Vec::new();
        };

        let videos = self.normalize(videos);
        self.stats.videos = videos.len();

        debug!(
            "Parsed {} manifest: {} videos from {} assets ({} skipped, {} invalid urls)",
            self.stats.format,
            self.stats.videos,
            self.stats.assets_seen,
            self.stats.total_skipped(),
            self.stats.invalid_urls
        );

        videos
    }

    /// Get statistics about the last parse
    pub fn stats(&self) -> &ManifestStats {
        &self.stats
    }

    /// Collapse exact duplicates and order by the case-insensitive composite label
    fn normalize(&mut self, videos: Vec<VideoAsset>) -> Vec<VideoAsset> {
        let mut seen = HashSet::with_capacity(videos.len());
        let mut unique = Vec::with_capacity(videos.len());

        for video in videos {
            if seen.insert(video.clone()) {
                unique.push(video);
            } else {
                self.stats.duplicate_videos += 1;
            }
        }

        unique.sort_by_cached_key(VideoAsset::sort_key);
        unique
    }
}

/// Parse a manifest with a fresh [`ManifestParser`]
pub fn parse_manifest(json: &str) -> Vec<VideoAsset> {
    ManifestParser::new().parse(json)
}

/// Deserialize an optional string, mapping any non-string value to `None`
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}
