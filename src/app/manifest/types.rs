//! Core types for manifest parsing
//!
//! Each schema attempt returns a tagged [`ParseAttempt`] so the parser can try
//! the schemas in a fixed order without early exits or error-driven branching.

use std::fmt;

use crate::app::models::VideoAsset;

/// Result of trying to decode a manifest with one schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAttempt {
    /// The payload matched the schema structurally
    Matched(Vec<VideoAsset>),
    /// The payload does not have this schema's shape
    NoMatch,
}

impl ParseAttempt {
    /// Convert into the matched videos, if any
    pub fn into_videos(self) -> Option<Vec<VideoAsset>> {
        match self {
            ParseAttempt::Matched(videos) => Some(videos),
            ParseAttempt::NoMatch => None,
        }
    }
}

/// Manifest schema recognized while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    /// Array of `{id, assets[]}` groups, one URL per asset
    Legacy,
    /// `{version: 1, assets[]}` with per-quality URL fields
    Versioned,
    /// Neither schema matched
    #[default]
    Unknown,
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestFormat::Legacy => f.write_str("legacy"),
            ManifestFormat::Versioned => f.write_str("versioned (v1)"),
            ManifestFormat::Unknown => f.write_str("unknown"),
        }
    }
}

/// Statistics about manifest parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestStats {
    /// Schema that produced the result
    pub format: ManifestFormat,
    /// Raw asset records seen by the matching schema
    pub assets_seen: usize,
    /// Legacy assets whose type is not `video`
    pub non_video_assets: usize,
    /// URLs that were blank or not absolute
    pub invalid_urls: usize,
    /// Assets missing a required field (id or label)
    pub missing_fields: usize,
    /// Exact duplicate videos collapsed
    pub duplicate_videos: usize,
    /// Videos in the final result
    pub videos: usize,
}

impl ManifestStats {
    /// Get total skipped asset records
    pub fn total_skipped(&self) -> usize {
        self.non_video_assets + self.missing_fields
    }
}
