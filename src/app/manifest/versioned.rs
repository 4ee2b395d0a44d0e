//! Versioned manifest schema
//!
//! A versioned manifest is an object `{version, assets}`. Only version 1 is
//! understood; each asset is a flat record with up to four quality-specific
//! URL fields.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::lenient_string;
use super::types::{ManifestStats, ParseAttempt};
use crate::app::models::{DownloadCandidate, TimeOfDay, VideoAsset, VideoQuality};
use crate::constants::manifest;

#[derive(Debug, Deserialize)]
struct VersionedManifest {
    version: Value,
    assets: Vec<VersionedAsset>,
}

/// A single asset record of a version 1 manifest
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionedAsset {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    accessibility_label: Option<String>,
    #[serde(default, rename = "url-1080-SDR", deserialize_with = "lenient_string")]
    url_1080_sdr: Option<String>,
    #[serde(default, rename = "url-1080-HDR", deserialize_with = "lenient_string")]
    url_1080_hdr: Option<String>,
    #[serde(default, rename = "url-4K-SDR", deserialize_with = "lenient_string")]
    url_4k_sdr: Option<String>,
    #[serde(default, rename = "url-4K-HDR", deserialize_with = "lenient_string")]
    url_4k_hdr: Option<String>,
}

impl VersionedAsset {
    /// URL fields paired with the quality implied by their name
    fn urls(&self) -> [(&Option<String>, VideoQuality); 4] {
        [
            (&self.url_1080_sdr, VideoQuality::SDR1080),
            (&self.url_1080_hdr, VideoQuality::HDR1080),
            (&self.url_4k_sdr, VideoQuality::SDR4K),
            (&self.url_4k_hdr, VideoQuality::HDR4K),
        ]
    }
}

/// Check whether a manifest `version` value denotes the supported version
///
/// Accepts the integer `1`, the float `1.0` and numeric strings such as `"1"`.
pub(crate) fn is_supported_version(version: &Value) -> bool {
    let supported = manifest::SUPPORTED_VERSION;
    match version {
        Value::Number(n) => match n.as_i64() {
            Some(v) => v == supported,
            None => n.as_f64() == Some(supported as f64),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().map(|v| v == supported).unwrap_or(false)
                || s.parse::<f64>().map(|v| v == supported as f64).unwrap_or(false)
        }
        _ => false,
    }
}

/// Try to decode `json` as a version 1 manifest
pub(crate) fn attempt(json: &str, stats: &mut ManifestStats) -> ParseAttempt {
    let parsed: VersionedManifest = match serde_json::from_str(json) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Manifest is not in versioned format: {}", e);
            return ParseAttempt::NoMatch;
        }
    };

    if !is_supported_version(&parsed.version) {
        debug!("Unsupported manifest version: {}", parsed.version);
        return ParseAttempt::NoMatch;
    }

    let mut videos = Vec::new();
    for asset in parsed.assets {
        stats.assets_seen += 1;

        let (Some(id), Some(label)) = (asset.id.as_deref(), asset.accessibility_label.as_deref())
        else {
            stats.missing_fields += 1;
            continue;
        };

        let mut candidates = Vec::new();
        for (url, quality) in asset.urls() {
            let Some(url) = url.as_deref() else {
                continue;
            };
            match DownloadCandidate::parse(url, quality) {
                Some(candidate) => candidates.push(candidate),
                None => stats.invalid_urls += 1,
            }
        }

        match VideoAsset::new(id, candidates, label, TimeOfDay::Unspecified) {
            Some(video) => videos.push(video),
            None => stats.missing_fields += 1,
        }
    }

    ParseAttempt::Matched(videos)
}
