//! Legacy manifest schema
//!
//! The legacy manifest is a JSON array of groups, each carrying an `assets`
//! array. Only assets of type `video` are relevant and each contributes a
//! single URL. The schema has no quality signal, so every candidate is tagged
//! `SDR1080`.

use serde::Deserialize;
use tracing::{debug, trace};

use super::lenient_string;
use super::types::{ManifestStats, ParseAttempt};
use crate::app::models::{DownloadCandidate, TimeOfDay, VideoAsset, VideoQuality};
use crate::constants::manifest;

#[derive(Debug, Deserialize)]
struct LegacyGroup {
    #[serde(default)]
    assets: Vec<LegacyAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyAsset {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    accessibility_label: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    asset_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    time_of_day: Option<String>,
}

/// Try to decode `json` as a legacy manifest
pub(crate) fn attempt(json: &str, stats: &mut ManifestStats) -> ParseAttempt {
    let groups: Vec<LegacyGroup> = match serde_json::from_str(json) {
        Ok(groups) => groups,
        Err(e) => {
            debug!("Manifest is not in legacy format: {}", e);
            return ParseAttempt::NoMatch;
        }
    };

    let mut videos = Vec::new();
    for asset in groups.into_iter().flat_map(|group| group.assets) {
        stats.assets_seen += 1;

        if asset.asset_type.as_deref() != Some(manifest::LEGACY_VIDEO_TYPE) {
            stats.non_video_assets += 1;
            continue;
        }

        let Some(candidate) = asset
            .url
            .as_deref()
            .and_then(|url| DownloadCandidate::parse(url, VideoQuality::SDR1080))
        else {
            trace!("Skipping legacy asset with invalid url: {:?}", asset.url);
            stats.invalid_urls += 1;
            continue;
        };

        let time_of_day = TimeOfDay::from_manifest_value(asset.time_of_day.as_deref());
        match VideoAsset::new(
            asset.id.unwrap_or_default(),
            vec![candidate],
            asset.accessibility_label.unwrap_or_default(),
            time_of_day,
        ) {
            Some(video) => videos.push(video),
            None => stats.missing_fields += 1,
        }
    }

    ParseAttempt::Matched(videos)
}
