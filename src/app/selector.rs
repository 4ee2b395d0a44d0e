//! Download URL selection
//!
//! Flattens the candidates of all parsed videos, keeps those whose quality
//! intersects the requested quality, and produces a case-insensitively
//! deduplicated, sorted list of URLs. Submission order to the scheduler is
//! therefore deterministic for a given manifest.

use std::collections::HashSet;

use tracing::debug;

use crate::app::models::{VideoAsset, VideoQuality};

/// URLs chosen for download along with selection statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSelection {
    /// Deduplicated URLs in submission order
    pub urls: Vec<String>,
    /// Candidates that matched the quality filter, before deduplication
    pub matched_candidates: usize,
    /// Total candidates across all videos
    pub total_candidates: usize,
}

impl UrlSelection {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

/// Select the download URLs matching `quality`
pub fn select_urls(videos: &[VideoAsset], quality: VideoQuality) -> UrlSelection {
    let mut selection = UrlSelection::default();
    let mut seen = HashSet::new();

    for candidate in videos.iter().flat_map(|video| video.candidates()) {
        selection.total_candidates += 1;
        if !quality.matches(candidate.quality()) {
            continue;
        }
        selection.matched_candidates += 1;

        let url = candidate.url().as_str();
        if seen.insert(url.to_lowercase()) {
            selection.urls.push(url.to_string());
        }
    }

    sort_case_insensitive(&mut selection.urls);

    debug!(
        "Selected {} urls for quality {} ({} of {} candidates matched)",
        selection.urls.len(),
        quality,
        selection.matched_candidates,
        selection.total_candidates
    );

    selection
}

/// Sort ascending ignoring case, with the exact string as tie-breaker
fn sort_case_insensitive(urls: &mut [String]) {
    urls.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
}
