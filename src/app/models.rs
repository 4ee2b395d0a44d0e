//! Data models for Aerial Fetcher
//!
//! This module defines the normalized video model that both manifest schemas
//! are decoded into: quality flags, download candidates and video assets.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use url::Url;

use crate::constants::manifest;

bitflags! {
    /// Set of video quality tiers, combinable via bitwise OR
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VideoQuality: u8 {
        const SDR1080 = 1;
        const HDR1080 = 2;
        const SDR4K = 4;
        const HDR4K = 8;

        const ALL_SDR = Self::SDR1080.bits() | Self::SDR4K.bits();
        const ALL_HDR = Self::HDR1080.bits() | Self::HDR4K.bits();
        const ALL = Self::ALL_SDR.bits() | Self::ALL_HDR.bits();
    }
}

/// Named quality values accepted on the command line and in configuration
const QUALITY_NAMES: &[(&str, VideoQuality)] = &[
    ("All", VideoQuality::ALL),
    ("AllSDR", VideoQuality::ALL_SDR),
    ("AllHDR", VideoQuality::ALL_HDR),
    ("SDR1080", VideoQuality::SDR1080),
    ("HDR1080", VideoQuality::HDR1080),
    ("SDR4K", VideoQuality::SDR4K),
    ("HDR4K", VideoQuality::HDR4K),
];

impl VideoQuality {
    /// Check whether a candidate of quality `other` satisfies this request
    ///
    /// Selection is by intersection: a request for `AllSDR` matches a
    /// candidate tagged purely `SDR4K`.
    pub fn matches(self, other: VideoQuality) -> bool {
        self.intersects(other)
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((name, _)) = QUALITY_NAMES.iter().find(|(_, q)| q == self) {
            return f.write_str(name);
        }

        let mut parts = Vec::new();
        for (name, quality) in QUALITY_NAMES.iter().skip(3) {
            if self.contains(*quality) {
                parts.push(*name);
            }
        }

        if parts.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&parts.join("|"))
        }
    }
}

impl FromStr for VideoQuality {
    type Err = String;

    /// Parse a quality name or a `|`/`,` separated combination of names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut quality = VideoQuality::empty();

        for part in s.split(['|', ',']).map(str::trim) {
            if part.is_empty() {
                continue;
            }

            let (_, parsed) = QUALITY_NAMES
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(part))
                .ok_or_else(|| {
                    format!(
                        "Unknown quality '{}'. Supported: SDR1080, HDR1080, SDR4K, HDR4K, AllSDR, AllHDR, All",
                        part
                    )
                })?;
            quality |= *parsed;
        }

        if quality.is_empty() {
            return Err("Quality may not be empty".to_string());
        }

        Ok(quality)
    }
}

/// Time of day a video was filmed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeOfDay {
    Day,
    Night,
    #[default]
    Unspecified,
}

impl TimeOfDay {
    /// Map a legacy manifest literal; anything other than `day`/`night` is unspecified
    pub fn from_manifest_value(value: Option<&str>) -> Self {
        match value {
            Some(manifest::TIME_OF_DAY_DAY) => TimeOfDay::Day,
            Some(manifest::TIME_OF_DAY_NIGHT) => TimeOfDay::Night,
            _ => TimeOfDay::Unspecified,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Day => f.write_str("Day"),
            TimeOfDay::Night => f.write_str("Night"),
            TimeOfDay::Unspecified => f.write_str("Unspecified"),
        }
    }
}

/// One quality-tagged download URL belonging to a video
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadCandidate {
    url: Url,
    quality: VideoQuality,
}

impl DownloadCandidate {
    /// Create a candidate; returns `None` for an empty quality set
    pub fn new(url: Url, quality: VideoQuality) -> Option<Self> {
        if quality.is_empty() {
            return None;
        }
        Some(Self { url, quality })
    }

    /// Parse `raw` as an absolute URL and tag it with `quality`
    ///
    /// Returns `None` when the string is blank, relative, or otherwise
    /// malformed. Whitespace anywhere in `raw`, including at either end, makes
    /// it malformed; the URL parser would otherwise strip or drop it silently.
    pub fn parse(raw: &str, quality: VideoQuality) -> Option<Self> {
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return None;
        }

        let url = Url::parse(raw).ok()?;
        if url.cannot_be_a_base() || !url.has_host() {
            return None;
        }

        Self::new(url, quality)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn quality(&self) -> VideoQuality {
        self.quality
    }
}

impl fmt::Display for DownloadCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at '{}'", self.quality, self.url)
    }
}

/// A single video described by a manifest, normalized across schemas
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoAsset {
    id: String,
    candidates: Vec<DownloadCandidate>,
    accessibility_label: String,
    time_of_day: TimeOfDay,
}

impl VideoAsset {
    /// Build a video asset
    ///
    /// Returns `None` if the id is blank or no candidates are given. Duplicate
    /// candidates are collapsed while keeping their first position.
    pub fn new(
        id: impl Into<String>,
        candidates: Vec<DownloadCandidate>,
        accessibility_label: impl Into<String>,
        time_of_day: TimeOfDay,
    ) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return None;
        }

        let mut unique: Vec<DownloadCandidate> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }

        if unique.is_empty() {
            return None;
        }

        Some(Self {
            id,
            candidates: unique,
            accessibility_label: accessibility_label.into(),
            time_of_day,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn candidates(&self) -> &[DownloadCandidate] {
        &self.candidates
    }

    pub fn accessibility_label(&self) -> &str {
        &self.accessibility_label
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    /// Case-insensitive key used to order videos deterministically
    pub fn sort_key(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for VideoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.accessibility_label.trim().is_empty() {
            manifest::NO_LABEL
        } else {
            self.accessibility_label.as_str()
        };

        let time_of_day = match self.time_of_day {
            TimeOfDay::Unspecified => manifest::NO_TIME_OF_DAY.to_string(),
            other => other.to_string(),
        };

        let id = if self.id.trim().is_empty() {
            manifest::NO_ID
        } else {
            self.id.as_str()
        };

        write!(
            f,
            "{} by {} ({}) with {} Url(s)",
            label,
            time_of_day,
            id,
            self.candidates.len()
        )
    }
}
