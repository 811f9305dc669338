//! Core types shared by the release pipeline and the notifier

use serde::{Deserialize, Serialize};

/// Quality classification of an episode as reported by the host application
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Quality could not be determined
    #[default]
    Unknown,
    /// SD TV capture
    SdTv,
    /// SD DVD rip
    SdDvd,
    /// 720p HDTV
    HdTv,
    /// 1080i raw HDTV
    RawHdTv,
    /// 1080p HDTV
    FullHdTv,
    /// 720p web download
    HdWebDl,
    /// 1080p web download
    FullHdWebDl,
    /// 720p BluRay
    HdBluRay,
    /// 1080p BluRay
    FullHdBluRay,
}

impl Quality {
    /// Whether the host failed to classify this episode
    pub fn is_unknown(&self) -> bool {
        matches!(self, Quality::Unknown)
    }
}

/// Show reference used to target a library update
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRef {
    /// TheTVDB identifier
    pub tvdbid: u64,
    /// Display name
    pub name: String,
}

/// Episode reference used to target a library update
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// Show this episode belongs to
    pub show: ShowRef,
    /// Season number
    pub season: u32,
    /// Episode number within the season
    pub episode: u32,
}

/// Outcome of one HTTP call to one notifier host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    /// Host the request was sent to
    pub host: String,
    /// Whether the host accepted the request
    pub success: bool,
    /// Error message if the request failed
    pub error: Option<String>,
}

impl HostResult {
    pub(crate) fn ok(host: &str) -> Self {
        Self {
            host: host.to_string(),
            success: true,
            error: None,
        }
    }

    pub(crate) fn failed(host: &str, error: impl Into<String>) -> Self {
        Self {
            host: host.to_string(),
            success: false,
            error: Some(error.into()),
        }
    }
}
