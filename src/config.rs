//! Configuration types for liftcup

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Release pipeline behavior (work directory, toggles, info-file annotation)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Working directory where files are staged and release bundles built (default: "./temp")
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Log external commands instead of executing them (default: false)
    #[serde(default)]
    pub test_mode: bool,

    /// Log the full run parameters at info level (default: false)
    #[serde(default)]
    pub debug: bool,

    /// Remove the staged copy, info file and release directory when done (default: true)
    #[serde(default = "default_true")]
    pub cleanup: bool,

    /// Hand the finished release directory to the uploader (default: false)
    #[serde(default)]
    pub upload: bool,

    /// Process releases even when their quality is unknown (default: false)
    #[serde(default)]
    pub skip_quality_check: bool,

    /// Extra line written into the generated .nfo file
    #[serde(default)]
    pub nfo_annotation: Option<String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            test_mode: false,
            debug: false,
            cleanup: true,
            upload: false,
            skip_quality_check: false,
            nfo_annotation: None,
        }
    }
}

/// External tool locations (rar, par2)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Directory holding bundled platform binaries (`osx/`, `win/`) (default: "./tools")
    #[serde(default = "default_tools_root")]
    pub tools_root: PathBuf,

    /// Path to rar executable (auto-detected if None)
    #[serde(default)]
    pub rar_path: Option<PathBuf>,

    /// Path to par2 executable (auto-detected if None)
    #[serde(default)]
    pub par2_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if not bundled (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tools_root: default_tools_root(),
            rar_path: None,
            par2_path: None,
            search_path: true,
        }
    }
}

/// External uploader invocation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Uploader executable (e.g. newsmangler's `mangler.py`)
    #[serde(default)]
    pub poster_path: Option<PathBuf>,

    /// Configuration file passed to the uploader with `-c`
    #[serde(default)]
    pub poster_config: Option<PathBuf>,
}

/// MediaBrowser server notifier settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaBrowserConfig {
    /// Master switch for notifications and library updates (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Comma-separated `host:port` list
    #[serde(default)]
    pub host: String,

    /// Username sent as HTTP basic auth when set
    #[serde(default)]
    pub username: Option<String>,

    /// Password sent alongside the username
    #[serde(default)]
    pub password: Option<String>,

    /// Notify when an episode is snatched (default: false)
    #[serde(default)]
    pub notify_on_snatch: bool,

    /// Notify when an episode finished downloading (default: false)
    #[serde(default)]
    pub notify_on_download: bool,

    /// Trigger a library rescan after post-processing (default: false)
    #[serde(default)]
    pub update_library: bool,

    /// Send library updates to the first configured host only (default: false)
    #[serde(default)]
    pub update_only_first: bool,

    /// Value of the `Source` form field (default: "SickBeard")
    #[serde(default = "default_source")]
    pub source: String,

    /// HTTP request timeout (default: 30 seconds)
    #[serde(default = "default_http_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// UDP port for server discovery (default: 7359)
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,

    /// How long to wait for a discovery reply (default: 3 seconds)
    #[serde(default = "default_discovery_timeout", with = "duration_serde")]
    pub discovery_timeout: Duration,
}

impl Default for MediaBrowserConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            username: None,
            password: None,
            notify_on_snatch: false,
            notify_on_download: false,
            update_library: false,
            update_only_first: false,
            source: default_source(),
            timeout: default_http_timeout(),
            discovery_port: default_discovery_port(),
            discovery_timeout: default_discovery_timeout(),
        }
    }
}

/// Main configuration
///
/// - [`release`](ReleaseConfig) - work directory and pipeline toggles
/// - [`tools`](ToolsConfig) - rar/par2 locations
/// - [`upload`](UploadConfig) - external uploader
/// - [`media_browser`](MediaBrowserConfig) - notifier
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Release pipeline settings
    #[serde(default)]
    pub release: ReleaseConfig,

    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Uploader settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// MediaBrowser notifier settings
    #[serde(default)]
    pub media_browser: MediaBrowserConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults. The loaded config is validated.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that depend on each other
    pub fn validate(&self) -> Result<()> {
        if self.release.work_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "work directory must not be empty".into(),
                key: Some("release.work_dir".into()),
            });
        }

        if self.release.upload {
            if self.upload.poster_path.is_none() {
                return Err(Error::Config {
                    message: "upload is enabled but no uploader is configured".into(),
                    key: Some("upload.poster_path".into()),
                });
            }
            if self.upload.poster_config.is_none() {
                return Err(Error::Config {
                    message: "upload is enabled but no uploader config is set".into(),
                    key: Some("upload.poster_config".into()),
                });
            }
        }

        if self.media_browser.enabled && self.media_browser.host.trim().is_empty() {
            return Err(Error::Config {
                message: "MediaBrowser notifier is enabled but no host is set".into(),
                key: Some("media_browser.host".into()),
            });
        }

        Ok(())
    }
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_tools_root() -> PathBuf {
    PathBuf::from("tools")
}

fn default_true() -> bool {
    true
}

fn default_source() -> String {
    "SickBeard".into()
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_discovery_port() -> u16 {
    7359
}

fn default_discovery_timeout() -> Duration {
    Duration::from_secs(3)
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
