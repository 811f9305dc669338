//! MediaBrowser server notifications and library updates
//!
//! Every call fans out to each configured host (comma-separated, trimmed) and
//! reports one [`HostResult`] per host. Network failures never surface as
//! errors; they degrade to failed results, `false` or `None`.

use crate::config::MediaBrowserConfig;
use crate::error::Result;
use crate::types::{EpisodeRef, HostResult, ShowRef};
use tracing::{debug, error, info, warn};

mod discovery;


pub use discovery::{DISCOVERY_MESSAGE, discover};

/// Path prefix of every server endpoint
const API_PREFIX: &str = "/mediabrowser";
/// Admin notification endpoint, relative to [`API_PREFIX`]
const NOTIFY_METHOD: &str = "Notifications/Admin";
/// Series refresh endpoint, relative to [`API_PREFIX`]
const LIBRARY_METHOD: &str = "Library/Series/Updated";

/// Message sent by [`MediaBrowserNotifier::test_notify`]
pub const TEST_MESSAGE: &str = "This is a test notification from Sick Beard";

/// Notification kinds the host application raises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyEvent {
    /// An episode was sent to the download client
    Snatch,
    /// An episode finished downloading and was post-processed
    Download,
    /// Connectivity test from the settings page
    Test,
}

impl NotifyEvent {
    /// Notification title shown by the server
    pub fn title(&self) -> &'static str {
        match self {
            NotifyEvent::Snatch => "Started Download",
            NotifyEvent::Download => "Download Finished",
            NotifyEvent::Test => "Test",
        }
    }
}

/// Per-call replacements for the configured host and credentials
///
/// Empty strings count as omitted, like `None`.
#[derive(Debug, Clone, Default)]
pub struct HostOverrides {
    /// Comma-separated host list
    pub host: Option<String>,
    /// Basic auth username
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

/// What a library update refers to
///
/// The TVDB id is taken from the first of `tvdbid`, `episode`, `show` that is set.
#[derive(Debug, Clone, Default)]
pub struct LibraryTarget<'a> {
    /// Explicit TVDB id
    pub tvdbid: Option<u64>,
    /// Episode whose show should be refreshed
    pub episode: Option<&'a EpisodeRef>,
    /// Show to refresh
    pub show: Option<&'a ShowRef>,
}

impl<'a> LibraryTarget<'a> {
    /// Target an explicit TVDB id
    pub fn tvdbid(tvdbid: u64) -> Self {
        Self {
            tvdbid: Some(tvdbid),
            ..Self::default()
        }
    }

    /// Target the show an episode belongs to
    pub fn episode(episode: &'a EpisodeRef) -> Self {
        Self {
            episode: Some(episode),
            ..Self::default()
        }
    }

    /// Target a show
    pub fn show(show: &'a ShowRef) -> Self {
        Self {
            show: Some(show),
            ..Self::default()
        }
    }

    /// Resolved TVDB id, if any input was given
    pub fn resolve(&self) -> Option<u64> {
        self.tvdbid
            .or_else(|| self.episode.map(|ep| ep.show.tvdbid))
            .or_else(|| self.show.map(|show| show.tvdbid))
    }
}

/// Sends admin notifications and library refreshes to MediaBrowser servers
///
/// # Examples
///
/// ```no_run
/// use liftcup::config::MediaBrowserConfig;
/// use liftcup::notify::MediaBrowserNotifier;
///
/// # #[tokio::main]
/// # async fn main() -> liftcup::Result<()> {
/// let config = MediaBrowserConfig {
///     enabled: true,
///     host: "192.168.1.10:8096, 192.168.1.11:8096".into(),
///     notify_on_download: true,
///     ..Default::default()
/// };
/// let notifier = MediaBrowserNotifier::new(config)?;
///
/// for result in notifier.notify_download("Show - 1x01 - Pilot").await {
///     println!("{}: {}", result.host, result.success);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MediaBrowserNotifier {
    config: MediaBrowserConfig,
    client: reqwest::Client,
}

impl MediaBrowserNotifier {
    /// Create a notifier with an HTTP client using the configured timeout
    pub fn new(config: MediaBrowserConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Notifier settings
    pub fn config(&self) -> &MediaBrowserConfig {
        &self.config
    }

    /// Announce a snatched episode, if snatch notifications are on
    pub async fn notify_snatch(&self, ep_name: &str) -> Vec<HostResult> {
        if !self.config.notify_on_snatch {
            debug!("snatch notifications disabled");
            return Vec::new();
        }
        self.notify(
            NotifyEvent::Snatch.title(),
            ep_name,
            &HostOverrides::default(),
            false,
        )
        .await
    }

    /// Announce a downloaded episode, if download notifications are on
    pub async fn notify_download(&self, ep_name: &str) -> Vec<HostResult> {
        if !self.config.notify_on_download {
            debug!("download notifications disabled");
            return Vec::new();
        }
        self.notify(
            NotifyEvent::Download.title(),
            ep_name,
            &HostOverrides::default(),
            false,
        )
        .await
    }

    /// Send a test notification, even when the notifier is disabled
    pub async fn test_notify(
        &self,
        host: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Vec<HostResult> {
        let overrides = HostOverrides {
            host: host.map(str::to_string),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        };
        self.notify(NotifyEvent::Test.title(), TEST_MESSAGE, &overrides, true)
            .await
    }

    /// Post an admin notification to every host
    ///
    /// Does nothing unless the notifier is enabled or `force` is set. Exactly
    /// one request is made per host; a failing host does not stop the others.
    pub async fn notify(
        &self,
        title: &str,
        message: &str,
        overrides: &HostOverrides,
        force: bool,
    ) -> Vec<HostResult> {
        if !self.config.enabled && !force {
            debug!("notifier disabled, not sending");
            return Vec::new();
        }

        let host_list = pick(overrides.host.as_deref(), Some(self.config.host.as_str()));
        let username = pick(overrides.username.as_deref(), self.config.username.as_deref());
        let password = pick(overrides.password.as_deref(), self.config.password.as_deref());

        let hosts = split_hosts(host_list.unwrap_or_default());
        if hosts.is_empty() {
            error!("no MediaBrowser host specified, check your settings");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(hosts.len());
        for host in hosts {
            info!(host, message, "sending MediaBrowser notification");
            let request = Request {
                host,
                method: NOTIFY_METHOD,
                query: None,
                title,
                message,
                username,
                password,
            };
            results.push(self.send(request).await);
        }
        results
    }

    /// Ask the servers to refresh one series
    ///
    /// Runs only when the notifier and library updates are both enabled.
    /// Returns `true` only if a TVDB id was resolved and every selected host
    /// accepted the request.
    pub async fn update_library(&self, target: LibraryTarget<'_>) -> bool {
        if !self.config.enabled || !self.config.update_library {
            debug!("library updates disabled");
            return false;
        }

        let mut hosts = split_hosts(&self.config.host);
        if hosts.is_empty() {
            debug!("no MediaBrowser host specified, check your settings");
            return false;
        }
        if self.config.update_only_first {
            hosts.truncate(1);
        }

        let Some(tvdbid) = target.resolve() else {
            debug!("unable to update show due to missing tvdbid");
            return false;
        };

        let tvdbid_param = tvdbid.to_string();
        let message = format!("Updating show {tvdbid}");
        let mut all_ok = true;
        for host in hosts {
            info!(host, tvdbid, "updating MediaBrowser library");
            let request = Request {
                host,
                method: LIBRARY_METHOD,
                query: Some(("tvdbid", &tvdbid_param)),
                title: "Library Update",
                message: &message,
                username: self.config.username.as_deref().filter(|u| !u.is_empty()),
                password: self.config.password.as_deref(),
            };
            all_ok &= self.send(request).await.success;
        }
        all_ok
    }

    /// Look for a server on the local network
    ///
    /// Broadcasts [`DISCOVERY_MESSAGE`] on the configured discovery port and
    /// returns the server id from the reply, or `None` on timeout or error.
    pub async fn server_broadcast(&self) -> Option<String> {
        let target = std::net::SocketAddr::from((
            std::net::Ipv4Addr::BROADCAST,
            self.config.discovery_port,
        ));
        discover(target, self.config.discovery_timeout).await
    }

    async fn send(&self, req: Request<'_>) -> HostResult {
        let url = format!("http://{}{}/{}", req.host, API_PREFIX, req.method);
        let form = [
            ("Name", req.title),
            ("Description", req.message),
            ("Source", self.config.source.as_str()),
        ];

        let mut request = self.client.post(&url).form(&form);
        if let Some((key, value)) = req.query {
            request = request.query(&[(key, value)]);
        }
        if let Some(username) = req.username {
            request = request.basic_auth(username, req.password);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(host = req.host, status = %response.status(), "MediaBrowser request accepted");
                HostResult::ok(req.host)
            }
            Ok(response) => {
                let error_msg = format!(
                    "server returned status {}: {}",
                    response.status(),
                    response.text().await.unwrap_or_default()
                );
                warn!(host = req.host, error = %error_msg, "MediaBrowser request failed");
                HostResult::failed(req.host, error_msg)
            }
            Err(e) => {
                let error_msg = format!("notification failed: {e}");
                error!(host = req.host, error = %error_msg, "MediaBrowser request failed");
                HostResult::failed(req.host, error_msg)
            }
        }
    }
}

/// One POST to one host
struct Request<'a> {
    host: &'a str,
    method: &'static str,
    query: Option<(&'static str, &'a str)>,
    title: &'a str,
    message: &'a str,
    username: Option<&'a str>,
    password: Option<&'a str>,
}

/// First non-empty value
fn pick<'a>(given: Option<&'a str>, configured: Option<&'a str>) -> Option<&'a str> {
    given
        .filter(|v| !v.is_empty())
        .or(configured.filter(|v| !v.is_empty()))
}

/// Split a comma-separated host list, trimming entries and dropping empty ones
pub(crate) fn split_hosts(hosts: &str) -> Vec<&str> {
    hosts
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .collect()
}
