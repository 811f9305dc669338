//! Locating the rar and par2 binaries

use super::platform::Platform;
use crate::config::ToolsConfig;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Oldest rar release whose volume switches the pipeline relies on
const MIN_RAR_VERSION: (u32, u32) = (3, 80);

/// Tool locations resolved for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    /// Archiver executable
    pub rar: Option<PathBuf>,
    /// Parity tool executable
    pub par2: Option<PathBuf>,
    /// The archiver is missing or too old to be used
    pub rar_problem: bool,
}

/// Resolves the archiver and parity binaries once and caches the result
///
/// Lookup order for each tool:
/// 1. explicit path from [`ToolsConfig`]
/// 2. bundled binary under the tools root for this [`Platform`]
/// 3. the search path, except on 32-bit Windows
///
/// # Examples
///
/// ```no_run
/// use liftcup::tools::{Platform, ToolResolver};
///
/// # #[tokio::main]
/// # async fn main() {
/// let resolver = ToolResolver::new(Platform::detect().await, "tools");
/// let tools = resolver.resolve().await;
/// println!("rar: {:?}, par2: {:?}", tools.rar, tools.par2);
/// # }
/// ```
pub struct ToolResolver {
    platform: Platform,
    tools_root: PathBuf,
    rar_override: Option<PathBuf>,
    par2_override: Option<PathBuf>,
    search_path: Option<OsString>,
    resolved: OnceCell<ResolvedTools>,
}

impl ToolResolver {
    /// Create a resolver searching `tools_root` and the process `PATH`
    pub fn new(platform: Platform, tools_root: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            tools_root: tools_root.into(),
            rar_override: None,
            par2_override: None,
            search_path: std::env::var_os("PATH"),
            resolved: OnceCell::new(),
        }
    }

    /// Create a resolver honoring explicit paths and the `search_path` switch
    pub fn from_config(platform: Platform, config: &ToolsConfig) -> Self {
        let mut resolver = Self::new(platform, &config.tools_root);
        resolver.rar_override = config.rar_path.clone();
        resolver.par2_override = config.par2_path.clone();
        if !config.search_path {
            resolver.search_path = None;
        }
        resolver
    }

    /// Create a resolver for tool locations the caller already knows; nothing is probed
    pub fn with_tools(platform: Platform, tools: ResolvedTools) -> Self {
        Self {
            platform,
            tools_root: PathBuf::new(),
            rar_override: None,
            par2_override: None,
            search_path: None,
            resolved: OnceCell::new_with(Some(tools)),
        }
    }

    /// Replace the search path (`None` disables searching)
    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    /// Platform this resolver was built for
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolve tool locations, probing only on the first call
    pub async fn resolve(&self) -> &ResolvedTools {
        self.resolved.get_or_init(|| self.probe()).await
    }

    async fn probe(&self) -> ResolvedTools {
        let (bundled_par2, bundled_rar) = self.bundled_layout();

        let par2 = self.locate("par2", self.par2_override.as_deref(), bundled_par2);
        let rar = self.locate("rar", self.rar_override.as_deref(), bundled_rar);

        let rar_problem = match self.platform {
            Platform::Posix => !rar_version_ok(rar.as_deref()).await,
            _ => false,
        };
        if rar_problem {
            warn!(?rar, "rar is missing or older than 3.80");
        }

        info!(platform = ?self.platform, ?rar, ?par2, rar_problem, "resolved external tools");
        ResolvedTools {
            rar,
            par2,
            rar_problem,
        }
    }

    fn locate(
        &self,
        name: &str,
        configured: Option<&Path>,
        bundled: Option<&str>,
    ) -> Option<PathBuf> {
        if let Some(path) = configured {
            match executable_at(path) {
                Some(found) => return Some(found),
                None => warn!(tool = name, ?path, "configured tool is not executable, ignoring"),
            }
        }

        if let Some(found) = bundled.and_then(|rel| executable_at(&bundled_path(&self.tools_root, rel))) {
            debug!(tool = name, path = ?found, "using bundled binary");
            return Some(found);
        }

        if self.platform == Platform::Windows32 {
            return None;
        }
        self.find_on_path(name)
    }

    /// Bundled `(par2, rar)` locations relative to the tools root
    fn bundled_layout(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self.platform {
            Platform::MacOs { version } => {
                // par2-sl needs Snow Leopard or later
                let par2 = match version {
                    Some(v) if v >= (10, 6) => "osx/par2/par2-sl",
                    _ => "osx/par2/par2-classic",
                };
                (Some(par2), Some("osx/rar/rar"))
            }
            Platform::Windows64 => (Some("win/par2/x64/par2.exe"), Some("win/rar/x64/Rar.exe")),
            Platform::Windows32 => (Some("win/par2/par2.exe"), Some("win/rar/Rar.exe")),
            Platform::Posix => (None, None),
        }
    }

    fn find_on_path(&self, name: &str) -> Option<PathBuf> {
        let paths = self.search_path.as_ref()?;
        which::which_in(name, Some(paths), &self.tools_root).ok()
    }
}

fn bundled_path(root: &Path, rel: &str) -> PathBuf {
    rel.split('/').fold(root.to_path_buf(), |path, part| path.join(part))
}

/// Absolute path of `path` if it is an executable regular file
fn executable_at(path: &Path) -> Option<PathBuf> {
    let meta = std::fs::metadata(path).ok()?;
    if !meta.is_file() {
        return None;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return None;
        }
    }

    Some(std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()))
}

async fn rar_version_ok(rar: Option<&Path>) -> bool {
    let Some(rar) = rar else {
        return false;
    };

    // Running rar without arguments prints its banner
    let output = match Command::new(rar).output().await {
        Ok(output) => output,
        Err(e) => {
            warn!(?rar, error = %e, "failed to run rar for version check");
            return false;
        }
    };

    let banner = String::from_utf8_lossy(&output.stdout);
    match parse_rar_version(&banner) {
        Some(version) => {
            debug!(?version, "rar version");
            version >= MIN_RAR_VERSION
        }
        None => false,
    }
}

fn rar_banner() -> Option<&'static Regex> {
    static BANNER: OnceLock<Option<Regex>> = OnceLock::new();
    BANNER
        .get_or_init(|| Regex::new(r"RAR\s(\d+)\.(\d+)\s+.*Alexander Roshal").ok())
        .as_ref()
}

/// Extract `(major, minor)` from rar's banner line
pub(crate) fn parse_rar_version(banner: &str) -> Option<(u32, u32)> {
    let caps = rar_banner()?.captures(banner)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_rar_banners() {
        let modern = "\nRAR 5.50   Copyright (c) 1993-2017 Alexander Roshal   11 Aug 2017\nTrial version";
        assert_eq!(parse_rar_version(modern), Some((5, 50)));

        let old = "RAR 3.71   Copyright (c) 1993-2007 Alexander Roshal   20 Sep 2007";
        assert_eq!(parse_rar_version(old), Some((3, 71)));

        assert_eq!(parse_rar_version("UNRAR 5.50 freeware"), None);
        assert_eq!(parse_rar_version(""), None);
    }

    #[test]
    fn minimum_version_comparison_is_lexicographic() {
        assert!((3, 80) >= MIN_RAR_VERSION);
        assert!((4, 0) >= MIN_RAR_VERSION);
        assert!((3, 71) < MIN_RAR_VERSION);
    }

    #[test]
    fn windows_layout_uses_x64_directories() {
        let r64 = ToolResolver::new(Platform::Windows64, "tools");
        assert_eq!(
            r64.bundled_layout(),
            (Some("win/par2/x64/par2.exe"), Some("win/rar/x64/Rar.exe"))
        );

        let r32 = ToolResolver::new(Platform::Windows32, "tools");
        assert_eq!(
            r32.bundled_layout(),
            (Some("win/par2/par2.exe"), Some("win/rar/Rar.exe"))
        );

        let posix = ToolResolver::new(Platform::Posix, "tools");
        assert_eq!(posix.bundled_layout(), (None, None));
    }

    #[test]
    fn macos_par2_flavor_depends_on_version() {
        let cases = [
            (Some((10, 5)), "osx/par2/par2-classic"),
            (Some((10, 6)), "osx/par2/par2-sl"),
            (Some((14, 2)), "osx/par2/par2-sl"),
            (None, "osx/par2/par2-classic"),
        ];
        for (version, expected) in cases {
            let resolver = ToolResolver::new(Platform::MacOs { version }, "tools");
            assert_eq!(resolver.bundled_layout().0, Some(expected), "{version:?}");
        }
    }

    #[cfg(unix)]
    fn make_exe(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn bundled_binary_wins_over_search_path() {
        let root = TempDir::new().unwrap();
        let path_dir = TempDir::new().unwrap();
        make_exe(&root.path().join("osx/par2/par2-sl"), "exit 0");
        make_exe(&root.path().join("osx/rar/rar"), "exit 0");
        make_exe(&path_dir.path().join("par2"), "exit 0");
        make_exe(&path_dir.path().join("rar"), "exit 0");

        let resolver = ToolResolver::new(
            Platform::MacOs {
                version: Some((10, 9)),
            },
            root.path(),
        )
        .with_search_path(Some(path_dir.path().as_os_str().to_owned()));
        let tools = resolver.resolve().await;

        assert_eq!(tools.par2, Some(root.path().join("osx/par2/par2-sl")));
        assert_eq!(tools.rar, Some(root.path().join("osx/rar/rar")));
        assert!(!tools.rar_problem, "version is only checked on POSIX");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_bundled_binary_falls_back_to_search_path() {
        let root = TempDir::new().unwrap();
        let path_dir = TempDir::new().unwrap();
        make_exe(&root.path().join("osx/rar/rar"), "exit 0");
        make_exe(&path_dir.path().join("par2"), "exit 0");

        let resolver = ToolResolver::new(Platform::MacOs { version: None }, root.path())
            .with_search_path(Some(path_dir.path().as_os_str().to_owned()));
        let tools = resolver.resolve().await;

        assert_eq!(tools.par2, Some(path_dir.path().join("par2")));
        assert_eq!(tools.rar, Some(root.path().join("osx/rar/rar")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_executable_bundled_file_is_ignored() {
        let root = TempDir::new().unwrap();
        let rar = root.path().join("osx/rar/rar");
        std::fs::create_dir_all(rar.parent().unwrap()).unwrap();
        std::fs::write(&rar, b"not a program").unwrap();

        let resolver =
            ToolResolver::new(Platform::MacOs { version: None }, root.path()).with_search_path(None);
        assert_eq!(resolver.resolve().await.rar, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn windows32_never_consults_search_path() {
        let root = TempDir::new().unwrap();
        let path_dir = TempDir::new().unwrap();
        make_exe(&path_dir.path().join("par2"), "exit 0");
        make_exe(&path_dir.path().join("rar"), "exit 0");

        let resolver = ToolResolver::new(Platform::Windows32, root.path())
            .with_search_path(Some(path_dir.path().as_os_str().to_owned()));
        let tools = resolver.resolve().await;

        assert_eq!(tools.par2, None);
        assert_eq!(tools.rar, None);
        assert!(!tools.rar_problem);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn posix_accepts_recent_rar() {
        let path_dir = TempDir::new().unwrap();
        make_exe(
            &path_dir.path().join("rar"),
            "echo 'RAR 5.50   Copyright (c) 1993-2017 Alexander Roshal   11 Aug 2017'",
        );
        make_exe(&path_dir.path().join("par2"), "exit 0");

        let resolver = ToolResolver::new(Platform::Posix, path_dir.path())
            .with_search_path(Some(path_dir.path().as_os_str().to_owned()));
        let tools = resolver.resolve().await;

        assert_eq!(tools.rar, Some(path_dir.path().join("rar")));
        assert_eq!(tools.par2, Some(path_dir.path().join("par2")));
        assert!(!tools.rar_problem);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn posix_flags_old_rar() {
        let path_dir = TempDir::new().unwrap();
        make_exe(
            &path_dir.path().join("rar"),
            "echo 'RAR 3.71   Copyright (c) 1993-2007 Alexander Roshal   20 Sep 2007'",
        );

        let resolver = ToolResolver::new(Platform::Posix, path_dir.path())
            .with_search_path(Some(path_dir.path().as_os_str().to_owned()));
        assert!(resolver.resolve().await.rar_problem);
    }

    #[tokio::test]
    async fn posix_without_rar_is_a_problem() {
        let root = TempDir::new().unwrap();
        let resolver = ToolResolver::new(Platform::Posix, root.path()).with_search_path(None);
        let tools = resolver.resolve().await;

        assert_eq!(tools.rar, None);
        assert!(tools.rar_problem);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn configured_path_takes_precedence() {
        let root = TempDir::new().unwrap();
        let custom = TempDir::new().unwrap();
        make_exe(&root.path().join("osx/par2/par2-classic"), "exit 0");
        make_exe(&custom.path().join("my-par2"), "exit 0");

        let config = ToolsConfig {
            tools_root: root.path().to_path_buf(),
            par2_path: Some(custom.path().join("my-par2")),
            search_path: false,
            ..Default::default()
        };
        let resolver = ToolResolver::from_config(Platform::MacOs { version: None }, &config);

        assert_eq!(
            resolver.resolve().await.par2,
            Some(custom.path().join("my-par2"))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn resolution_is_cached() {
        let root = TempDir::new().unwrap();
        make_exe(&root.path().join("osx/rar/rar"), "exit 0");

        let resolver =
            ToolResolver::new(Platform::MacOs { version: None }, root.path()).with_search_path(None);
        let first = resolver.resolve().await.clone();

        std::fs::remove_file(root.path().join("osx/rar/rar")).unwrap();
        let second = resolver.resolve().await;

        assert_eq!(&first, second);
        assert!(second.rar.is_some());
    }
}
