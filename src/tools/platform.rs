//! Host platform detection

use tokio::process::Command;
use tracing::debug;

/// Operating system family the bundled tool layout depends on
///
/// Detected once with [`Platform::detect`] and then passed around by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// 32-bit Windows
    Windows32,
    /// 64-bit Windows
    Windows64,
    /// macOS, with `(major, minor)` product version when known
    MacOs {
        /// Product version reported by `sw_vers`
        version: Option<(u32, u32)>,
    },
    /// Any other POSIX system (Linux, BSD)
    Posix,
}

impl Platform {
    /// Detect the platform this process runs on
    pub async fn detect() -> Self {
        let platform = if cfg!(windows) {
            if windows_is_64bit() {
                Platform::Windows64
            } else {
                Platform::Windows32
            }
        } else if cfg!(target_os = "macos") {
            Platform::MacOs {
                version: macos_version().await,
            }
        } else {
            Platform::Posix
        };

        debug!(?platform, "detected platform");
        platform
    }

    /// Whether this is either Windows flavor
    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows32 | Platform::Windows64)
    }
}

/// A 32-bit build can still run on 64-bit Windows, so the environment has the last word.
fn windows_is_64bit() -> bool {
    if cfg!(target_pointer_width = "64") {
        return true;
    }
    ["PROCESSOR_ARCHITEW6432", "PROCESSOR_ARCHITECTURE"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .any(|arch| arch.eq_ignore_ascii_case("AMD64"))
}

async fn macos_version() -> Option<(u32, u32)> {
    let output = Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .await
        .ok()?;
    parse_product_version(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `sw_vers -productVersion` output such as `10.6.8` or `14.2`
pub(crate) fn parse_product_version(raw: &str) -> Option<(u32, u32)> {
    let mut parts = raw.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(minor) => minor.parse().ok()?,
        None => 0,
    };
    Some((major, minor))
}
