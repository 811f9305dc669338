//! # liftcup
//!
//! Post-processing companion for a TV library manager: repackages finished
//! episodes as Usenet release bundles and keeps MediaBrowser servers informed.
//!
//! ## Components
//!
//! - **Release pipeline** ([`ReleasePipeline`]) - stages a downloaded file,
//!   splits it into rar volumes, writes an info file, creates par2 recovery
//!   data, optionally hands the result to an uploader, then cleans up
//! - **Notifier** ([`MediaBrowserNotifier`]) - admin notifications, series
//!   library refreshes and UDP server discovery
//!
//! Both are invoked directly by the host application and share nothing but
//! configuration. External tools are located once by a [`tools::ToolResolver`]
//! and executed through a [`tools::CommandRunner`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use liftcup::tools::{Platform, ToolResolver};
//! use liftcup::{Config, MediaBrowserNotifier, Quality, ReleaseOutcome, ReleasePipeline};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_json_file(Path::new("liftcup.json"))?;
//!
//!     let resolver = Arc::new(ToolResolver::from_config(Platform::detect().await, &config.tools));
//!     let pipeline = ReleasePipeline::new(&config, resolver);
//!     let outcome = pipeline
//!         .run(Path::new("/tv/Show/Season 1/Show.S01E01.mkv"), Quality::HdTv)
//!         .await?;
//!
//!     if let ReleaseOutcome::Completed { .. } = outcome {
//!         let notifier = MediaBrowserNotifier::new(config.media_browser.clone())?;
//!         notifier.notify_download("Show - 1x01 - Pilot").await;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// MediaBrowser notifier
pub mod notify;
/// Release post-processing pipeline
pub mod release;
/// External tool discovery and execution
pub mod tools;
/// Core shared types
pub mod types;

// Re-export commonly used types
pub use config::{Config, MediaBrowserConfig, ReleaseConfig, ToolsConfig, UploadConfig};
pub use error::{Error, ReleaseError, Result};
pub use notify::{HostOverrides, LibraryTarget, MediaBrowserNotifier, NotifyEvent};
pub use release::{ReleaseBundle, ReleaseOutcome, ReleasePipeline, SkipReason};
pub use types::{EpisodeRef, HostResult, Quality, ShowRef};
