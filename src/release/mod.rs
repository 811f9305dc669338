//! Release post-processing pipeline
//!
//! Turns one finished media file into an uploadable release bundle:
//! 1. Quality gate - skip episodes the host could not classify
//! 2. Stage - copy the file into the work directory (never overwrite)
//! 3. Archive - split into rar volumes sized for ~30 parts
//! 4. Info file - reuse the source .nfo if present, append release info
//! 5. Parity - 10% par2 recovery data in 7 files
//! 6. Upload - hand the release directory to the external uploader
//! 7. Cleanup - remove the staged copy and generated files
//!
//! Nothing is retried and nothing is rolled back: a failing stage leaves the
//! artifacts of earlier stages on disk.

use crate::config::{Config, ReleaseConfig, UploadConfig};
use crate::error::{Error, ReleaseError, Result};
use crate::tools::{CommandOutput, CommandRunner, DryRunRunner, ProcessRunner, ToolResolver};
use crate::types::Quality;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, info, warn};

mod bundle;
mod cleanup;
mod commands;
mod nfo;
mod volume;


pub use bundle::ReleaseBundle;
pub use nfo::VERSION_MARKER;
pub use volume::{TARGET_VOLUME_COUNT, VOLUME_SIZES_MB, volume_size_for};

use cleanup::run_cleanup_stage;
use commands::{archive_command, list_volumes, parity_command, upload_command};
use nfo::write_nfo;
use volume::total_size;

/// Why a run stopped before doing any work it could not take back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Quality is unknown and the quality check is not bypassed
    UnknownQuality,
    /// A required external tool is missing or unusable
    ToolUnavailable {
        /// Tool name ("rar" or "par2")
        tool: &'static str,
    },
    /// The work directory already holds a file with this name
    AlreadyStaged {
        /// The existing staged file
        path: PathBuf,
    },
}

/// Result of a pipeline run that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Every enabled stage ran
    Completed {
        /// Directory holding the volumes and parity set
        release_dir: PathBuf,
        /// Volume size rar was asked for, in MB
        volume_size_mb: u64,
        /// Whether the uploader ran
        uploaded: bool,
        /// Whether staged and generated files were removed
        cleaned_up: bool,
    },
    /// A precondition was not met; see [`SkipReason`]
    Skipped(SkipReason),
}

/// Release post-processing pipeline executor
///
/// # Examples
///
/// ```no_run
/// use liftcup::{Config, Quality, ReleasePipeline};
/// use liftcup::tools::{Platform, ToolResolver};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> liftcup::Result<()> {
/// let config = Config::default();
/// let resolver = Arc::new(ToolResolver::from_config(Platform::detect().await, &config.tools));
/// let pipeline = ReleasePipeline::new(&config, resolver);
///
/// let outcome = pipeline
///     .run(Path::new("/tv/Show/Show.S01E01.mkv"), Quality::HdTv)
///     .await?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
pub struct ReleasePipeline {
    config: ReleaseConfig,
    upload: UploadConfig,
    resolver: Arc<ToolResolver>,
    runner: Arc<dyn CommandRunner>,
}

impl ReleasePipeline {
    /// Create a pipeline; commands are only logged when `release.test_mode` is set
    pub fn new(config: &Config, resolver: Arc<ToolResolver>) -> Self {
        let runner: Arc<dyn CommandRunner> = if config.release.test_mode {
            Arc::new(DryRunRunner)
        } else {
            Arc::new(ProcessRunner)
        };

        Self {
            config: config.release.clone(),
            upload: config.upload.clone(),
            resolver,
            runner,
        }
    }

    /// Replace the command runner
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Run the pipeline for `source`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Release`] when rar, par2 or the uploader fail, and
    /// [`Error::Io`] for file system failures. Unmet preconditions are not
    /// errors; they yield [`ReleaseOutcome::Skipped`].
    pub async fn run(&self, source: &Path, quality: Quality) -> Result<ReleaseOutcome> {
        info!(?source, ?quality, "starting release post-processing");

        let result = self.process(source, quality).await;
        match &result {
            Ok(ReleaseOutcome::Completed { release_dir, .. }) => {
                info!(?release_dir, "release post-processing completed");
            }
            Ok(ReleaseOutcome::Skipped(reason)) => {
                info!(?source, ?reason, "release post-processing skipped");
            }
            Err(e) => {
                error!(?source, error = %e, "release post-processing failed");
            }
        }
        result
    }

    async fn process(&self, source: &Path, quality: Quality) -> Result<ReleaseOutcome> {
        if self.config.debug {
            info!(
                ?source,
                ?quality,
                config = ?self.config,
                upload = ?self.upload,
                runner = self.runner.name(),
                "release run parameters"
            );
        }

        if quality.is_unknown() && !self.config.skip_quality_check {
            warn!("quality for show is unknown, aborting");
            return Ok(ReleaseOutcome::Skipped(SkipReason::UnknownQuality));
        }

        let bundle = ReleaseBundle::for_source(&self.config.work_dir, source)?;
        fs::create_dir_all(&self.config.work_dir).await?;

        let tools = self.resolver.resolve().await;
        if tools.rar_problem {
            warn!("rar problem detected, is rar installed?");
            return Ok(ReleaseOutcome::Skipped(SkipReason::ToolUnavailable { tool: "rar" }));
        }

        let staged = bundle.staged_file();
        if fs::metadata(&staged).await.is_ok_and(|m| m.is_file()) {
            info!(?staged, "file already exists, skipping this release");
            return Ok(ReleaseOutcome::Skipped(SkipReason::AlreadyStaged { path: staged }));
        }
        info!(?source, ?staged, "staging source file");
        fs::copy(source, &staged).await?;

        // Archive
        let Some(rar) = tools.rar.as_deref() else {
            warn!("no rar binary available");
            return Ok(ReleaseOutcome::Skipped(SkipReason::ToolUnavailable { tool: "rar" }));
        };
        let files = vec![staged];
        let volume_size_mb = volume_size_for(total_size(&files).await?);
        let archive_base = bundle.archive_base();
        fs::create_dir_all(bundle.release_dir()).await?;

        info!(volume_size_mb, ?archive_base, "creating rar set");
        let command = archive_command(rar, &archive_base, &files, volume_size_mb)?;
        let output = self.runner.run(&command).await;
        if let Some(reason) = failure_reason(output) {
            return Err(ReleaseError::ArchiveFailed {
                archive: archive_base,
                reason,
            }
            .into());
        }

        // Info file
        let nfo_path = bundle.nfo_path();
        info!(?nfo_path, "creating .nfo");
        write_nfo(
            &source.with_extension("nfo"),
            &nfo_path,
            bundle.file_name(),
            self.config.nfo_annotation.as_deref(),
        )
        .await?;

        // Parity
        let Some(par2) = tools.par2.as_deref() else {
            warn!("no par2 binary available");
            return Ok(ReleaseOutcome::Skipped(SkipReason::ToolUnavailable { tool: "par2" }));
        };
        let volumes = list_volumes(&bundle.release_dir(), bundle.base_name()).await?;
        info!(volumes = volumes.len(), ?archive_base, "creating pars for rar set");
        let command = parity_command(par2, &archive_base, &volumes, &nfo_path);
        if let Some(reason) = failure_reason(self.runner.run(&command).await) {
            return Err(ReleaseError::ParityFailed {
                archive: archive_base,
                reason,
            }
            .into());
        }

        // Upload; on failure the artifacts stay for inspection or a retry
        let release_dir = bundle.release_dir();
        if self.config.upload {
            self.upload_release(&release_dir).await?;
        }

        let cleaned_up = if self.config.cleanup {
            run_cleanup_stage(&bundle).await
        } else {
            debug!("cleanup disabled, keeping release files");
            false
        };

        Ok(ReleaseOutcome::Completed {
            release_dir,
            volume_size_mb,
            uploaded: self.config.upload,
            cleaned_up,
        })
    }

    async fn upload_release(&self, release_dir: &Path) -> Result<()> {
        info!(?release_dir, "uploading release");

        let upload_failed = |reason: String| -> Error {
            ReleaseError::UploadFailed {
                release_dir: release_dir.to_path_buf(),
                reason,
            }
            .into()
        };

        if self.resolver.platform().is_windows() {
            return Err(upload_failed("upload is not supported on Windows".into()));
        }

        let (Some(poster), Some(poster_config)) =
            (&self.upload.poster_path, &self.upload.poster_config)
        else {
            return Err(Error::Config {
                message: "upload is enabled but the uploader is not configured".into(),
                key: Some("upload.poster_path".into()),
            });
        };

        let command = upload_command(poster, poster_config, release_dir);
        match failure_reason(self.runner.run(&command).await) {
            Some(reason) => Err(upload_failed(reason)),
            None => Ok(()),
        }
    }
}

/// `None` when the command ran and exited 0, otherwise why it did not
fn failure_reason(output: Result<CommandOutput>) -> Option<String> {
    match output {
        Ok(out) if out.success => None,
        Ok(out) => {
            let code = out
                .exit_code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let tail = out.output.lines().last().unwrap_or_default().trim();
            Some(format!("exited with {code}: {tail}"))
        }
        Err(e) => Some(e.to_string()),
    }
}
