//! Cleanup stage for removing the staged copy and generated files

use super::ReleaseBundle;
use tokio::fs;
use tracing::{debug, info, warn};

/// Remove the staged source copy, the info file and the release directory
///
/// Errors are logged as warnings and do not abort the cleanup. Returns
/// whether everything that existed was removed.
pub(crate) async fn run_cleanup_stage(bundle: &ReleaseBundle) -> bool {
    info!(release = bundle.base_name(), "starting post-upload cleanup");

    let mut clean = true;

    for file in [bundle.staged_file(), bundle.nfo_path()] {
        match fs::remove_file(&file).await {
            Ok(()) => debug!(?file, "deleted file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(?file, error = %e, "failed to delete file");
                clean = false;
            }
        }
    }

    let release_dir = bundle.release_dir();
    let is_dir = fs::metadata(&release_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if is_dir {
        match fs::remove_dir_all(&release_dir).await {
            Ok(()) => debug!(?release_dir, "deleted release directory"),
            Err(e) => {
                warn!(?release_dir, error = %e, "failed to delete release directory");
                clean = false;
            }
        }
    }

    info!(release = bundle.base_name(), clean, "cleanup complete");
    clean
}
