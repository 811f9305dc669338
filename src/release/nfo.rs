//! Info file written alongside the archive volumes

use crate::error::Result;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Last line of every generated info file
pub const VERSION_MARKER: &str = concat!("Lift Cup ", env!("CARGO_PKG_VERSION"));

/// Write the release info file at `nfo_path`
///
/// If `source_nfo` exists it is copied first so its content is kept, then the
/// original name, the optional annotation and [`VERSION_MARKER`] are appended.
/// Returns whether an existing info file was reused.
pub(crate) async fn write_nfo(
    source_nfo: &Path,
    nfo_path: &Path,
    original_name: &str,
    annotation: Option<&str>,
) -> Result<bool> {
    let reused = fs::metadata(source_nfo)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if reused {
        info!(?source_nfo, "existing .nfo found, using it as a base");
        fs::copy(source_nfo, nfo_path).await?;
    }

    debug!(?nfo_path, "writing .nfo");
    let mut nfo = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(nfo_path)
        .await?;

    let mut lines = format!("Original name: {original_name}\n");
    if let Some(annotation) = annotation.filter(|a| !a.is_empty()) {
        lines.push_str(annotation);
        lines.push('\n');
    }
    lines.push_str(VERSION_MARKER);
    lines.push('\n');

    nfo.write_all(lines.as_bytes()).await?;
    nfo.flush().await?;
    Ok(reused)
}
