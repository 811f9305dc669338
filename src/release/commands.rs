//! Argument lists for rar, par2 and the uploader

use crate::error::{ReleaseError, Result};
use crate::tools::ToolCommand;
use std::ffi::OsString;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

/// par2 redundancy percentage
const PAR2_REDUNDANCY: u32 = 10;
/// Number of par2 recovery files
const PAR2_RECOVERY_FILES: u32 = 7;

/// `rar a <abs base> <relative files...> -v<size>m -m0`, run from the files' common root
pub(crate) fn archive_command(
    rar: &Path,
    archive_base: &Path,
    files: &[PathBuf],
    volume_mb: u64,
) -> Result<ToolCommand> {
    let root = common_root(files).ok_or_else(|| ReleaseError::InvalidPath {
        path: archive_base.to_path_buf(),
        reason: "no input files share a parent directory".into(),
    })?;

    let relative: Vec<PathBuf> = files
        .iter()
        .filter_map(|f| f.strip_prefix(&root).ok().map(Path::to_path_buf))
        .collect();

    let base = std::path::absolute(archive_base).unwrap_or_else(|_| archive_base.to_path_buf());

    Ok(ToolCommand::new(rar)
        .arg("a")
        .arg(base)
        .args(relative)
        .arg(format!("-v{volume_mb}m"))
        .arg("-m0")
        .current_dir(root))
}

/// `par2 c -r10 -n7 <base> <volumes...> <base>.nfo`
pub(crate) fn parity_command(
    par2: &Path,
    archive_base: &Path,
    volumes: &[PathBuf],
    nfo: &Path,
) -> ToolCommand {
    ToolCommand::new(par2)
        .arg("c")
        .arg(format!("-r{PAR2_REDUNDANCY}"))
        .arg(format!("-n{PAR2_RECOVERY_FILES}"))
        .arg(archive_base)
        .args(volumes.iter().cloned())
        .arg(nfo)
}

/// `<uploader> -c <config> <release dir>/`
pub(crate) fn upload_command(poster: &Path, poster_config: &Path, release_dir: &Path) -> ToolCommand {
    let mut dir: OsString = release_dir.as_os_str().to_owned();
    dir.push(MAIN_SEPARATOR_STR);

    ToolCommand::new(poster).arg("-c").arg(poster_config).arg(dir)
}

/// Volumes rar produced for `base_name` in `release_dir` (`<base_name>*.rar`), sorted
pub(crate) async fn list_volumes(release_dir: &Path, base_name: &str) -> Result<Vec<PathBuf>> {
    let mut volumes = Vec::new();
    let mut entries = tokio::fs::read_dir(release_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(base_name) && name.ends_with(".rar") {
            volumes.push(entry.path());
        }
    }

    volumes.sort();
    Ok(volumes)
}

/// Deepest directory containing every file
fn common_root(files: &[PathBuf]) -> Option<PathBuf> {
    let mut root = files.first()?.parent()?.to_path_buf();
    for file in &files[1..] {
        while !file.starts_with(&root) {
            if !root.pop() {
                return None;
            }
        }
    }
    Some(root)
}
