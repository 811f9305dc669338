//! Paths making up one release bundle

use crate::error::{ReleaseError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Work directory plus base name, from which every bundle path is derived
///
/// For a source `/tv/Show.S01E01.mkv` and work directory `/work`:
///
/// | path | value |
/// |---|---|
/// | staged file | `/work/Show.S01E01.mkv` |
/// | release dir | `/work/Show.S01E01/` |
/// | archive base | `/work/Show.S01E01/Show.S01E01` |
/// | info file | `/work/Show.S01E01/Show.S01E01.nfo` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBundle {
    work_dir: PathBuf,
    file_name: String,
    base_name: String,
}

impl ReleaseBundle {
    /// Derive the bundle for `source` inside `work_dir`
    pub fn for_source(work_dir: &Path, source: &Path) -> Result<Self> {
        let invalid = |reason: &str| ReleaseError::InvalidPath {
            path: source.to_path_buf(),
            reason: reason.to_string(),
        };

        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| invalid("no UTF-8 file name"))?;
        let base_name = source
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("no usable file stem"))?;

        Ok(Self {
            work_dir: work_dir.to_path_buf(),
            file_name: file_name.to_string(),
            base_name: base_name.to_string(),
        })
    }

    /// Original file name, extension included
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without extension
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Where the source is copied before archiving
    pub fn staged_file(&self) -> PathBuf {
        self.work_dir.join(&self.file_name)
    }

    /// Directory holding volumes, info file and parity set
    pub fn release_dir(&self) -> PathBuf {
        self.work_dir.join(&self.base_name)
    }

    /// Path + base name handed to rar and par2
    pub fn archive_base(&self) -> PathBuf {
        self.release_dir().join(&self.base_name)
    }

    /// Generated info file
    pub fn nfo_path(&self) -> PathBuf {
        // Appended rather than set: base names routinely contain dots
        let mut path: OsString = self.archive_base().into_os_string();
        path.push(".nfo");
        PathBuf::from(path)
    }
}
