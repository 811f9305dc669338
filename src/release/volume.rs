//! Archive volume sizing

use crate::error::Result;
use std::path::PathBuf;

/// Volume sizes rar is asked for, in megabytes
pub const VOLUME_SIZES_MB: [u64; 4] = [15, 20, 50, 100];

/// Number of volumes a release should roughly be split into
pub const TARGET_VOLUME_COUNT: u64 = 30;

/// Pick the volume size (MB) closest to splitting `total_bytes` into
/// [`TARGET_VOLUME_COUNT`] parts
///
/// Sizes are whole megabytes throughout. Ties go to the smaller candidate.
///
/// ```
/// use liftcup::release::volume_size_for;
///
/// // 1 GiB / 30 ≈ 34 MB, closest candidate is 20
/// assert_eq!(volume_size_for(1024 * 1024 * 1024), 20);
/// ```
pub fn volume_size_for(total_bytes: u64) -> u64 {
    let ideal = total_bytes / 1024 / 1024 / TARGET_VOLUME_COUNT;

    VOLUME_SIZES_MB
        .iter()
        .map(|&candidate| (ideal.abs_diff(candidate), candidate))
        .min()
        .map_or(VOLUME_SIZES_MB[0], |(_, candidate)| candidate)
}

/// Sum of the sizes of `files`
pub(crate) async fn total_size(files: &[PathBuf]) -> Result<u64> {
    let mut total = 0;
    for file in files {
        total += tokio::fs::metadata(file).await?.len();
    }
    Ok(total)
}
