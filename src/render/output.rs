//! Rendered-output discovery.
//!
//! Each render attempt gets its own media directory keyed by the entry point
//! identifier and the attempt number, so the newest-file tie-break can never
//! pick up output from an earlier attempt or a concurrent request.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Media directory for one render attempt, relative to the working directory.
pub fn attempt_media_dir(workdir: &Path, entry_point_id: &str, attempt: u32) -> PathBuf {
    workdir
        .join("media")
        .join(format!("{}_attempt{}", entry_point_id, attempt))
}

/// Find the most recently created video produced into `media_dir`.
///
/// Manim nests its output as `videos/<file stem>/<quality>/<name>.mp4`; the
/// file stem equals the entry point identifier because the source file is
/// named after it.
pub fn locate_video(media_dir: &Path, entry_point_id: &str, quality_dir: &str) -> Option<PathBuf> {
    let pattern = media_dir
        .join("videos")
        .join(entry_point_id)
        .join(quality_dir)
        .join("*.mp4");

    let paths = glob::glob(&pattern.to_string_lossy()).ok()?;

    paths
        .flatten()
        .max_by_key(|path| file_created(path))
        .map(|path| path.canonicalize().unwrap_or(path))
}

fn file_created(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.created().or_else(|_| m.modified()))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
