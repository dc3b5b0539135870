//! Release selector: finds output folders that are ready to publish.
//!
//! A folder is eligible when it carries the metadata text file and at
//! least one generated video. The scan never mutates anything; the
//! folder tree is the only interface between the two pipeline stages.

use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tokio::fs;
use tracing::debug;

use crate::release::METADATA_FILE_NAME;

static VIDEO_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^track-\d+\.mp4$").unwrap());

/// A release folder eligible for publishing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseFolder {
    /// Folder path.
    pub path: PathBuf,
    /// Folder name (the sanitized release title).
    pub name: String,
    /// Metadata text file path.
    pub metadata_path: PathBuf,
    /// Generated videos in track-position order.
    pub videos: Vec<PathBuf>,
}

impl ReleaseFolder {
    /// Post caption: the metadata file contents.
    pub async fn caption(&self) -> io::Result<String> {
        fs::read_to_string(&self.metadata_path).await
    }
}

/// Scans the output root and returns eligible folders, sorted by name.
///
/// A missing output root yields an empty list rather than an error; the
/// generator stage simply has not run yet.
pub async fn scan(output_root: &Path) -> io::Result<Vec<ReleaseFolder>> {
    if !output_root.exists() {
        return Ok(Vec::new());
    }

    let mut folders = Vec::new();
    let mut entries = fs::read_dir(output_root).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        if let Some(folder) = inspect_folder(&entry.path()).await? {
            folders.push(folder);
        } else {
            debug!(path = %entry.path().display(), "folder not eligible");
        }
    }

    folders.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(folders)
}

/// Checks one folder for completeness.
async fn inspect_folder(path: &Path) -> io::Result<Option<ReleaseFolder>> {
    let metadata_path = path.join(METADATA_FILE_NAME);
    if !metadata_path.exists() {
        return Ok(None);
    }

    let mut videos = Vec::new();
    let mut entries = fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if VIDEO_FILE.is_match(&name) {
            videos.push(entry.path());
        }
    }

    if videos.is_empty() {
        return Ok(None);
    }

    // Zero-padded names make lexical order the track order.
    videos.sort();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(Some(ReleaseFolder {
        path: path.to_path_buf(),
        name,
        metadata_path,
        videos,
    }))
}
