//! Types for the release data model.

use serde::{Deserialize, Serialize};

/// Fixed name of the metadata text file inside a release folder.
pub const METADATA_FILE_NAME: &str = "release.txt";

/// Fixed name of the cover art image inside a release folder.
pub const COVER_FILE_NAME: &str = "cover.jpg";

/// A Discogs release with everything the pipeline needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    /// Discogs release id.
    pub id: u64,
    /// Release title.
    pub title: String,
    /// Release artists (may be empty for compilations credited oddly).
    #[serde(default)]
    pub artists: Vec<String>,
    /// Release year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Release country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Label names.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Tracks in tracklist order.
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Cover images, best first.
    #[serde(default)]
    pub images: Vec<CoverArt>,
    /// Marketplace price summary, if any endpoint returned data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<PriceSummary>,
}

impl Release {
    /// Combined artist line ("Artist A, Artist B").
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }

    /// Folder name for this release under the output root.
    pub fn folder_name(&self) -> String {
        let name = sanitize_file_name(&self.title);
        if name.is_empty() {
            format!("release-{}", self.id)
        } else {
            name
        }
    }

    /// The primary cover image, if the release has any.
    pub fn primary_image(&self) -> Option<&CoverArt> {
        self.images.first()
    }
}

/// One audio item within a release's tracklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// 1-based ordinal within the tracklist.
    pub position: u32,
    /// Raw Discogs position label ("A1", "B2", ...), when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_position: Option<String>,
    /// Track title.
    pub title: String,
    /// Duration as printed on the release ("4:32"), when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Track-specific artists, when they differ from the release credit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artists: Option<Vec<String>>,
}

impl Track {
    /// Output video file name for this track ("track-03.mp4").
    pub fn video_file_name(&self) -> String {
        format!("track-{:02}.mp4", self.position)
    }

    /// Search query used to resolve an audio source for this track.
    pub fn search_query(&self, release: &Release) -> String {
        let credit = match &self.artists {
            Some(artists) if !artists.is_empty() => artists.join(", "),
            _ => release.artist_line(),
        };
        if credit.is_empty() {
            format!("{} {}", release.title, self.title)
        } else {
            format!("{} {} {}", credit, release.title, self.title)
        }
    }
}

/// A cover image pair as exposed by Discogs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverArt {
    /// Full-resolution image URL.
    pub uri: String,
    /// 150px thumbnail URL, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Marketplace price observations, low to high.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSummary {
    /// Currency code the observations are denominated in.
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl PriceSummary {
    /// Whether any observation is present.
    pub fn has_data(&self) -> bool {
        self.min.is_some() || self.median.is_some() || self.max.is_some()
    }

    /// Short "median CUR" line used in captions and file names.
    pub fn headline(&self) -> Option<String> {
        self.median.map(|m| format!("{} {}", m, self.currency))
    }
}

/// Replaces characters that are unsafe in file names with underscores.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => out.push('_'),
            c if c.is_control() => out.push('_'),
            c => out.push(c),
        }
    }
    out.trim().trim_end_matches('.').to_string()
}
