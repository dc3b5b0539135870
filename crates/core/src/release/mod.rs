//! Release data model shared by both pipeline stages.
//!
//! A [`Release`] is created once by the Discogs fetcher and is immutable
//! afterwards: the text exporter and the video generator only read it.
//! The second pipeline stage (selector + publisher) never sees these
//! types at all; it works from the output folder on disk.

mod types;

pub use types::{
    sanitize_file_name, CoverArt, PriceSummary, Release, Track, COVER_FILE_NAME, METADATA_FILE_NAME,
};
