//! Cover art download.
//!
//! Discogs image URLs require the same User-Agent discipline as the API
//! and are picky about referers; when the full-size image is refused the
//! 150px thumbnail is still good enough to carry a clip.

use std::path::Path;

use reqwest::Client;
use tracing::warn;

use crate::release::CoverArt;

/// Downloads the cover into `dest`. Tries the full-size URL first and
/// falls back to the thumbnail. Returns an operator-readable reason on
/// failure.
pub(super) async fn download_cover(
    client: &Client,
    art: &CoverArt,
    dest: &Path,
) -> Result<(), String> {
    match fetch_image(client, &art.uri, dest).await {
        Ok(()) => return Ok(()),
        Err(e) => warn!(url = %art.uri, error = %e, "full-size cover download failed"),
    }

    if let Some(thumbnail) = &art.thumbnail {
        match fetch_image(client, thumbnail, dest).await {
            Ok(()) => return Ok(()),
            Err(e) => warn!(url = %thumbnail, error = %e, "thumbnail download failed"),
        }
    }

    Err(format!("cover not downloadable from {}", art.uri))
}

async fn fetch_image(client: &Client, url: &str, dest: &Path) -> Result<(), String> {
    let response = client
        .get(url)
        .header(reqwest::header::REFERER, "https://www.discogs.com/")
        .header(reqwest::header::ACCEPT, "image/*,*/*;q=0.8")
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;

    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| e.to_string())
}
