//! Text exporter: renders a release to the fixed-layout metadata file.
//!
//! Rendering is a pure function of the release record, so the same
//! release always produces byte-identical output. The file doubles as
//! the post caption at publish time, which is why the layout is meant
//! to be read by humans.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::release::{Release, METADATA_FILE_NAME};

/// Renders the metadata text for a release.
pub fn render_release_text(release: &Release) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("Release: {}", release.title));
    if !release.artists.is_empty() {
        lines.push(format!("Artist(s): {}", release.artist_line()));
    }
    if let Some(year) = release.year {
        lines.push(format!("Year: {}", year));
    }
    if let Some(country) = &release.country {
        lines.push(format!("Country: {}", country));
    }
    if !release.labels.is_empty() {
        lines.push(format!("Label(s): {}", release.labels.join(", ")));
    }

    lines.push(String::new());
    lines.push("Prices (Discogs Marketplace):".to_string());
    match &release.prices {
        Some(prices) if prices.has_data() => {
            lines.push(format!(
                "  Low: {} {}",
                format_price(prices.min),
                prices.currency
            ));
            lines.push(format!(
                "  Median: {} {}",
                format_price(prices.median),
                prices.currency
            ));
            lines.push(format!(
                "  High: {} {}",
                format_price(prices.max),
                prices.currency
            ));
        }
        _ => lines.push("  Not available".to_string()),
    }

    lines.push(String::new());
    lines.push("Tracklist:".to_string());
    for track in &release.tracks {
        let position = track
            .side_position
            .clone()
            .unwrap_or_else(|| track.position.to_string());
        let duration = track
            .duration
            .as_ref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        lines.push(format!("{} - {}{}", position, track.title, duration));
    }

    lines.join("\n") + "\n"
}

fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Writes the metadata file into the release folder, creating the folder
/// if needed. Returns the path of the written file.
pub async fn write_release_text(folder: &Path, release: &Release) -> std::io::Result<PathBuf> {
    fs::create_dir_all(folder).await?;
    let path = folder.join(METADATA_FILE_NAME);
    fs::write(&path, render_release_text(release)).await?;
    info!(path = %path.display(), "wrote release metadata");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{PriceSummary, Track};

    fn sample_release() -> Release {
        Release {
            id: 1,
            title: "Night Moves".to_string(),
            artists: vec!["The Example".to_string()],
            year: Some(1983),
            country: Some("DE".to_string()),
            labels: vec!["Night Records".to_string()],
            tracks: vec![
                Track {
                    position: 1,
                    side_position: Some("A1".to_string()),
                    title: "Opening".to_string(),
                    duration: Some("4:02".to_string()),
                    artists: None,
                },
                Track {
                    position: 2,
                    side_position: None,
                    title: "Closing".to_string(),
                    duration: None,
                    artists: None,
                },
            ],
            images: vec![],
            prices: Some(PriceSummary {
                currency: "USD".to_string(),
                min: Some(5.0),
                median: Some(12.5),
                max: None,
            }),
        }
    }

    #[test]
    fn test_render_layout() {
        let text = render_release_text(&sample_release());
        let expected = "\
Release: Night Moves
Artist(s): The Example
Year: 1983
Country: DE
Label(s): Night Records

Prices (Discogs Marketplace):
  Low: 5.00 USD
  Median: 12.50 USD
  High: - USD

Tracklist:
A1 - Opening (4:02)
2 - Closing
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let release = sample_release();
        assert_eq!(render_release_text(&release), render_release_text(&release));
    }

    #[test]
    fn test_render_without_prices() {
        let mut release = sample_release();
        release.prices = None;
        let text = render_release_text(&release);
        assert!(text.contains("  Not available\n"));
        assert!(!text.contains("Median:"));
    }

    #[tokio::test]
    async fn test_write_creates_folder_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Night Moves");
        let release = sample_release();

        let path = write_release_text(&folder, &release).await.unwrap();
        assert_eq!(path.file_name().unwrap(), METADATA_FILE_NAME);

        let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(on_disk, render_release_text(&release));
    }
}
