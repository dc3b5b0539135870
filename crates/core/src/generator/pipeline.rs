//! Generator pipeline implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::{GeneratorConfig, ShortSourcePolicy};
use crate::exporter;
use crate::fetcher::AudioFetcher;
use crate::release::{Release, Track, COVER_FILE_NAME, METADATA_FILE_NAME};
use crate::transcoder::{ClipJob, Transcoder};

use super::cover::download_cover;
use super::types::{
    GenerationReport, GeneratorError, TrackFailure, TrackOutcome, TrackRecord,
};

/// Name of the per-release audio cache directory.
const AUDIO_CACHE_DIR: &str = "audio";

/// Drives metadata export, cover download and per-track clip rendering
/// for one release at a time.
pub struct VideoGenerator<T: Transcoder, F: AudioFetcher> {
    config: GeneratorConfig,
    transcoder: T,
    fetcher: F,
    http: Client,
}

impl<T: Transcoder, F: AudioFetcher> VideoGenerator<T, F> {
    /// Creates a new generator. `user_agent` is used for image downloads.
    pub fn new(
        config: GeneratorConfig,
        transcoder: T,
        fetcher: F,
        user_agent: &str,
    ) -> Result<Self, GeneratorError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            config,
            transcoder,
            fetcher,
            http,
        })
    }

    /// Runs the full generation flow for a release under `output_root`.
    ///
    /// The metadata file is written (if missing) before anything that can
    /// fail per-track, so a cover or audio problem still leaves a useful
    /// folder behind.
    pub async fn run(
        &self,
        release: &Release,
        output_root: &Path,
    ) -> Result<GenerationReport, GeneratorError> {
        let folder = output_root.join(release.folder_name());
        tokio::fs::create_dir_all(&folder).await?;
        info!(release = %release.title, folder = %folder.display(), "generating release");

        let metadata_path = folder.join(METADATA_FILE_NAME);
        if !metadata_path.exists() {
            exporter::write_release_text(&folder, release).await?;
        }

        let mut report = GenerationReport {
            release_title: release.title.clone(),
            folder: folder.clone(),
            started_at: Utc::now(),
            metadata_path,
            cover_path: None,
            cover_error: None,
            tracks: Vec::new(),
        };

        let cover_path = match self.ensure_cover(release, &folder).await {
            Ok(path) => {
                report.cover_path = Some(path.clone());
                path
            }
            Err(reason) => {
                // Without a cover there is no overlay source; the text
                // export above still stands.
                warn!(release = %release.title, reason = %reason, "no cover art, skipping videos");
                report.cover_error = Some(reason);
                return Ok(report);
            }
        };

        for track in &release.tracks {
            let outcome = self.process_track(release, track, &folder, &cover_path).await;
            if let TrackOutcome::Failed { failure } = &outcome {
                warn!(
                    position = track.position,
                    title = %track.title,
                    error = %failure,
                    "track failed"
                );
            }
            report.tracks.push(TrackRecord {
                position: track.position,
                title: track.title.clone(),
                outcome,
            });
        }

        info!(
            release = %release.title,
            generated = report.generated(),
            already_present = report.already_present(),
            failed = report.failed(),
            "generation finished"
        );
        Ok(report)
    }

    /// Returns the cover path, downloading it when missing.
    async fn ensure_cover(&self, release: &Release, folder: &Path) -> Result<PathBuf, String> {
        let dest = folder.join(COVER_FILE_NAME);
        if dest.exists() {
            return Ok(dest);
        }
        let art = release
            .primary_image()
            .ok_or_else(|| "release has no images".to_string())?;
        download_cover(&self.http, art, &dest).await?;
        Ok(dest)
    }

    async fn process_track(
        &self,
        release: &Release,
        track: &Track,
        folder: &Path,
        cover_path: &Path,
    ) -> TrackOutcome {
        let output_path = folder.join(track.video_file_name());
        if output_path.exists() {
            // Existing output is the completion marker; re-runs are cheap.
            return TrackOutcome::AlreadyPresent { path: output_path };
        }

        let audio_path = match self.resolve_audio(release, track, folder).await {
            Ok(path) => path,
            Err(e) => {
                return TrackOutcome::Failed {
                    failure: TrackFailure::Resolution(e),
                }
            }
        };

        let (start_secs, duration_secs) = match self.clip_window(&audio_path).await {
            Ok(window) => window,
            Err(failure) => return TrackOutcome::Failed { failure },
        };

        let job = ClipJob {
            audio_path: audio_path.clone(),
            cover_path: cover_path.to_path_buf(),
            output_path: output_path.clone(),
            start_secs,
            duration_secs,
            canvas_px: self.config.canvas_px,
            fps: self.config.fps,
        };

        match self.render_with_retry(job).await {
            Ok(()) => {
                // The cached source has served its purpose.
                if let Err(e) = tokio::fs::remove_file(&audio_path).await {
                    warn!(path = %audio_path.display(), error = %e, "audio cleanup failed");
                }
                TrackOutcome::Generated { path: output_path }
            }
            Err(e) => TrackOutcome::Failed {
                failure: TrackFailure::Transcode(e),
            },
        }
    }

    /// Reuses a cached download when one exists, otherwise asks the
    /// fetcher to resolve the track.
    async fn resolve_audio(
        &self,
        release: &Release,
        track: &Track,
        folder: &Path,
    ) -> Result<PathBuf, crate::fetcher::FetchError> {
        let cache_dir = folder.join(AUDIO_CACHE_DIR);
        let stem = cache_dir.join(format!("track-{:02}", track.position));

        if let Some(cached) = find_cached(&stem).await {
            info!(path = %cached.display(), "using cached audio");
            return Ok(cached);
        }

        let query = track.search_query(release);
        info!(query = %query, "fetching audio");
        self.fetcher.fetch(&query, &stem).await
    }

    /// Applies the shortfall policy and returns the effective window.
    async fn clip_window(&self, audio_path: &Path) -> Result<(u64, u64), TrackFailure> {
        let required = self.config.clip_start_secs + self.config.clip_duration_secs;
        let info = self
            .transcoder
            .probe(audio_path)
            .await
            .map_err(TrackFailure::Probe)?;

        if info.duration_secs >= required as f64 {
            return Ok((self.config.clip_start_secs, self.config.clip_duration_secs));
        }

        match self.config.short_source_policy {
            ShortSourcePolicy::Reject => Err(TrackFailure::SourceTooShort {
                duration_secs: info.duration_secs,
                required_secs: required,
            }),
            ShortSourcePolicy::FromStart => {
                let available = info.duration_secs.floor() as u64;
                if available == 0 {
                    return Err(TrackFailure::SourceTooShort {
                        duration_secs: info.duration_secs,
                        required_secs: required,
                    });
                }
                warn!(
                    duration_secs = info.duration_secs,
                    "source shorter than clip window, clipping from start"
                );
                Ok((0, self.config.clip_duration_secs.min(available)))
            }
        }
    }

    /// One retry for retryable encode failures, then permanent skip.
    async fn render_with_retry(&self, job: ClipJob) -> Result<(), crate::transcoder::TranscodeError> {
        match self.transcoder.render_clip(job.clone()).await {
            Ok(_) => Ok(()),
            Err(first) if first.is_retryable() => {
                warn!(error = %first, "transcode failed, retrying once");
                self.transcoder.render_clip(job).await.map(|_| ())
            }
            Err(e) => Err(e),
        }
    }
}

/// Looks for any file with the given stem in the audio cache.
async fn find_cached(stem: &Path) -> Option<PathBuf> {
    let parent = stem.parent()?;
    let stem_name = stem.file_name()?.to_string_lossy().to_string();

    let mut entries = tokio::fs::read_dir(parent).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(&format!("{}.", stem_name)) {
            return Some(entry.path());
        }
    }
    None
}
