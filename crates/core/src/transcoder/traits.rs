//! Trait definition for the transcoder boundary.

use async_trait::async_trait;
use std::path::Path;

use super::error::TranscodeError;
use super::types::{ClipJob, ClipResult, MediaInfo};

/// A tool that can probe media files and render promo clips.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Probes a media file to get its information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError>;

    /// Renders a clip according to the job specification.
    async fn render_clip(&self, job: ClipJob) -> Result<ClipResult, TranscodeError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct StaticTranscoder;

    #[async_trait]
    impl Transcoder for StaticTranscoder {
        fn name(&self) -> &str {
            "static"
        }

        async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError> {
            Ok(MediaInfo {
                path: path.to_path_buf(),
                duration_secs: 200.0,
                format: "mp3".to_string(),
                size_bytes: 4096,
            })
        }

        async fn render_clip(&self, job: ClipJob) -> Result<ClipResult, TranscodeError> {
            Ok(ClipResult {
                output_path: job.output_path,
                output_size_bytes: 1024,
                elapsed_ms: 10,
            })
        }

        async fn validate(&self) -> Result<(), TranscodeError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_trait_object_usage() {
        let transcoder: Box<dyn Transcoder> = Box::new(StaticTranscoder);
        let info = transcoder.probe(Path::new("/x.mp3")).await.unwrap();
        assert_eq!(info.duration_secs, 200.0);

        let job = ClipJob {
            audio_path: PathBuf::from("/x.mp3"),
            cover_path: PathBuf::from("/c.jpg"),
            output_path: PathBuf::from("/out.mp4"),
            start_secs: 90,
            duration_secs: 30,
            canvas_px: 1080,
            fps: 24,
        };
        let result = transcoder.render_clip(job).await.unwrap();
        assert_eq!(result.output_path, PathBuf::from("/out.mp4"));
    }
}
