//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::config::TranscoderConfig;

use super::error::TranscodeError;
use super::traits::Transcoder;
use super::types::{ClipJob, ClipResult, MediaInfo};

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Builds the ffmpeg argument list for a clip job.
    ///
    /// The audio window is cut with input seeking (`-ss` before `-i`);
    /// the cover is looped as a still frame, scaled to fit the square
    /// canvas and padded to it. `-shortest` ends the video with the
    /// audio window.
    fn build_clip_args(&self, job: &ClipJob) -> Vec<String> {
        let canvas = job.canvas_px;
        let pad = format!(
            "scale=w={canvas}:h={canvas}:force_original_aspect_ratio=decrease,\
             pad={canvas}:{canvas}:(ow-iw)/2:(oh-ih)/2:black"
        );

        let mut args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            job.start_secs.to_string(),
            "-t".to_string(),
            job.duration_secs.to_string(),
            "-i".to_string(),
            job.audio_path.to_string_lossy().to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            job.cover_path.to_string_lossy().to_string(),
            "-map".to_string(),
            "1:v".to_string(),
            "-map".to_string(),
            "0:a".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-r".to_string(),
            job.fps.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-vf".to_string(),
            pad,
            "-c:a".to_string(),
            "aac".to_string(),
            "-shortest".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
        ];

        args.extend(self.config.extra_args.iter().cloned());
        args.push(job.output_path.to_string_lossy().to_string());
        args
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, TranscodeError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| TranscodeError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        let duration_secs = probe
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let size_bytes = probe
            .format
            .size
            .as_ref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let format_name = probe
            .format
            .format_name
            .split(',')
            .next()
            .unwrap_or("unknown");

        Ok(MediaInfo {
            path: path.to_path_buf(),
            duration_secs,
            format: format_name.to_string(),
            size_bytes,
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError> {
        if !path.exists() {
            return Err(TranscodeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(TranscodeError::probe_failed(format!(
                "ffprobe exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Self::parse_probe_output(path, &String::from_utf8_lossy(&output.stdout))
    }

    async fn render_clip(&self, job: ClipJob) -> Result<ClipResult, TranscodeError> {
        if !job.audio_path.exists() {
            return Err(TranscodeError::InputNotFound {
                path: job.audio_path.clone(),
            });
        }
        if !job.cover_path.exists() {
            return Err(TranscodeError::InputNotFound {
                path: job.cover_path.clone(),
            });
        }
        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = self.build_clip_args(&job);
        debug!(output = %job.output_path.display(), "spawning ffmpeg");

        let start = Instant::now();
        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        let stderr = child.stderr.take().expect("stderr should be captured");
        let mut reader = BufReader::new(stderr).lines();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut error_output = String::new();
            while let Ok(Some(line)) = reader.next_line().await {
                error_output.push_str(&line);
                error_output.push('\n');
            }
            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    return Err(TranscodeError::encode_failed(
                        format!("ffmpeg exited with code: {:?}", status.code()),
                        (!error_output.is_empty()).then_some(error_output),
                    ));
                }
            }
            Ok(Err(e)) => return Err(TranscodeError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(TranscodeError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        let output_meta = tokio::fs::metadata(&job.output_path).await.map_err(|_| {
            TranscodeError::encode_failed("ffmpeg produced no output file", None)
        })?;

        Ok(ClipResult {
            output_path: job.output_path,
            output_size_bytes: output_meta.len(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        for (binary, missing) in [
            (
                &self.config.ffmpeg_path,
                TranscodeError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                },
            ),
            (
                &self.config.ffprobe_path,
                TranscodeError::FfprobeNotFound {
                    path: self.config.ffprobe_path.clone(),
                },
            ),
        ] {
            let status = Command::new(binary)
                .arg("-version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            match status {
                Ok(s) if s.success() => {}
                _ => return Err(missing),
            }
        }
        Ok(())
    }
}
