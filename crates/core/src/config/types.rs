use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
///
/// Every section has working defaults so a bare `config.toml` (or none at
/// all, via environment variables) is enough to start; credentials are
/// checked per-command by the `ensure_*` validators.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub discogs: DiscogsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub instagram: InstagramConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
}

/// Discogs API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscogsConfig {
    /// Personal access token. Required for `generate`.
    #[serde(default)]
    pub token: String,
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Currency for marketplace price lookups.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Base URL override (tests point this at a local server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Minimum delay between requests in milliseconds.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    /// Attempts for a rate-limited request before giving up.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Base delay for the exponential retry backoff, in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Request timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    format!(
        "CrateDigger/{} ( https://github.com/loictr/crate-digger )",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_rate_limit_ms() -> u64 {
    1100
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    2000
}

fn default_http_timeout() -> u64 {
    30
}

impl Default for DiscogsConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            user_agent: default_user_agent(),
            currency: default_currency(),
            base_url: None,
            rate_limit_ms: default_rate_limit_ms(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            timeout_secs: default_http_timeout(),
        }
    }
}

/// Output tree configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Root directory the per-release folders are created under.
    #[serde(default = "default_output_root")]
    pub root: PathBuf,
}

fn default_output_root() -> PathBuf {
    PathBuf::from("outputs")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
        }
    }
}

/// Audio fetch tool (yt-dlp) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,
    /// Audio format requested from the extractor.
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
    /// Timeout for a single download in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_fetch_timeout() -> u64 {
    300
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            audio_format: default_audio_format(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

/// Transcoder (ffmpeg) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscoderConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Path to the ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    /// Timeout for a single encode in seconds.
    #[serde(default = "default_transcode_timeout")]
    pub timeout_secs: u64,
    /// FFmpeg log level (quiet, error, warning, info, ...).
    #[serde(default = "default_ffmpeg_log_level")]
    pub log_level: String,
    /// Additional global ffmpeg arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_transcode_timeout() -> u64 {
    600
}

fn default_ffmpeg_log_level() -> String {
    "error".to_string()
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_transcode_timeout(),
            log_level: default_ffmpeg_log_level(),
            extra_args: Vec::new(),
        }
    }
}

/// Video generator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Clip start offset into the source audio, in seconds.
    #[serde(default = "default_clip_start")]
    pub clip_start_secs: u64,
    /// Clip length in seconds.
    #[serde(default = "default_clip_duration")]
    pub clip_duration_secs: u64,
    /// What to do with sources shorter than start + duration.
    #[serde(default)]
    pub short_source_policy: ShortSourcePolicy,
    /// Output canvas edge in pixels (square, Instagram-friendly).
    #[serde(default = "default_canvas_px")]
    pub canvas_px: u32,
    /// Output frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_clip_start() -> u64 {
    90
}

fn default_clip_duration() -> u64 {
    30
}

fn default_canvas_px() -> u32 {
    1080
}

fn default_fps() -> u32 {
    24
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            clip_start_secs: default_clip_start(),
            clip_duration_secs: default_clip_duration(),
            short_source_policy: ShortSourcePolicy::default(),
            canvas_px: default_canvas_px(),
            fps: default_fps(),
        }
    }
}

/// Policy for audio sources shorter than the requested clip window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortSourcePolicy {
    /// Fail the track instead of producing a clip from the wrong window.
    #[default]
    Reject,
    /// Clip from the beginning of the source instead.
    FromStart,
}

/// Cloud storage (GCS) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Bucket name. Required for `publish`.
    #[serde(default)]
    pub bucket: String,
    /// Object key prefix within the bucket.
    #[serde(default = "default_storage_prefix")]
    pub prefix: String,
    /// OAuth bearer token used for uploads. Required for `publish`.
    #[serde(default)]
    pub access_token: String,
    /// Base URL override (tests point this at a local server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Upload timeout in seconds.
    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,
}

fn default_storage_prefix() -> String {
    "discogs-posts".to_string()
}

fn default_upload_timeout() -> u64 {
    180
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: default_storage_prefix(),
            access_token: String::new(),
            base_url: None,
            timeout_secs: default_upload_timeout(),
        }
    }
}

/// Instagram Graph API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstagramConfig {
    /// Long-lived access token. Required for `publish` and `account`.
    #[serde(default)]
    pub access_token: String,
    /// Instagram business account id. Required for `publish`.
    #[serde(default)]
    pub business_account_id: String,
    /// Graph API base URL, version included.
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_graph_timeout")]
    pub timeout_secs: u64,
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com/v20.0".to_string()
}

fn default_graph_timeout() -> u64 {
    180
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            business_account_id: String::new(),
            graph_base_url: default_graph_base_url(),
            timeout_secs: default_graph_timeout(),
        }
    }
}

/// Publish flow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublisherConfig {
    /// Container status poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Give up on a container still processing after this many seconds.
    #[serde(default = "default_processing_timeout")]
    pub processing_timeout_secs: u64,
    /// Attempts for the publish call when rate limited. Kept small:
    /// publishing is irreversible and blind retries risk duplicate posts.
    #[serde(default = "default_publish_attempts")]
    pub publish_attempts: u32,
    /// Cover frame offset for single-video reels, in seconds.
    #[serde(default = "default_thumb_offset")]
    pub thumb_offset_secs: u64,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_processing_timeout() -> u64 {
    300
}

fn default_publish_attempts() -> u32 {
    2
}

fn default_thumb_offset() -> u64 {
    1
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            processing_timeout_secs: default_processing_timeout(),
            publish_attempts: default_publish_attempts(),
            thumb_offset_secs: default_thumb_offset(),
        }
    }
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub discogs: SanitizedDiscogsConfig,
    pub output: OutputConfig,
    pub storage: SanitizedStorageConfig,
    pub instagram: SanitizedInstagramConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDiscogsConfig {
    pub user_agent: String,
    pub currency: String,
    pub token_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub bucket: String,
    pub prefix: String,
    pub token_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedInstagramConfig {
    pub business_account_id: String,
    pub token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            discogs: SanitizedDiscogsConfig {
                user_agent: config.discogs.user_agent.clone(),
                currency: config.discogs.currency.clone(),
                token_configured: !config.discogs.token.is_empty(),
            },
            output: config.output.clone(),
            storage: SanitizedStorageConfig {
                bucket: config.storage.bucket.clone(),
                prefix: config.storage.prefix.clone(),
                token_configured: !config.storage.access_token.is_empty(),
            },
            instagram: SanitizedInstagramConfig {
                business_account_id: config.instagram.business_account_id.clone(),
                token_configured: !config.instagram.access_token.is_empty(),
            },
        }
    }
}
