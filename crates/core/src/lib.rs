//! Core library for crate-digger: a two-stage Discogs promo pipeline.
//!
//! Stage one fetches a release from Discogs, exports its metadata text
//! file and renders one short cover-art video per track. Stage two scans
//! the output tree for complete release folders and publishes them to
//! Instagram via cloud storage and the Graph API. The folder tree is the
//! only interface between the stages.

pub mod config;
pub mod discogs;
pub mod exporter;
pub mod fetcher;
pub mod generator;
pub mod instagram;
pub mod publisher;
pub mod release;
pub mod selector;
pub mod storage;
pub mod testing;
pub mod transcoder;

pub use config::{
    ensure_discogs, ensure_instagram, ensure_storage, load_config, load_config_from_str,
    validate_config, Config, ConfigError, SanitizedConfig, ShortSourcePolicy,
};
pub use discogs::{DiscogsClient, DiscogsError, ReleaseRef};
pub use fetcher::{AudioFetcher, FetchError, YtDlpFetcher};
pub use generator::{GenerationReport, VideoGenerator};
pub use instagram::{ContainerStatus, GraphApi, GraphClient, IgAccount, PublishError};
pub use publisher::{PublishReport, PublishRunner};
pub use release::{Release, Track};
pub use selector::ReleaseFolder;
pub use storage::{GcsMediaStore, MediaStore, UploadError};
pub use transcoder::{FfmpegTranscoder, TranscodeError, Transcoder};
