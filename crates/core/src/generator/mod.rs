//! Video generator: per-track promo clips for one release.
//!
//! Drives the two media tool boundaries ([`crate::transcoder`],
//! [`crate::fetcher`]) plus the cover download for a single release.
//! Failures isolate to one track: a track that cannot be resolved or
//! encoded is recorded in the [`GenerationReport`] and the run moves on,
//! so a batch makes maximum forward progress. Already-present output
//! videos are treated as completion markers and skipped.

mod cover;
mod pipeline;
mod types;

pub use pipeline::VideoGenerator;
pub use types::{GenerationReport, GeneratorError, TrackFailure, TrackOutcome, TrackRecord};
