//! Instagram publisher: turns an eligible release folder into a post.
//!
//! Two-phase flow dictated by the Graph API: stage every video in cloud
//! storage to get public URLs, then create containers, wait for them to
//! finish processing and publish. Upload failures skip the affected item;
//! a container that fails or never finishes aborts the whole post so a
//! partial carousel is never published. The publish call itself only
//! retries on throttling, within a small bounded attempt count.

mod runner;
mod types;

pub use runner::PublishRunner;
pub use types::{ItemOutcome, ItemRecord, PostOutcome, PublishFailure, PublishReport};
