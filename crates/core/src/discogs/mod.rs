//! Discogs API integration.
//!
//! This module provides the metadata fetcher: it resolves a release
//! reference (bare id, `/release/...` or `/master/...` URL) against the
//! Discogs public API and maps the response into the [`crate::release`]
//! data model, including the marketplace price summary.

mod client;

pub use client::{DiscogsClient, ReleaseRef};

use thiserror::Error;

/// Errors that can occur when talking to Discogs.
#[derive(Debug, Error)]
pub enum DiscogsError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit still exceeded after the configured retries.
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Release or master does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response shape was unusable.
    #[error("Unexpected response shape: {reason}")]
    Schema { reason: String },

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// The given reference is not a release id or Discogs URL.
    #[error("Unrecognized release reference: {0}")]
    BadReference(String),

    /// Client not configured (missing token).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl DiscogsError {
    /// Creates a schema error.
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema {
            reason: reason.into(),
        }
    }
}
