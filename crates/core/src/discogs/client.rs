//! Discogs API client.
//!
//! Discogs asks clients to identify themselves with a User-Agent and
//! throttles authenticated tokens to 60 requests per minute; the client
//! spaces its requests accordingly and backs off on 429 responses.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::config::DiscogsConfig;
use crate::release::{CoverArt, PriceSummary, Release, Track};

use super::DiscogsError;

/// Tracklist entries with one of these titles and no duration are side
/// headings, not tracks (seen on vinyl releases).
static SIDE_HEADINGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "that side",
        "this side",
        "logo side",
        "info side",
        "other side",
        "both sides",
        "this-side",
        "that-side",
        "side a",
        "side b",
    ]
    .into_iter()
    .collect()
});

/// A parsed reference to a Discogs catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseRef {
    /// A concrete release.
    Release(u64),
    /// A master; resolved to its main release before fetching.
    Master(u64),
}

impl ReleaseRef {
    /// Parses a bare numeric id or a Discogs release/master URL.
    ///
    /// URL paths may carry a two-letter language prefix ("/fr/release/..")
    /// which is skipped.
    pub fn parse(input: &str) -> Result<Self, DiscogsError> {
        static LEADING_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)").unwrap());

        let input = input.trim();
        if let Ok(id) = input.parse::<u64>() {
            return Ok(Self::Release(id));
        }

        let url: reqwest::Url = input
            .parse()
            .map_err(|_| DiscogsError::BadReference(input.to_string()))?;
        let mut parts: Vec<&str> = url
            .path()
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() >= 2 && parts[0].len() == 2 {
            parts.remove(0);
        }

        if parts.len() >= 2 {
            let id = LEADING_ID
                .captures(parts[1])
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u64>().ok());
            match (parts[0], id) {
                ("release", Some(id)) => return Ok(Self::Release(id)),
                ("master", Some(id)) => return Ok(Self::Master(id)),
                _ => {}
            }
        }

        Err(DiscogsError::BadReference(input.to_string()))
    }
}

/// Discogs API client.
pub struct DiscogsClient {
    client: Client,
    config: DiscogsConfig,
    base_url: String,
    last_request: Arc<Mutex<Option<Instant>>>,
    rate_limit: Duration,
}

impl DiscogsClient {
    /// Create a new Discogs client.
    pub fn new(config: DiscogsConfig) -> Result<Self, DiscogsError> {
        if config.token.is_empty() {
            return Err(DiscogsError::NotConfigured(
                "Discogs token is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.discogs.com".to_string());
        let rate_limit = Duration::from_millis(config.rate_limit_ms);

        Ok(Self {
            client,
            config,
            base_url,
            last_request: Arc::new(Mutex::new(None)),
            rate_limit,
        })
    }

    /// Fetch and normalize a release, resolving masters to their main
    /// release first. Price lookups are best-effort and never fail the
    /// fetch.
    pub async fn fetch_release(&self, release_ref: ReleaseRef) -> Result<Release, DiscogsError> {
        let release_id = match release_ref {
            ReleaseRef::Release(id) => id,
            ReleaseRef::Master(id) => self.main_release_of(id).await?,
        };

        let raw: DgRelease = self
            .get_json(&format!("{}/releases/{}", self.base_url, release_id))
            .await?;

        let mut release = Release::from(raw);
        release.id = release_id;
        if release.title.is_empty() {
            warn!(release_id, "release has no title, proceeding with id only");
        }

        release.prices = self.fetch_prices(release_id).await;
        Ok(release)
    }

    /// Resolve a master id to its main release id.
    async fn main_release_of(&self, master_id: u64) -> Result<u64, DiscogsError> {
        debug!(master_id, "resolving master to main release");
        let master: DgMaster = self
            .get_json(&format!("{}/masters/{}", self.base_url, master_id))
            .await?;
        match master.main_release {
            Some(id) => Ok(id),
            None => Err(DiscogsError::schema(format!(
                "master {} has no main_release",
                master_id
            ))),
        }
    }

    /// Marketplace price summary: stats endpoint first, with per-field
    /// fallback to the spread of price suggestions.
    async fn fetch_prices(&self, release_id: u64) -> Option<PriceSummary> {
        let currency = self.config.currency.to_uppercase();

        let stats: Option<DgMarketStats> = self
            .get_json(&format!(
                "{}/marketplace/stats/{}?curr_abbr={}",
                self.base_url, release_id, currency
            ))
            .await
            .map_err(|e| warn!(release_id, error = %e, "marketplace stats lookup failed"))
            .ok();

        let mut min = stats.as_ref().and_then(|s| s.lowest_price.as_f64());
        let mut median = stats.as_ref().and_then(|s| s.median_price.as_f64());
        let mut max = stats.as_ref().and_then(|s| s.highest_price.as_f64());

        if median.is_none() || max.is_none() {
            if let Some((s_min, s_median, s_max)) = self.suggested_spread(release_id).await {
                min = min.or(s_min);
                median = median.or(s_median);
                max = max.or(s_max);
            }
        }

        let summary = PriceSummary {
            currency,
            min,
            median,
            max,
        };
        summary.has_data().then_some(summary)
    }

    /// Approximate min/median/max from the per-condition price
    /// suggestions. Not the sales history, but good enough when the stats
    /// endpoint only exposes the lowest price.
    async fn suggested_spread(
        &self,
        release_id: u64,
    ) -> Option<(Option<f64>, Option<f64>, Option<f64>)> {
        let suggestions: std::collections::HashMap<String, DgPrice> = self
            .get_json(&format!(
                "{}/marketplace/price_suggestions/{}?curr_abbr={}",
                self.base_url,
                release_id,
                self.config.currency.to_uppercase()
            ))
            .await
            .map_err(|e| warn!(release_id, error = %e, "price suggestions lookup failed"))
            .ok()?;

        let mut values: Vec<f64> = suggestions.values().filter_map(|p| p.as_f64()).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let min = values.first().copied();
        let max = values.last().copied();
        let median = Some(median_of_sorted(&values));
        Some((min, median, max))
    }

    /// GET a JSON document with rate-limit spacing and bounded backoff on
    /// 429 responses.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, DiscogsError> {
        let attempts = self.config.retry_attempts.max(1);

        for attempt in 0..attempts {
            self.wait_for_rate_limit().await;

            let response = self
                .client
                .get(url)
                .header(
                    reqwest::header::AUTHORIZATION,
                    format!("Discogs token={}", self.config.token),
                )
                .header(reqwest::header::ACCEPT, "application/vnd.discogs.v2+json")
                .send()
                .await?;

            let status = response.status();
            if status == 429 {
                let delay = Duration::from_millis(
                    self.config.retry_base_delay_ms.saturating_mul(1 << attempt),
                );
                warn!(url, attempt, ?delay, "Discogs rate limit hit, backing off");
                sleep(delay).await;
                continue;
            }
            if status == 404 {
                return Err(DiscogsError::NotFound(url.to_string()));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(DiscogsError::ApiError {
                    status: status.as_u16(),
                    message: body,
                });
            }

            return response
                .json()
                .await
                .map_err(|e| DiscogsError::schema(format!("failed to parse response: {}", e)));
        }

        Err(DiscogsError::RateLimited { attempts })
    }

    /// Wait for rate limit if needed.
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.rate_limit {
                let wait_time = self.rate_limit - elapsed;
                debug!("Discogs rate limit: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

// ============================================================================
// Discogs API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct DgMaster {
    #[serde(default)]
    main_release: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DgRelease {
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    artists: Vec<DgArtist>,
    #[serde(default)]
    labels: Vec<DgLabel>,
    #[serde(default)]
    tracklist: Vec<DgTrack>,
    #[serde(default)]
    images: Vec<DgImage>,
}

#[derive(Debug, Deserialize)]
struct DgArtist {
    #[serde(default)]
    name: String,
    #[serde(default)]
    anv: Option<String>,
}

impl DgArtist {
    fn display_name(&self) -> Option<String> {
        let name = match &self.anv {
            Some(anv) if !anv.is_empty() => anv.clone(),
            _ => self.name.clone(),
        };
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Deserialize)]
struct DgLabel {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct DgTrack {
    #[serde(default)]
    position: String,
    // Discogs really names this field "type_" on the wire.
    #[serde(rename = "type_", default)]
    entry_type: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    artists: Vec<DgArtist>,
}

impl DgTrack {
    /// Whether this tracklist entry is an actual track rather than a
    /// side heading.
    fn is_track(&self) -> bool {
        if let Some(kind) = &self.entry_type {
            if !kind.is_empty() && kind.to_lowercase() != "track" {
                return false;
            }
        }
        if self.duration.is_empty() {
            let normalized = self
                .title
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            if SIDE_HEADINGS.contains(normalized.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Deserialize)]
struct DgImage {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    uri150: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DgMarketStats {
    #[serde(default)]
    lowest_price: DgPrice,
    #[serde(default)]
    median_price: DgPrice,
    #[serde(default)]
    highest_price: DgPrice,
}

/// Price fields vary across endpoints: bare numbers, strings with comma
/// decimals, or `{"currency": .., "value": ..}` objects.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum DgPrice {
    #[default]
    Missing,
    Number(f64),
    Text(String),
    Money {
        #[serde(default)]
        value: Option<Box<DgPrice>>,
    },
}

impl DgPrice {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Missing => None,
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.replace(',', ".").parse().ok(),
            Self::Money { value } => value.as_ref().and_then(|v| v.as_f64()),
        }
    }
}

impl From<DgRelease> for Release {
    fn from(raw: DgRelease) -> Self {
        let artists = raw
            .artists
            .iter()
            .filter_map(DgArtist::display_name)
            .collect();

        let labels = raw
            .labels
            .into_iter()
            .filter(|l| !l.name.is_empty())
            .map(|l| l.name)
            .collect();

        let mut tracks = Vec::new();
        for entry in raw.tracklist.into_iter().filter(DgTrack::is_track) {
            let artists: Vec<String> = entry
                .artists
                .iter()
                .filter_map(DgArtist::display_name)
                .collect();
            tracks.push(Track {
                position: tracks.len() as u32 + 1,
                side_position: (!entry.position.is_empty()).then_some(entry.position),
                title: entry.title,
                duration: (!entry.duration.is_empty()).then_some(entry.duration),
                artists: (!artists.is_empty()).then_some(artists),
            });
        }

        let images = raw
            .images
            .into_iter()
            .filter(|i| !i.uri.is_empty())
            .map(|i| CoverArt {
                uri: i.uri,
                thumbnail: i.uri150.filter(|u| !u.is_empty()),
            })
            .collect();

        Release {
            id: 0, // filled in by the caller, the payload does not always carry it
            title: raw.title.trim().to_string(),
            artists,
            year: raw.year.filter(|y| *y > 0),
            country: raw.country.filter(|c| !c.is_empty()),
            labels,
            tracks,
            images,
            prices: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_ref_parse_bare_id() {
        assert_eq!(ReleaseRef::parse("1234567").unwrap(), ReleaseRef::Release(1234567));
        assert_eq!(ReleaseRef::parse(" 42 ").unwrap(), ReleaseRef::Release(42));
    }

    #[test]
    fn test_release_ref_parse_urls() {
        assert_eq!(
            ReleaseRef::parse("https://www.discogs.com/release/249504-Rick-Astley").unwrap(),
            ReleaseRef::Release(249504)
        );
        assert_eq!(
            ReleaseRef::parse("https://www.discogs.com/master/96559-Some-Master").unwrap(),
            ReleaseRef::Master(96559)
        );
        // Language prefix is skipped.
        assert_eq!(
            ReleaseRef::parse("https://www.discogs.com/fr/release/249504").unwrap(),
            ReleaseRef::Release(249504)
        );
    }

    #[test]
    fn test_release_ref_parse_rejects_garbage() {
        assert!(matches!(
            ReleaseRef::parse("not a url"),
            Err(DiscogsError::BadReference(_))
        ));
        assert!(matches!(
            ReleaseRef::parse("https://www.discogs.com/artist/12345"),
            Err(DiscogsError::BadReference(_))
        ));
    }

    #[test]
    fn test_price_field_variants() {
        let p: DgPrice = serde_json::from_str("4.5").unwrap();
        assert_eq!(p.as_f64(), Some(4.5));

        let p: DgPrice = serde_json::from_str(r#""12,30""#).unwrap();
        assert_eq!(p.as_f64(), Some(12.3));

        let p: DgPrice =
            serde_json::from_str(r#"{"currency": "USD", "value": 7.25}"#).unwrap();
        assert_eq!(p.as_f64(), Some(7.25));

        let p: DgPrice = serde_json::from_str("null").unwrap();
        assert_eq!(p.as_f64(), None);
    }

    #[test]
    fn test_median_of_sorted() {
        assert_eq!(median_of_sorted(&[1.0, 2.0, 10.0]), 2.0);
        assert_eq!(median_of_sorted(&[1.0, 2.0, 3.0, 10.0]), 2.5);
        assert_eq!(median_of_sorted(&[5.0]), 5.0);
    }

    #[test]
    fn test_tracklist_filters_headings() {
        let json = r#"{
            "title": "Some 7\"",
            "year": 1979,
            "country": "UK",
            "artists": [{"name": "The Band"}],
            "tracklist": [
                {"position": "", "type_": "heading", "title": "This Side", "duration": ""},
                {"position": "A", "title": "Song One", "duration": "3:45"},
                {"position": "", "title": "That Side", "duration": ""},
                {"position": "B", "title": "Song Two", "duration": "",
                 "artists": [{"name": "Guest"}]}
            ]
        }"#;
        let raw: DgRelease = serde_json::from_str(json).unwrap();
        let release = Release::from(raw);

        assert_eq!(release.tracks.len(), 2);
        assert_eq!(release.tracks[0].position, 1);
        assert_eq!(release.tracks[0].side_position.as_deref(), Some("A"));
        assert_eq!(release.tracks[0].title, "Song One");
        assert_eq!(release.tracks[1].position, 2);
        assert_eq!(release.tracks[1].title, "Song Two");
        assert_eq!(
            release.tracks[1].artists.as_deref(),
            Some(&["Guest".to_string()][..])
        );
    }

    #[test]
    fn test_heading_without_type_is_dropped_only_without_duration() {
        let with_duration = DgTrack {
            position: "A1".to_string(),
            entry_type: None,
            title: "This Side".to_string(),
            duration: "2:10".to_string(),
            artists: vec![],
        };
        // A real track that happens to share a heading title keeps its slot.
        assert!(with_duration.is_track());

        let without_duration = DgTrack {
            duration: String::new(),
            ..with_duration
        };
        assert!(!without_duration.is_track());
    }

    #[test]
    fn test_release_conversion_defaults() {
        let raw: DgRelease = serde_json::from_str(r#"{"title": " Padded ", "year": 0}"#).unwrap();
        let release = Release::from(raw);
        assert_eq!(release.title, "Padded");
        assert_eq!(release.year, None);
        assert!(release.tracks.is_empty());
        assert!(release.images.is_empty());
    }

    #[test]
    fn test_anv_preferred_over_name() {
        let artist = DgArtist {
            name: "Artist (2)".to_string(),
            anv: Some("Artist".to_string()),
        };
        assert_eq!(artist.display_name().unwrap(), "Artist");
    }
}
