//! Graph API client implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::InstagramConfig;

use super::types::{ContainerStatus, IgAccount, PublishedPost};
use super::{GraphApi, PublishError};

/// Graph API error codes that mean "slow down".
const THROTTLE_CODES: &[i64] = &[4, 17, 32, 613];

/// Instagram Graph API client.
pub struct GraphClient {
    client: Client,
    config: InstagramConfig,
}

impl GraphClient {
    /// Create a new Graph API client.
    pub fn new(config: InstagramConfig) -> Result<Self, PublishError> {
        if config.access_token.is_empty() {
            return Err(PublishError::NotConfigured(
                "access token is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn account_id(&self) -> Result<&str, PublishError> {
        if self.config.business_account_id.is_empty() {
            return Err(PublishError::NotConfigured(
                "business account id is empty".to_string(),
            ));
        }
        Ok(&self.config.business_account_id)
    }

    /// POSTs a form to an endpoint and extracts the returned object id.
    async fn post_for_id(
        &self,
        url: &str,
        mut form: Vec<(&str, String)>,
    ) -> Result<String, PublishError> {
        form.push(("access_token", self.config.access_token.clone()));

        let response = self.client.post(url).form(&form).send().await?;
        let payload: GraphId = Self::read_payload(response).await?;
        Ok(payload.id)
    }

    /// Maps a response to `T`, turning Graph error envelopes into typed
    /// errors first.
    async fn read_payload<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, PublishError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let envelope: Result<GraphErrorEnvelope, _> = serde_json::from_str(&body);
            let (code, message) = match envelope {
                Ok(env) => (env.error.code, env.error.message),
                Err(_) => (None, body.clone()),
            };
            if code.map(|c| THROTTLE_CODES.contains(&c)).unwrap_or(false) {
                warn!(code = ?code, "Graph API throttled the request");
                return Err(PublishError::RateLimited { message });
            }
            return Err(PublishError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| PublishError::parse(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn create_reel_container(
        &self,
        video_url: &str,
        caption: &str,
        thumb_offset_secs: u64,
    ) -> Result<String, PublishError> {
        let url = format!("{}/{}/media", self.config.graph_base_url, self.account_id()?);
        debug!(video_url, "creating REELS container");
        self.post_for_id(
            &url,
            vec![
                ("media_type", "REELS".to_string()),
                ("video_url", video_url.to_string()),
                ("caption", caption.to_string()),
                ("thumb_offset", thumb_offset_secs.to_string()),
            ],
        )
        .await
    }

    async fn create_carousel_item(&self, video_url: &str) -> Result<String, PublishError> {
        let url = format!("{}/{}/media", self.config.graph_base_url, self.account_id()?);
        debug!(video_url, "creating carousel child container");
        self.post_for_id(
            &url,
            vec![
                ("media_type", "VIDEO".to_string()),
                ("video_url", video_url.to_string()),
                ("is_carousel_item", "true".to_string()),
            ],
        )
        .await
    }

    async fn create_carousel(
        &self,
        children: &[String],
        caption: &str,
    ) -> Result<String, PublishError> {
        let url = format!("{}/{}/media", self.config.graph_base_url, self.account_id()?);
        debug!(children = children.len(), "creating carousel parent container");
        self.post_for_id(
            &url,
            vec![
                ("media_type", "CAROUSEL".to_string()),
                ("children", children.join(",")),
                ("caption", caption.to_string()),
            ],
        )
        .await
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus, PublishError> {
        let url = format!("{}/{}", self.config.graph_base_url, container_id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields", "status_code"),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await?;

        let payload: GraphStatus = Self::read_payload(response).await?;
        Ok(ContainerStatus::from_code(&payload.status_code))
    }

    async fn publish(&self, creation_id: &str) -> Result<PublishedPost, PublishError> {
        let url = format!(
            "{}/{}/media_publish",
            self.config.graph_base_url,
            self.account_id()?
        );
        debug!(creation_id, "publishing container");
        let media_id = self
            .post_for_id(&url, vec![("creation_id", creation_id.to_string())])
            .await?;
        Ok(PublishedPost { media_id })
    }

    async fn lookup_business_accounts(&self) -> Result<Vec<IgAccount>, PublishError> {
        let url = format!("{}/me/accounts", self.config.graph_base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("access_token", self.config.access_token.as_str())])
            .send()
            .await?;
        let pages: GraphPages = Self::read_payload(response).await?;

        let mut accounts = Vec::with_capacity(pages.data.len());
        for page in pages.data {
            let url = format!("{}/{}", self.config.graph_base_url, page.id);
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("fields", "instagram_business_account{id,username}"),
                    ("access_token", self.config.access_token.as_str()),
                ])
                .send()
                .await?;
            let fields: GraphPageFields = Self::read_payload(response).await?;

            let iba = fields.instagram_business_account;
            accounts.push(IgAccount {
                page_id: page.id,
                page_name: page.name,
                ig_user_id: iba.as_ref().map(|a| a.id.clone()),
                ig_username: iba.and_then(|a| a.username),
            });
        }
        Ok(accounts)
    }
}

// ============================================================================
// Graph API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphStatus {
    #[serde(default)]
    status_code: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GraphPages {
    #[serde(default)]
    data: Vec<GraphPage>,
}

#[derive(Debug, Deserialize)]
struct GraphPage {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct GraphPageFields {
    #[serde(default)]
    instagram_business_account: Option<GraphIgAccount>,
}

#[derive(Debug, Deserialize)]
struct GraphIgAccount {
    id: String,
    #[serde(default)]
    username: Option<String>,
}
