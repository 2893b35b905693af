//! PokeAPI ingestion adapter
//!
//! Reads `GET {base}/pokemon?limit=N` for the listing and follows each
//! result's `url` for the detail record.

use super::{CreatureDetail, CreatureSummary, IngestionSource, SourceError};
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Listing endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonListResponse {
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// Detail endpoint response, reduced to what the catalog maps
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonDetailResponse {
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    pub sprites: PokemonSprites,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonTypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PokemonSprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

impl From<PokemonDetailResponse> for CreatureDetail {
    fn from(detail: PokemonDetailResponse) -> Self {
        Self {
            types: detail.types.into_iter().map(|t| t.kind.name).collect(),
            image_url: detail.sprites.front_default,
        }
    }
}

/// [`IngestionSource`] for the public PokeAPI
pub struct PokeApiSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl PokeApiSource {
    /// Create a new adapter; `timeout` bounds every request
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<T, SourceError> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| match classify(e) {
                SourceError::Network(e) if e.is_decode() => SourceError::Decode(e.to_string()),
                other => other,
            })
    }
}

fn classify(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Network(e)
    }
}

async fn check_status(response: Response) -> std::result::Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl IngestionSource for PokeApiSource {
    async fn list_summaries(
        &self,
        limit: u32,
    ) -> std::result::Result<Vec<CreatureSummary>, SourceError> {
        let url = format!("{}/pokemon", self.base_url);
        debug!(url = %url, limit, "Fetching creature listing");

        let listing: PokemonListResponse = self
            .get_json(self.client.get(&url).query(&[("limit", limit)]))
            .await?;

        Ok(listing
            .results
            .into_iter()
            .map(|r| CreatureSummary::new(r.name, r.url))
            .collect())
    }

    async fn fetch_detail(
        &self,
        detail_url: &str,
    ) -> std::result::Result<CreatureDetail, SourceError> {
        debug!(url = %detail_url, "Fetching creature detail");

        let detail: PokemonDetailResponse = self.get_json(self.client.get(detail_url)).await?;
        Ok(detail.into())
    }
}
