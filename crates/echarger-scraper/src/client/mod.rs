//! HTTP client for OpenChargeMap's `GET /v3/poi` endpoint.

use std::time::Duration;

use echarger_core::{AppConfig, BoundingBox};
use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::types::OcmPoi;

/// Fetches charging sites inside a bounding box.
///
/// 429 and network failures are retried with exponential backoff up to
/// `max_retries` extra attempts. 404 and other non-2xx statuses come back
/// as typed errors without a retry.
pub struct OcmClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl OcmClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute URL, or [`ScraperError::Http`] if the `reqwest::Client`
    /// cannot be built.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        reqwest::Url::parse(&base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the scraper and OCM settings in `config`.
    ///
    /// # Errors
    ///
    /// See [`OcmClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.ocm_base_url,
            config.ocm_api_key.clone(),
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )
    }

    /// Fetches up to `max_results` POIs inside `bbox` whose connections
    /// reach at least `min_power_kw`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`]: HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network or TLS failure after all retries.
    /// - [`ScraperError::Deserialize`]: body is not a POI array.
    pub async fn fetch_pois(
        &self,
        bbox: &BoundingBox,
        max_results: u32,
        min_power_kw: u32,
    ) -> Result<Vec<OcmPoi>, ScraperError> {
        let url = self.poi_url(bbox, max_results, min_power_kw)?;
        let domain = reqwest::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_else(|| self.base_url.clone());

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let domain = domain.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<Vec<OcmPoi>>(&body).map_err(|e| {
                    ScraperError::Deserialize {
                        context: format!("POI list from {domain}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// `boundingbox` is `(minLat,minLng),(maxLat,maxLng)`; the API key is
    /// only sent when one is configured.
    fn poi_url(
        &self,
        bbox: &BoundingBox,
        max_results: u32,
        min_power_kw: u32,
    ) -> Result<String, ScraperError> {
        let base = format!("{}/v3/poi", self.base_url);
        let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("output", "json")
                .append_pair("boundingbox", &bounding_box_param(bbox))
                .append_pair("minpowerkw", &min_power_kw.to_string())
                .append_pair("maxresults", &max_results.to_string())
                .append_pair("compact", "false")
                .append_pair("verbose", "false");
            if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
                query.append_pair("key", key);
            }
        }

        Ok(url.to_string())
    }
}

fn bounding_box_param(bbox: &BoundingBox) -> String {
    format!(
        "({},{}),({},{})",
        bbox.min_lat, bbox.min_lng, bbox.max_lat, bbox.max_lng
    )
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
