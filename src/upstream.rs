use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Search endpoint base; the service id is appended as the final path segment.
const PRODUCTAI_ENDPOINT: &str = "https://api.productai.cn/search";

/// Overall timeout for one upstream call, connection setup included.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

/// Response shape of the ProductAI search endpoint. Absent fields decode to
/// their empty values; `time` and `type` are not used by the proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSearchResponse {
    #[serde(default)]
    pub detected_objs: Vec<DetectedObject>,
    #[serde(default)]
    pub results: Vec<UpstreamResult>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub r#type: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectedObject {
    #[serde(default)]
    pub loc: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamResult {
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub url: String,
}

/// Client for the ProductAI image search service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    endpoint: String,
    service_id: String,
    access_key_id: String,
}

impl UpstreamClient {
    pub fn new(service_id: &str, access_key_id: &str) -> Result<UpstreamClient, reqwest::Error> {
        Self::with_endpoint(PRODUCTAI_ENDPOINT.to_string(), service_id, access_key_id)
    }

    /// Same client against a different endpoint base; tests point this at a
    /// local server.
    pub fn with_endpoint(
        endpoint: String,
        service_id: &str,
        access_key_id: &str,
    ) -> Result<UpstreamClient, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;
        Ok(UpstreamClient {
            http,
            endpoint,
            service_id: service_id.to_string(),
            access_key_id: access_key_id.to_string(),
        })
    }

    /// Runs one search. `coords` is forwarded as a single `loc` bounding box
    /// only when exactly 4 values were submitted; any other count is dropped.
    pub async fn search(
        &self,
        url: &str,
        coords: &[String],
    ) -> Result<UpstreamSearchResponse, UpstreamError> {
        let mut params = vec![
            ("ret_detected_objs", "1".to_string()),
            ("url", url.to_string()),
        ];
        if coords.len() == 4 {
            params.push(("loc", coords.join("-")));
        }

        log::debug!("searching upstream for {url}");
        let response = self
            .http
            .post(format!("{}/{}", self.endpoint, self.service_id))
            .header("X-CA-Version", "1.0")
            .header("X-CA-AccessKeyId", &self.access_key_id)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                log::error!("upstream request for {url} failed: {e}");
                e
            })?;

        let body = response.text().await?;
        let decoded = serde_json::from_str(&body).map_err(|e| {
            log::error!("upstream response for {url} did not decode: {e}");
            e
        })?;
        Ok(decoded)
    }
}
