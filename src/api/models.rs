use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamSearchResponse;

/// Parsed form-encoded body, key -> values in submission order. Repeated keys
/// (like `coords[]`) keep every value.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FormValues(BTreeMap<String, Vec<String>>);

impl FormValues {
    pub fn parse(bytes: &[u8]) -> FormValues {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url::form_urlencoded::parse(bytes) {
            values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        FormValues(values)
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One validated inbound search submission.
#[derive(Debug)]
pub struct SearchRequest {
    pub url: String,
    pub coords: Vec<String>,
}

impl SearchRequest {
    pub fn from_form(form: &FormValues) -> Result<SearchRequest, ApiError> {
        let url = form.first("url").unwrap_or_default().trim();
        if url.is_empty() {
            return Err(ApiError::MissingUrl);
        }
        Ok(SearchRequest {
            url: url.to_string(),
            coords: form.all("coords[]").to_vec(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PublicSearchResponse {
    pub coordinates: Vec<Vec<f64>>,
    pub results: Vec<PublicResult>,
}

#[derive(Debug, Serialize)]
pub struct PublicResult {
    pub image_url: String,
    pub html_url: String,
}

impl PublicSearchResponse {
    /// Flattens the upstream shape into the public one. Order is preserved on
    /// both lists; empty upstream lists stay empty arrays.
    pub fn from_upstream(
        upstream: UpstreamSearchResponse,
        url_prefix: &str,
    ) -> PublicSearchResponse {
        PublicSearchResponse {
            coordinates: upstream
                .detected_objs
                .into_iter()
                .map(|obj| obj.loc)
                .collect(),
            results: upstream
                .results
                .into_iter()
                .map(|result| PublicResult {
                    image_url: result.url,
                    html_url: format!("{}{}", url_prefix, result.metadata),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please provide url")]
    MissingUrl,

    #[error("Please use POST")]
    WrongMethod,

    #[error("No such route")]
    UnknownRoute,

    /// Raw transport or decode error text, passed through to the caller.
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::Upstream(_) => StatusCode::BAD_REQUEST,
            ApiError::WrongMethod => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnknownRoute => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{DetectedObject, UpstreamResult};

    #[test]
    fn form_values_keeps_repeated_keys_in_order() {
        let form = FormValues::parse(
            b"url=http%3A%2F%2Fa.jpg&coords%5B%5D=1&coords%5B%5D=2&coords%5B%5D=3&coords%5B%5D=4",
        );
        assert_eq!(form.first("url"), Some("http://a.jpg"));
        assert_eq!(form.all("coords[]"), ["1", "2", "3", "4"]);
        assert!(form.all("missing").is_empty());
        assert_eq!(form.first("missing"), None);
    }

    #[test]
    fn form_values_accepts_unescaped_brackets() {
        let form = FormValues::parse(b"coords[]=7&coords[]=8");
        assert_eq!(form.all("coords[]"), ["7", "8"]);
    }

    #[test]
    fn form_dump_serializes_as_key_to_value_lists() {
        let form = FormValues::parse(b"url=x&coords%5B%5D=1&coords%5B%5D=2");
        let dump = serde_json::to_string(&form).unwrap();
        assert_eq!(dump, r#"{"coords[]":["1","2"],"url":["x"]}"#);
    }

    #[test]
    fn search_request_trims_url() {
        let form = FormValues::parse(b"url=+%09http%3A%2F%2Fa.jpg++");
        let request = SearchRequest::from_form(&form).unwrap();
        assert_eq!(request.url, "http://a.jpg");
        assert!(request.coords.is_empty());
    }

    #[test]
    fn search_request_rejects_missing_or_blank_url() {
        for body in [&b""[..], b"coords%5B%5D=1", b"url=", b"url=+++"] {
            let form = FormValues::parse(body);
            assert!(matches!(
                SearchRequest::from_form(&form),
                Err(ApiError::MissingUrl)
            ));
        }
    }

    fn upstream_fixture() -> UpstreamSearchResponse {
        UpstreamSearchResponse {
            detected_objs: vec![
                DetectedObject {
                    loc: vec![1.0, 2.0, 3.0, 4.0],
                },
                DetectedObject {
                    loc: vec![5.0, 6.0, 7.0, 8.0],
                },
            ],
            results: vec![
                UpstreamResult {
                    metadata: "/p/1".to_string(),
                    score: 0.9,
                    url: "http://img/1.jpg".to_string(),
                },
                UpstreamResult {
                    metadata: "/p/2".to_string(),
                    score: 0.5,
                    url: "http://img/2.jpg".to_string(),
                },
            ],
            time: "0.1".to_string(),
            r#type: vec![],
        }
    }

    #[test]
    fn remap_preserves_order_and_prepends_prefix() {
        let public = PublicSearchResponse::from_upstream(upstream_fixture(), "https://site.com");
        assert_eq!(
            public.coordinates,
            [[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]
        );
        assert_eq!(public.results[0].image_url, "http://img/1.jpg");
        assert_eq!(public.results[0].html_url, "https://site.com/p/1");
        assert_eq!(public.results[1].html_url, "https://site.com/p/2");
    }

    #[test]
    fn remap_of_empty_upstream_serializes_to_empty_arrays() {
        let empty: UpstreamSearchResponse = serde_json::from_str("{}").unwrap();
        let public = PublicSearchResponse::from_upstream(empty, "https://site.com");
        let body = serde_json::to_string(&public).unwrap();
        assert_eq!(body, r#"{"coordinates":[],"results":[]}"#);
    }

    #[test]
    fn error_responses_carry_the_right_status() {
        assert_eq!(
            ApiError::MissingUrl.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::WrongMethod.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::UnknownRoute.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upstream("connection refused".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
