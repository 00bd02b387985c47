use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;

use super::AppState;
use super::models::{ApiError, FormValues, PublicSearchResponse, SearchRequest};

/// POST /SearchImageByURL: validate the form, query upstream, remap.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PublicSearchResponse>, ApiError> {
    let form = FormValues::parse(&body);
    let request = SearchRequest::from_form(&form)?;

    let upstream = state
        .upstream
        .search(&request.url, &request.coords)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(PublicSearchResponse::from_upstream(
        upstream,
        &state.url_prefix,
    )))
}

/// Any non-POST method on the search route.
pub async fn wrong_method() -> ApiError {
    ApiError::WrongMethod
}

/// Any path outside the search route.
pub async fn unknown_route() -> ApiError {
    ApiError::UnknownRoute
}
