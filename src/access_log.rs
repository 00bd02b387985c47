use std::time::Instant;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use crate::api::models::FormValues;

/// Upper bound on how much request body the form dump will buffer.
const MAX_FORM_BYTES: usize = 10 << 20;

/// Emits one access line per request: client ip (X-Real-Ip, empty when no
/// fronting balancer set it), latency, status, method, path and the submitted
/// form values.
pub async fn access_log(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().to_string();
    let client_ip = request
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // The body can only be read once, so buffer it for the form dump and hand
    // the handler a rebuilt request.
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .unwrap_or_default();
    let form = FormValues::parse(&bytes);
    let request = Request::from_parts(parts, Body::from(bytes));

    let response = next.run(request).await;

    let form_dump = serde_json::to_string(&form).unwrap_or_else(|_| "{}".to_string());
    tracing::info!(
        target: "access",
        "[{client_ip}] [{:?}] {} {method} {path} {form_dump}",
        start.elapsed(),
        response.status().as_u16(),
    );
    response
}
