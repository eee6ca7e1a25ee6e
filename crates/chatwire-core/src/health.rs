use axum::{Router, http::StatusCode, routing::get};

/// Liveness and readiness endpoints, mounted the same way on every service.
///
/// `/healthz` answers as long as the process is up; `/readyz` is a plain OK
/// until a service grows a real readiness probe to merge over it.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn readyz() -> StatusCode {
    StatusCode::OK
}
