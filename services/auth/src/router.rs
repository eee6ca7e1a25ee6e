use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use chatwire_core::health;
use chatwire_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    otp::request_otp,
    session::me,
    token::{create_token, refresh_token, revoke_token},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        // OTP challenge
        .route("/auth/otp", post(request_otp))
        // Token
        .route("/auth/token", post(create_token))
        .route("/auth/token", patch(refresh_token))
        .route("/auth/token", delete(revoke_token))
        // Principal
        .route("/auth/me", get(me))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}
