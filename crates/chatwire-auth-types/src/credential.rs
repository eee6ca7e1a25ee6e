//! Bearer-credential extractor.

use axum::extract::FromRequestParts;
use axum_extra::extract::cookie::CookieJar;
use http::StatusCode;
use http::request::Parts;

use crate::cookie::CHATWIRE_ACCESS_TOKEN;

/// Raw access-token credential pulled from the request.
///
/// Sources, in order: the `chatwire_access_token` cookie (web clients), then
/// the `Authorization: Bearer` header (mobile clients). First present wins —
/// a request carries at most one transport for a credential.
///
/// Returns 401 if neither source is present. Signature and expiry are NOT
/// checked here; handlers validate the value against the user store.
#[derive(Debug, Clone)]
pub struct Credential(pub String);

impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let from_cookie = CookieJar::from_headers(&parts.headers)
            .get(CHATWIRE_ACCESS_TOKEN)
            .map(|c| c.value().to_owned());

        let from_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::to_owned);

        async move {
            from_cookie
                .or(from_header)
                .map(Self)
                .ok_or(StatusCode::UNAUTHORIZED)
        }
    }
}
