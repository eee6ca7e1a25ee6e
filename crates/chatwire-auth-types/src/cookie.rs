//! Cookie builder for the web access token.
//!
//! Browsers carry a single long-lived token in an HTTP-only, same-site
//! cookie; mobile clients receive their tokens in the response body and
//! never touch this module.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the web access token.
pub const CHATWIRE_ACCESS_TOKEN: &str = "chatwire_access_token";

/// Set the access-token cookie on the jar.
///
/// `max_age_secs` should match the configured web-token expiry so the cookie
/// and the JWT inside it expire together.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use chatwire_auth_types::cookie::{set_access_token_cookie, CHATWIRE_ACCESS_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "token_value".to_string(), "example.com".to_string(), 604800);
/// let cookie = jar.get(CHATWIRE_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(
    jar: CookieJar,
    value: String,
    domain: String,
    max_age_secs: u64,
) -> CookieJar {
    let cookie = Cookie::build((CHATWIRE_ACCESS_TOKEN, value))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(max_age_secs as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the access-token cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use chatwire_auth_types::cookie::{
///     clear_access_token_cookie, set_access_token_cookie, CHATWIRE_ACCESS_TOKEN,
/// };
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "a".to_string(), "example.com".to_string(), 604800);
/// let jar = clear_access_token_cookie(jar, "example.com".to_string());
/// let cookie = jar.get(CHATWIRE_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_access_token_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((CHATWIRE_ACCESS_TOKEN, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
