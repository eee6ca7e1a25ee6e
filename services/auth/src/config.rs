/// Auth service configuration loaded from environment variables.
///
/// Both signing secrets are required — the service fails fast at startup
/// instead of falling back to a baked-in development key.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing web and mobile access tokens.
    pub jwt_secret: String,
    /// Separate HMAC secret for signing mobile refresh tokens.
    pub jwt_refresh_secret: String,
    /// Access-token lifetime in seconds (default 900 = 15 minutes).
    /// Env var: `JWT_ACCESS_EXPIRY_SECS`.
    pub jwt_access_expiry_secs: u64,
    /// Refresh-token lifetime in seconds (default 604800 = 7 days).
    /// Env var: `JWT_REFRESH_EXPIRY_SECS`.
    pub jwt_refresh_expiry_secs: u64,
    /// Web-token lifetime in seconds (default 604800 = 7 days).
    /// Env var: `JWT_WEB_EXPIRY_SECS`.
    pub jwt_web_expiry_secs: u64,
    /// Cookie domain attribute (root domain, e.g. "example.com").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    pub auth_port: u16,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            jwt_refresh_secret: std::env::var("JWT_REFRESH_SECRET").expect("JWT_REFRESH_SECRET"),
            jwt_access_expiry_secs: expiry_secs(
                "JWT_ACCESS_EXPIRY_SECS",
                std::env::var("JWT_ACCESS_EXPIRY_SECS").ok(),
                900,
            ),
            jwt_refresh_expiry_secs: expiry_secs(
                "JWT_REFRESH_EXPIRY_SECS",
                std::env::var("JWT_REFRESH_EXPIRY_SECS").ok(),
                604_800,
            ),
            jwt_web_expiry_secs: expiry_secs(
                "JWT_WEB_EXPIRY_SECS",
                std::env::var("JWT_WEB_EXPIRY_SECS").ok(),
                604_800,
            ),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3112),
        }
    }
}

/// Absent means the default. Present but unparsable is a configuration error
/// and stops startup, same as a missing secret.
fn expiry_secs(name: &str, value: Option<String>, default: u64) -> u64 {
    match value {
        Some(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a whole number of seconds, got {raw:?}")),
        None => default,
    }
}
