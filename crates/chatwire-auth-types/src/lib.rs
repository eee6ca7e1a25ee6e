//! Auth types shared across Chatwire services.
//!
//! Provides JWT validation, the access-token cookie builders, and the
//! `Credential` extractor used by authenticated endpoints.

pub mod cookie;
pub mod credential;
pub mod token;
