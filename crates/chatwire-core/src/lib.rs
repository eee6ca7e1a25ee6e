//! Service plumbing shared across Chatwire services.
//!
//! Provides health-check handlers, the request-id middleware layer, and
//! tracing initialization.

pub mod health;
pub mod middleware;
pub mod tracing;
