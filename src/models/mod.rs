//! Data models for wallet operations and API bodies.

/// Operation types and wallet request/response bodies
pub mod wallet;
