//! REST API client module for the blood-donation backend.
//!
//! This module provides the `ApiClient` for talking to the service:
//! login/registration, donor profiles, donations, blood requests, bank
//! inventories and the admin dashboard.
//!
//! Authentication uses a short-lived JWT access token with a silent
//! refresh: any request that comes back 401 is retried exactly once after
//! minting a new access token from the stored refresh token.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
