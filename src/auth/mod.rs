//! Authentication state: the persisted access/refresh token pair.
//!
//! `TokenStore` is the single writer of the token file. The API client
//! reads the bearer value from it at send time and drives the silent
//! refresh protocol through it; nothing else touches the stored pair.

pub mod tokens;

pub use tokens::TokenStore;
