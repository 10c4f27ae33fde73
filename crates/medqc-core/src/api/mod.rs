//! REST API client module for the medical QC backend.
//!
//! `ApiClient` is the single request pipeline every call goes through. The
//! typed callers live next to it, grouped by backend area:
//!
//! - `auth`: login, register, logout
//! - `quality`: hemorrhage detection (upload or base64) and history
//! - `summary`: issue statistics, trend, distribution, recent issues
//!
//! Authentication is a bearer token from `/auth/login`, kept in the
//! `SessionStore` the client was built with.

pub mod auth;
pub mod client;
pub mod error;
pub mod quality;
pub mod summary;

pub use client::{ApiClient, RequestBody, RequestOptions};
pub use error::ApiError;
