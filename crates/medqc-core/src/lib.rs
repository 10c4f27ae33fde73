//! medqc-core - client core for the medical imaging quality-control service.
//!
//! This crate holds everything a front end needs to talk to the QC backend
//! without re-implementing authentication policy at each call site:
//!
//! - `auth`: tab-scoped session storage (`SessionStore`)
//! - `api`: the shared request pipeline (`ApiClient`) and typed API callers
//! - `router`: route table, navigation guard and the `Navigator` handle
//! - `models`: request/response payloads for auth, quality and summary
//! - `config`: pipeline configuration (base URL, timeout)
//!
//! Startup is two-phase: build the `ApiClient` first, then the `Router`, then
//! hand the router back to the client with `ApiClient::set_navigator`.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;

pub use api::{ApiClient, ApiError};
pub use auth::{MemoryStorage, SessionStorage, SessionStore};
pub use config::{Config, PipelineConfig};
pub use router::{Decision, NavigationGuard, Navigator, Router, View};
