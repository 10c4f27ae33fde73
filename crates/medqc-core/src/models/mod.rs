//! Data models for the QC backend's request and response payloads.
//!
//! - Auth: `LoginRequest`, `LoginResponse`, `RegisterRequest`, `RegisterResponse`
//! - Quality: `HemorrhagePrediction`, `HemorrhageRecord`, `ScanMetadata`
//! - Summary: `SummaryStats`, `IssueTrend`, `DistributionEntry`, `RecentIssues`

pub mod auth;
pub mod quality;
pub mod summary;

pub use auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
pub use quality::{
    HemorrhageBase64Request, HemorrhagePrediction, HemorrhageProbability, HemorrhageRecord,
    ScanMetadata,
};
pub use summary::{DistributionEntry, IssueTrend, RecentIssue, RecentIssues, RecentIssuesQuery, SummaryStats};
