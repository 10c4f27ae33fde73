use std::ops::RangeInclusive;

use crate::models::{DistributionEntry, IssueTrend, RecentIssues, RecentIssuesQuery, SummaryStats};

use super::{ApiClient, ApiError, RequestOptions};

/// Days the trend endpoint accepts
pub const TREND_DAYS: RangeInclusive<u32> = 1..=365;

/// Default trend window
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Largest page the recent-issues endpoint serves
pub const MAX_RECENT_LIMIT: u32 = 100;

impl ApiClient {
    pub async fn summary_stats(&self) -> Result<SummaryStats, ApiError> {
        self.get("/summary/stats", RequestOptions::default()).await
    }

    pub async fn issue_trend(&self, days: u32) -> Result<IssueTrend, ApiError> {
        if !TREND_DAYS.contains(&days) {
            return Err(ApiError::RequestConfig(format!(
                "Trend window must be between {} and {} days, got {}",
                TREND_DAYS.start(),
                TREND_DAYS.end(),
                days
            )));
        }
        let options = RequestOptions::default().with_query("days", days);
        self.get("/summary/trend", options).await
    }

    pub async fn issue_distribution(&self) -> Result<Vec<DistributionEntry>, ApiError> {
        self.get("/summary/distribution", RequestOptions::default()).await
    }

    pub async fn recent_issues(&self, query: &RecentIssuesQuery) -> Result<RecentIssues, ApiError> {
        if query.page == 0 || query.limit == 0 || query.limit > MAX_RECENT_LIMIT {
            return Err(ApiError::RequestConfig(format!(
                "Invalid page {} / limit {} (limit must be 1..={})",
                query.page, query.limit, MAX_RECENT_LIMIT
            )));
        }

        let mut options = RequestOptions::default()
            .with_query("page", query.page)
            .with_query("limit", query.limit);
        if let Some(ref q) = query.query {
            options = options.with_query("query", q);
        }
        if let Some(ref status) = query.status {
            options = options.with_query("status", status);
        }
        self.get("/summary/recent", options).await
    }
}
