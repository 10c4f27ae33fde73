use serde::{Deserialize, Serialize};

/// Headline figures of the issue dashboard
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_issues: u64,
    pub today_issues: u64,
    pub pending_issues: u64,
    /// Percent
    pub resolution_rate: f64,
    /// Hours
    pub avg_resolution_time: f64,
}

/// Daily issue counts, oldest first. The three vectors are parallel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IssueTrend {
    pub dates: Vec<String>,
    pub counts: Vec<u64>,
    pub solved: Vec<u64>,
}

impl IssueTrend {
    /// Iterate `(date, found, solved)` rows
    pub fn rows(&self) -> impl Iterator<Item = (&str, u64, u64)> {
        self.dates
            .iter()
            .zip(self.counts.iter())
            .zip(self.solved.iter())
            .map(|((d, c), s)| (d.as_str(), *c, *s))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistributionEntry {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentIssue {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub exam_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecentIssues {
    pub total: u64,
    pub items: Vec<RecentIssue>,
}

/// Paging and filters for the recent-issues list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentIssuesQuery {
    pub page: u32,
    pub limit: u32,
    pub query: Option<String>,
    pub status: Option<String>,
}

impl Default for RecentIssuesQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            query: None,
            status: None,
        }
    }
}
