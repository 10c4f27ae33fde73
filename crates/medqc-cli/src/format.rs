//! Plain-text rendering of API payloads for the shell.

use medqc_core::models::{
    DistributionEntry, HemorrhagePrediction, HemorrhageRecord, IssueTrend, RecentIssues,
    SummaryStats,
};
use medqc_core::ApiError;

/// Truncate a string to `max_chars`, adding "..." if cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// User-facing message for a failed call
pub fn describe_error(err: &ApiError) -> String {
    match err {
        ApiError::AuthExpired => "Session expired - please log in again".to_string(),
        ApiError::Http { status, .. } => match err.detail() {
            Some(detail) => format!("Backend rejected the request ({}): {}", status, detail),
            None => format!("Backend returned {}", status),
        },
        ApiError::Network(_) => "Network error: cannot reach the backend".to_string(),
        ApiError::Timeout(after) => format!("Backend did not answer within {}s", after.as_secs()),
        ApiError::RequestConfig(msg) => format!("Invalid request: {}", msg),
        ApiError::InvalidResponse(msg) => format!("Unexpected response: {}", truncate(msg, 120)),
    }
}

pub fn stats(stats: &SummaryStats) -> String {
    format!(
        "Total issues:      {}\nToday:             {}\nPending:           {}\nResolution rate:   {:.1}%\nAvg. resolution:   {:.1} h",
        stats.total_issues,
        stats.today_issues,
        stats.pending_issues,
        stats.resolution_rate,
        stats.avg_resolution_time
    )
}

pub fn trend(trend: &IssueTrend) -> String {
    let mut out = format!("{:<8} {:>6} {:>6}", "Date", "Found", "Solved");
    for (date, found, solved) in trend.rows() {
        out.push_str(&format!("\n{:<8} {:>6} {:>6}", date, found, solved));
    }
    out
}

pub fn distribution(entries: &[DistributionEntry]) -> String {
    let total: u64 = entries.iter().map(|e| e.value).sum();
    entries
        .iter()
        .map(|e| {
            let pct = if total == 0 {
                0.0
            } else {
                e.value as f64 * 100.0 / total as f64
            };
            format!("{:>6}  {:>5.1}%  {}", e.value, pct, e.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn recent(recent: &RecentIssues) -> String {
    let mut out = format!("{} issues total", recent.total);
    for issue in &recent.items {
        out.push_str(&format!(
            "\n{:<20} {:<10} {:<10} {:<8} {}",
            truncate(&issue.id, 20),
            issue.exam_id.as_deref().unwrap_or("-"),
            truncate(&issue.kind, 10),
            issue.status,
            truncate(&issue.description, 40),
        ));
    }
    out
}

pub fn prediction(p: &HemorrhagePrediction) -> String {
    format!(
        "Result:      {} ({})\nConfidence:  {}\nP(bleed):    {:.4}\nP(clear):    {:.4}\nDuration:    {:.1} ms",
        p.prediction,
        if p.is_hemorrhage() { "hemorrhage" } else { "no hemorrhage" },
        p.confidence,
        p.probability.hemorrhage,
        p.probability.no_hemorrhage,
        p.duration_ms
    )
}

pub fn history(records: &[HemorrhageRecord]) -> String {
    if records.is_empty() {
        return "No detections recorded".to_string();
    }
    records
        .iter()
        .map(|r| {
            let when = r
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "#{:<5} {:<16} {:<10} {:<6} {:.3}",
                r.id,
                when,
                r.exam_id.as_deref().unwrap_or("-"),
                r.prediction,
                r.hemorrhage_probability
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer string", 10), "a much ...");
        assert_eq!(truncate("脑出血检测结果", 5), "脑出...");
    }

    #[test]
    fn test_distribution_percentages() {
        let entries = vec![
            DistributionEntry { name: "伪影问题".into(), value: 1 },
            DistributionEntry { name: "其他".into(), value: 3 },
        ];
        let out = distribution(&entries);
        assert!(out.contains("25.0%"));
        assert!(out.contains("75.0%"));
    }

    #[test]
    fn test_describe_auth_expired() {
        assert!(describe_error(&ApiError::AuthExpired).contains("log in"));
    }
}
