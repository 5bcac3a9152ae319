// Activity feed helpers.
// Describes public events and buckets push commits into a 12 month history.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::github::ActivityEvent;

/// Months shown in the commit history.
pub const HISTORY_MONTHS: i32 = 12;

/// Human phrase for a GitHub event kind, e.g. "Pushed code to".
pub fn describe_event(kind: &str) -> &str {
    match kind {
        "PushEvent" => "Pushed code to",
        "CreateEvent" => "Created",
        "PullRequestEvent" => "Opened pull request in",
        "IssueCommentEvent" => "Commented on issue in",
        "IssuesEvent" => "Opened/closed issue in",
        "WatchEvent" => "Starred",
        "ForkEvent" => "Forked",
        other => other,
    }
}

/// Commit count for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCommits {
    /// e.g. "Jan 2026"
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub commits: u32,
}

/// Push commits per month for the twelve months ending with `now`'s month,
/// oldest first. Months without pushes are present with zero commits.
pub fn monthly_commits(events: &[ActivityEvent], now: DateTime<Utc>) -> Vec<MonthlyCommits> {
    let mut by_month: HashMap<(i32, u32), u32> = HashMap::new();
    for event in events.iter().filter(|e| e.kind == "PushEvent") {
        let key = (event.created_at.year(), event.created_at.month());
        *by_month.entry(key).or_default() += event.commits;
    }

    let current = now.year() * 12 + now.month0() as i32;
    ((current - HISTORY_MONTHS + 1)..=current)
        .map(|index| {
            let year = index.div_euclid(12);
            let month = index.rem_euclid(12) as u32 + 1;
            MonthlyCommits {
                label: month_label(year, month),
                year,
                month,
                commits: by_month.get(&(year, month)).copied().unwrap_or(0),
            }
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}
