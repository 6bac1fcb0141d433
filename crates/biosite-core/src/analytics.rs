//! Visit and click analytics
//!
//! Wraps the aggregate analytics endpoint. Lookups never fail: missing users,
//! missing sites and gateway errors all produce a zeroed report. When the
//! backend omits the per-day breakdown, an evenly distributed series is
//! derived from the totals.

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gateway::RemoteGateway;

/// Reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "last7")]
    Last7,
    #[serde(rename = "last30")]
    Last30,
    #[serde(rename = "lastYear")]
    LastYear,
}

impl TimeRange {
    /// Query value used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last7 => "last7",
            TimeRange::Last30 => "last30",
            TimeRange::LastYear => "lastYear",
        }
    }

    /// Number of points in a synthesized series
    fn data_points(&self) -> u32 {
        match self {
            TimeRange::Last7 => 7,
            TimeRange::Last30 => 30,
            TimeRange::LastYear => 12,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last7" | "7d" => Ok(TimeRange::Last7),
            "last30" | "30d" => Ok(TimeRange::Last30),
            "lastYear" | "year" => Ok(TimeRange::LastYear),
            other => Err(format!(
                "unknown time range '{}' (expected last7, last30 or lastYear)",
                other
            )),
        }
    }
}

/// Clicks on one link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickDetail {
    pub label: String,
    pub count: u64,
}

/// Views and clicks for one day (or month, for yearly reports)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub day: String,
    pub views: u64,
    pub clicks: u64,
}

/// Analytics payload as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPayload {
    #[serde(default)]
    pub biosite_slug: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub clicks: Option<u64>,
    #[serde(default)]
    pub click_details: Option<Vec<ClickDetail>>,
    #[serde(default)]
    pub daily_activity: Option<Vec<DailyActivity>>,
}

/// Report shown on the analytics page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub user_id: String,
    pub username: String,
    pub views: u64,
    pub clicks: u64,
    pub click_details: Vec<ClickDetail>,
    pub daily_activity: Vec<DailyActivity>,
    pub time_range: TimeRange,
}

impl AnalyticsReport {
    fn empty(user_id: &str, username: &str, time_range: TimeRange) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: username.to_string(),
            views: 0,
            clicks: 0,
            click_details: Vec::new(),
            daily_activity: Vec::new(),
            time_range,
        }
    }

    /// Click-through rate as a percentage of views
    pub fn click_rate(&self) -> f64 {
        if self.views == 0 {
            0.0
        } else {
            self.clicks as f64 * 100.0 / self.views as f64
        }
    }
}

/// Fetch the analytics report for a user
pub async fn fetch_report(
    gateway: &dyn RemoteGateway,
    user_id: &str,
    time_range: TimeRange,
) -> AnalyticsReport {
    fetch_report_on(gateway, user_id, time_range, Utc::now().date_naive()).await
}

async fn fetch_report_on(
    gateway: &dyn RemoteGateway,
    user_id: &str,
    time_range: TimeRange,
    today: NaiveDate,
) -> AnalyticsReport {
    if user_id.is_empty() {
        return AnalyticsReport::empty("", "No user", time_range);
    }

    let payload = match gateway.analytics(user_id, time_range).await {
        Ok(Some(payload)) => payload,
        Ok(None) => return AnalyticsReport::empty(user_id, "No Biosite", time_range),
        Err(e) => {
            warn!("Error fetching analytics: {}", e);
            return AnalyticsReport::empty(user_id, "Error", time_range);
        }
    };

    let views = payload.views.unwrap_or(0);
    let clicks = payload.clicks.unwrap_or(0);
    let daily_activity = payload
        .daily_activity
        .unwrap_or_else(|| synthesize_activity(views, clicks, time_range, today));

    AnalyticsReport {
        user_id: user_id.to_string(),
        username: payload
            .biosite_slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "user-biosite".to_string()),
        views,
        clicks,
        click_details: payload.click_details.unwrap_or_default(),
        daily_activity,
        time_range,
    }
}

/// Spread totals evenly over the range, oldest point first
///
/// Remainders go to the most recent points so the series sums to the totals.
fn synthesize_activity(
    views: u64,
    clicks: u64,
    time_range: TimeRange,
    today: NaiveDate,
) -> Vec<DailyActivity> {
    let points = time_range.data_points();
    (0..points)
        .map(|index| {
            let back = points - 1 - index;
            let day = match time_range {
                TimeRange::LastYear => today
                    .checked_sub_months(Months::new(back))
                    .unwrap_or(today)
                    .format("%b")
                    .to_string(),
                _ => (today - chrono::Duration::days(i64::from(back)))
                    .format("%a %-d")
                    .to_string(),
            };
            DailyActivity {
                day,
                views: share(views, points, index),
                clicks: share(clicks, points, index),
            }
        })
        .collect()
}

fn share(total: u64, points: u32, index: u32) -> u64 {
    let points = u64::from(points);
    let base = total / points;
    let remainder = total % points;
    // The last `remainder` points each get one extra
    if u64::from(index) >= points - remainder {
        base + 1
    } else {
        base
    }
}
