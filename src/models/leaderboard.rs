use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One ranked row of the launchpad leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub rank: i64,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub full_name: String,
    pub karma: i64,
    #[serde(skip_serializing)]
    pub last_activity: Option<DateTime<Utc>>,
    pub org: Option<String>,
    pub district_name: Option<String>,
    pub state: Option<String>,
}
