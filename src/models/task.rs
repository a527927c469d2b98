use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub hashtag: String,
    pub event: Option<String>,
}

/// One karma award for a task. Counts toward totals only once appraised.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KarmaActivityLog {
    pub id: String,
    pub user_id: Option<String>,
    pub task_id: String,
    pub karma: i32,
    pub appraiser_approved: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl KarmaActivityLog {
    pub fn is_approved(&self) -> bool {
        self.appraiser_approved.unwrap_or(false)
    }
}
