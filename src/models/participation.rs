use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participation {
    pub id: i64,
    pub name: String,
    pub mobile: String,
    pub quiz_id: i32,
    pub score: i32,
    pub time_taken_seconds: i32,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipation {
    pub name: String,
    pub mobile: String,
    pub quiz_id: i32,
    pub score: i32,
    pub time_taken_seconds: i32,
}
