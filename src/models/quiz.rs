use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A quiz as listed to a participant, with their completion flag.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizSummary {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// A question with its option texts. Correctness is never loaded here.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PoolQuestion {
    pub id: i32,
    pub question_text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub options: Vec<NewOption>,
}

#[derive(Debug, Clone)]
pub struct NewOption {
    pub option_text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub name: String,
    pub description: Option<String>,
    pub questions: Vec<NewQuestion>,
}
