use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::quiz::{NewOption, NewQuestion, NewQuiz, Quiz, QuizSummary};
use crate::services::quiz_service::{
    Participant, RankedEntry, SessionQuestion, Submission, SubmittedAnswer,
};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct QuizListQuery {
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(equal = 10))]
    pub mobile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizRequest {
    #[validate(nested)]
    pub user: UserPayload,
    pub quiz_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub question_id: i32,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[validate(nested)]
    pub user: UserPayload,
    pub answers: Vec<AnswerPayload>,
    #[validate(range(min = 0))]
    pub time_taken: i32,
    pub quiz_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummaryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuestionResponse {
    pub id: i32,
    pub question_text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryResponse {
    pub name: String,
    pub score: i32,
    pub time_taken: i32,
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptionPayload {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1))]
    pub question_text: String,
    #[validate(length(min = 1))]
    pub options: Vec<CreateOptionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizPayload {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<CreateQuestionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCreatedResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub question_count: usize,
}

impl From<UserPayload> for Participant {
    fn from(value: UserPayload) -> Self {
        Self {
            name: value.name,
            mobile: value.mobile,
        }
    }
}

impl From<SubmitQuizRequest> for Submission {
    fn from(value: SubmitQuizRequest) -> Self {
        Self {
            participant: value.user.into(),
            quiz_id: value.quiz_id,
            answers: value
                .answers
                .into_iter()
                .map(|a| SubmittedAnswer {
                    question_id: a.question_id,
                    answer: a.answer,
                })
                .collect(),
            time_taken_seconds: value.time_taken,
        }
    }
}

impl From<QuizSummary> for QuizSummaryResponse {
    fn from(value: QuizSummary) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            completed: value.completed,
        }
    }
}

impl From<SessionQuestion> for SessionQuestionResponse {
    fn from(value: SessionQuestion) -> Self {
        Self {
            id: value.id,
            question_text: value.question_text,
            options: value.options,
        }
    }
}

impl From<RankedEntry> for LeaderboardEntryResponse {
    fn from(value: RankedEntry) -> Self {
        Self {
            name: value.name,
            score: value.score,
            time_taken: value.time_taken_seconds,
            rank: value.rank,
        }
    }
}

impl From<CreateQuizPayload> for NewQuiz {
    fn from(value: CreateQuizPayload) -> Self {
        Self {
            name: value.name.trim().to_string(),
            description: value.description,
            questions: value
                .questions
                .into_iter()
                .map(|q| NewQuestion {
                    question_text: q.question_text,
                    options: q
                        .options
                        .into_iter()
                        .map(|o| NewOption {
                            option_text: o.text,
                            is_correct: o.is_correct,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl QuizCreatedResponse {
    pub fn new(quiz: Quiz, question_count: usize) -> Self {
        Self {
            id: quiz.id,
            name: quiz.name,
            description: quiz.description,
            question_count,
        }
    }
}
