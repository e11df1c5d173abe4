use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::participation::{NewParticipation, Participation};
use crate::models::quiz::{NewQuiz, PoolQuestion, Quiz, QuizSummary};

/// Storage capability used by the quiz flow. Handlers receive it through
/// application state so tests can substitute an in-memory implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// All quizzes, flagged `completed` when `mobile` already has a participation.
    async fn list_quizzes(&self, mobile: &str) -> Result<Vec<QuizSummary>>;

    /// Every question of the quiz with its option texts, without correctness.
    async fn question_pool(&self, quiz_id: i32) -> Result<Vec<PoolQuestion>>;

    /// Whether `option_text` is the correct option of `question_id` within `quiz_id`.
    async fn is_correct_answer(&self, quiz_id: i32, question_id: i32, option_text: &str)
        -> Result<bool>;

    /// Inserts a participation. A second row for the same (mobile, quiz) must
    /// fail with `Error::Conflict` and leave the first row untouched.
    async fn insert_participation(&self, participation: NewParticipation) -> Result<Participation>;

    /// Participations of a quiz in leaderboard order.
    async fn participations(&self, quiz_id: i32) -> Result<Vec<Participation>>;

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz>;
}

#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn list_quizzes(&self, mobile: &str) -> Result<Vec<QuizSummary>> {
        let rows = sqlx::query_as::<_, QuizSummary>(
            r#"
            SELECT q.id, q.name, q.description,
                   EXISTS (
                       SELECT 1 FROM participations p
                       WHERE p.quiz_id = q.id AND p.mobile = $1
                   ) AS completed
            FROM quizzes q
            ORDER BY q.id
            "#,
        )
        .bind(mobile)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn question_pool(&self, quiz_id: i32) -> Result<Vec<PoolQuestion>> {
        let rows = sqlx::query_as::<_, PoolQuestion>(
            r#"
            SELECT q.id, q.question_text,
                   COALESCE(
                       array_agg(o.option_text ORDER BY o.id) FILTER (WHERE o.id IS NOT NULL),
                       '{}'::text[]
                   ) AS options
            FROM questions q
            LEFT JOIN options o ON o.question_id = q.id
            WHERE q.quiz_id = $1
            GROUP BY q.id, q.question_text
            ORDER BY q.id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn is_correct_answer(
        &self,
        quiz_id: i32,
        question_id: i32,
        option_text: &str,
    ) -> Result<bool> {
        let correct: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT o.is_correct
            FROM options o
            JOIN questions q ON q.id = o.question_id
            WHERE q.quiz_id = $1 AND o.question_id = $2 AND o.option_text = $3
            "#,
        )
        .bind(quiz_id)
        .bind(question_id)
        .bind(option_text)
        .fetch_optional(&self.pool)
        .await?;
        Ok(correct.unwrap_or(false))
    }

    async fn insert_participation(&self, participation: NewParticipation) -> Result<Participation> {
        let row = sqlx::query_as::<_, Participation>(
            r#"
            INSERT INTO participations (name, mobile, quiz_id, score, time_taken_seconds)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(participation.name)
        .bind(participation.mobile)
        .bind(participation.quiz_id)
        .bind(participation.score)
        .bind(participation.time_taken_seconds)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn participations(&self, quiz_id: i32) -> Result<Vec<Participation>> {
        let rows = sqlx::query_as::<_, Participation>(
            r#"
            SELECT * FROM participations
            WHERE quiz_id = $1
            ORDER BY score DESC, time_taken_seconds ASC, submitted_at ASC, id ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Quiz>(
            r#"INSERT INTO quizzes (name, description) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(&quiz.name)
        .bind(&quiz.description)
        .fetch_one(&mut *tx)
        .await?;

        for question in &quiz.questions {
            let question_id: i32 = sqlx::query_scalar(
                r#"INSERT INTO questions (quiz_id, question_text) VALUES ($1, $2) RETURNING id"#,
            )
            .bind(created.id)
            .bind(&question.question_text)
            .fetch_one(&mut *tx)
            .await?;

            for option in &question.options {
                sqlx::query(
                    r#"INSERT INTO options (question_id, option_text, is_correct) VALUES ($1, $2, $3)"#,
                )
                .bind(question_id)
                .bind(&option.option_text)
                .bind(option.is_correct)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(created)
    }
}
