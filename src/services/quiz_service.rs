use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::database::quiz_store::QuizStore;
use crate::error::{Error, Result};
use crate::models::participation::{NewParticipation, Participation};
use crate::models::quiz::{NewQuiz, PoolQuestion, Quiz, QuizSummary};
use crate::utils::validation::{require_mobile, require_non_blank};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuestion {
    pub id: i32,
    pub question_text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub mobile: String,
}

#[derive(Debug, Clone)]
pub struct SubmittedAnswer {
    pub question_id: i32,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub participant: Participant,
    pub quiz_id: i32,
    pub answers: Vec<SubmittedAnswer>,
    pub time_taken_seconds: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub name: String,
    pub score: i32,
    pub time_taken_seconds: i32,
    pub rank: usize,
}

#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn QuizStore>,
    question_count: usize,
}

impl QuizService {
    pub fn new(store: Arc<dyn QuizStore>, question_count: usize) -> Self {
        Self {
            store,
            question_count: question_count.max(1),
        }
    }

    pub async fn list_quizzes(&self, mobile: &str) -> Result<Vec<QuizSummary>> {
        require_mobile(mobile)?;
        self.store.list_quizzes(mobile).await
    }

    pub async fn start_session(&self, quiz_id: i32) -> Result<Vec<SessionQuestion>> {
        let pool = self.store.question_pool(quiz_id).await?;
        let session = sample_session(pool, self.question_count, &mut rand::thread_rng())?;
        tracing::info!(quiz_id, questions = session.len(), "quiz session started");
        Ok(session)
    }

    /// Scores the answers and records the participation. The insert is the
    /// gate: a second submission for the same (mobile, quiz) is a conflict.
    pub async fn submit(&self, submission: Submission) -> Result<i32> {
        let Submission {
            participant,
            quiz_id,
            answers,
            time_taken_seconds,
        } = submission;
        require_non_blank("name", &participant.name)?;
        require_mobile(&participant.mobile)?;
        if time_taken_seconds < 0 {
            return Err(Error::BadRequest("timeTaken must not be negative".to_string()));
        }

        let mut answered = HashSet::new();
        let mut score = 0;
        for answer in &answers {
            // only the first answer to a question counts
            if !answered.insert(answer.question_id) {
                continue;
            }
            if self
                .store
                .is_correct_answer(quiz_id, answer.question_id, &answer.answer)
                .await?
            {
                score += 1;
            }
        }

        let inserted = self
            .store
            .insert_participation(NewParticipation {
                name: participant.name.trim().to_string(),
                mobile: participant.mobile.clone(),
                quiz_id,
                score,
                time_taken_seconds,
            })
            .await;

        match inserted {
            Ok(row) => {
                tracing::info!(quiz_id, participation_id = row.id, score, "quiz submission scored");
                Ok(score)
            }
            Err(Error::Conflict(_)) => {
                tracing::warn!(quiz_id, mobile = %participant.mobile, "duplicate quiz submission rejected");
                Err(Error::Conflict(
                    "This quiz has already been submitted for this mobile number".to_string(),
                ))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn leaderboard(&self, quiz_id: i32) -> Result<Vec<RankedEntry>> {
        let rows = self.store.participations(quiz_id).await?;
        Ok(rank_participations(rows))
    }

    pub async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        validate_new_quiz(&quiz)?;
        self.store.create_quiz(quiz).await
    }
}

/// Picks up to `count` questions at random and shuffles each one's options.
pub fn sample_session<R: Rng + ?Sized>(
    pool: Vec<PoolQuestion>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<SessionQuestion>> {
    if pool.is_empty() {
        return Err(Error::NotFound("No questions found for this quiz".to_string()));
    }

    let mut picked: Vec<PoolQuestion> = pool.choose_multiple(rng, count).cloned().collect();
    picked.shuffle(rng);

    Ok(picked
        .into_iter()
        .map(|q| {
            let mut options = q.options;
            options.shuffle(rng);
            SessionQuestion {
                id: q.id,
                question_text: q.question_text,
                options,
            }
        })
        .collect())
}

fn leaderboard_order(a: &Participation, b: &Participation) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.time_taken_seconds.cmp(&b.time_taken_seconds))
        .then(a.submitted_at.cmp(&b.submitted_at))
        .then(a.id.cmp(&b.id))
}

/// Orders by score descending, time ascending, then earliest submission,
/// and assigns 1-based ranks. Every row gets a distinct rank.
pub fn rank_participations(mut rows: Vec<Participation>) -> Vec<RankedEntry> {
    rows.sort_by(leaderboard_order);
    rows.into_iter()
        .enumerate()
        .map(|(idx, p)| RankedEntry {
            name: p.name,
            score: p.score,
            time_taken_seconds: p.time_taken_seconds,
            rank: idx + 1,
        })
        .collect()
}

fn validate_new_quiz(quiz: &NewQuiz) -> Result<()> {
    require_non_blank("name", &quiz.name)?;
    for (idx, question) in quiz.questions.iter().enumerate() {
        let position = idx + 1;
        require_non_blank("questionText", &question.question_text)?;
        if question.options.is_empty() {
            return Err(Error::BadRequest(format!(
                "question {} must have at least one option",
                position
            )));
        }
        let correct = question.options.iter().filter(|o| o.is_correct).count();
        if correct != 1 {
            return Err(Error::BadRequest(format!(
                "question {} must have exactly one correct option, found {}",
                position, correct
            )));
        }
        let mut texts = HashSet::new();
        for option in &question.options {
            require_non_blank("option text", &option.option_text)?;
            if !texts.insert(option.option_text.as_str()) {
                return Err(Error::BadRequest(format!(
                    "question {} has duplicate option '{}'",
                    position, option.option_text
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::quiz_store::MockQuizStore;
    use crate::models::quiz::{NewOption, NewQuestion};
    use chrono::{Duration, Utc};
    use mockall::predicate::{always, eq};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn service(store: MockQuizStore) -> QuizService {
        QuizService::new(Arc::new(store), 5)
    }

    fn pool_question(id: i32, options: &[&str]) -> PoolQuestion {
        PoolQuestion {
            id,
            question_text: format!("Question {}", id),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    fn participation(id: i64, name: &str, score: i32, time: i32) -> Participation {
        Participation {
            id,
            name: name.to_string(),
            mobile: format!("{:010}", id),
            quiz_id: 1,
            score,
            time_taken_seconds: time,
            submitted_at: Utc::now() + Duration::seconds(id),
        }
    }

    fn submission(answers: Vec<(i32, &str)>) -> Submission {
        Submission {
            participant: Participant {
                name: "Ada".to_string(),
                mobile: "9876543210".to_string(),
            },
            quiz_id: 7,
            answers: answers
                .into_iter()
                .map(|(question_id, answer)| SubmittedAnswer {
                    question_id,
                    answer: answer.to_string(),
                })
                .collect(),
            time_taken_seconds: 42,
        }
    }

    #[test]
    fn session_is_a_bounded_subset_with_all_options() {
        let pool: Vec<_> = (1..=8).map(|id| pool_question(id, &["a", "b", "c", "d"])).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let session = sample_session(pool, 5, &mut rng).unwrap();

        assert_eq!(session.len(), 5);
        let ids: HashSet<_> = session.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 5);
        for q in &session {
            let mut opts = q.options.clone();
            opts.sort();
            assert_eq!(opts, vec!["a", "b", "c", "d"]);
        }
    }

    #[test]
    fn small_pools_are_served_whole() {
        let pool = vec![pool_question(1, &["x"]), pool_question(2, &["y", "z"])];
        let session = sample_session(pool, 5, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn empty_pool_is_not_found() {
        let err = sample_session(Vec::new(), 5, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn leaderboard_breaks_score_ties_on_time() {
        let rows = vec![
            participation(1, "A", 5, 30),
            participation(2, "B", 5, 20),
            participation(3, "C", 3, 10),
        ];

        let ranked = rank_participations(rows);

        let order: Vec<_> = ranked.iter().map(|e| (e.name.as_str(), e.rank)).collect();
        assert_eq!(order, vec![("B", 1), ("A", 2), ("C", 3)]);
    }

    #[test]
    fn identical_score_and_time_rank_by_submission_order() {
        let rows = vec![participation(9, "Late", 4, 15), participation(2, "Early", 4, 15)];
        let ranked = rank_participations(rows);
        assert_eq!(ranked[0].name, "Early");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
    }

    #[tokio::test]
    async fn score_counts_correct_answers_in_any_order() {
        let mut store = MockQuizStore::new();
        store
            .expect_is_correct_answer()
            .returning(|_, question_id, answer| Ok(answer == format!("right-{}", question_id)));
        store
            .expect_insert_participation()
            .withf(|p| p.score == 3 && p.mobile == "9876543210" && p.quiz_id == 7)
            .times(1)
            .returning(|p| {
                Ok(Participation {
                    id: 1,
                    name: p.name,
                    mobile: p.mobile,
                    quiz_id: p.quiz_id,
                    score: p.score,
                    time_taken_seconds: p.time_taken_seconds,
                    submitted_at: Utc::now(),
                })
            });

        let score = service(store)
            .submit(submission(vec![
                (5, "right-5"),
                (1, "wrong"),
                (3, "right-3"),
                (2, "right-2"),
                (4, "nope"),
            ]))
            .await
            .unwrap();

        assert_eq!(score, 3);
    }

    #[tokio::test]
    async fn repeated_answers_to_one_question_count_once() {
        let mut store = MockQuizStore::new();
        store
            .expect_is_correct_answer()
            .with(eq(7), eq(1), always())
            .times(1)
            .returning(|_, _, _| Ok(true));
        store
            .expect_insert_participation()
            .withf(|p| p.score == 1)
            .returning(|p| {
                Ok(Participation {
                    id: 1,
                    name: p.name,
                    mobile: p.mobile,
                    quiz_id: p.quiz_id,
                    score: p.score,
                    time_taken_seconds: p.time_taken_seconds,
                    submitted_at: Utc::now(),
                })
            });

        let score = service(store)
            .submit(submission(vec![(1, "a"), (1, "a"), (1, "b")]))
            .await
            .unwrap();
        assert_eq!(score, 1);
    }

    #[tokio::test]
    async fn duplicate_submission_is_a_conflict() {
        let mut store = MockQuizStore::new();
        store.expect_is_correct_answer().returning(|_, _, _| Ok(false));
        store
            .expect_insert_participation()
            .returning(|_| Err(Error::Conflict("uq_participations_mobile_quiz".to_string())));

        let err = service(store).submit(submission(vec![(1, "a")])).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn submission_to_missing_quiz_is_not_found() {
        let mut store = MockQuizStore::new();
        store.expect_is_correct_answer().returning(|_, _, _| Ok(false));
        store
            .expect_insert_participation()
            .returning(|_| Err(Error::NotFound("Quiz not found".to_string())));

        let err = service(store).submit(submission(vec![(1, "a")])).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_mobile_never_reaches_the_store() {
        let store = MockQuizStore::new();
        let mut bad = submission(vec![]);
        bad.participant.mobile = "12345".to_string();

        let err = service(store).submit(bad).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn listing_requires_a_ten_digit_mobile() {
        let store = MockQuizStore::new();
        tokio_test::assert_err!(service(store).list_quizzes("123456789").await);
    }

    #[tokio::test]
    async fn start_session_without_questions_is_not_found() {
        let mut store = MockQuizStore::new();
        store
            .expect_question_pool()
            .with(eq(3))
            .returning(|_| Ok(Vec::new()));

        let err = service(store).start_session(3).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn quiz_questions_need_exactly_one_correct_option() {
        let store = MockQuizStore::new();
        let quiz = NewQuiz {
            name: "Capitals".to_string(),
            description: None,
            questions: vec![NewQuestion {
                question_text: "Capital of France?".to_string(),
                options: vec![
                    NewOption {
                        option_text: "Paris".to_string(),
                        is_correct: true,
                    },
                    NewOption {
                        option_text: "Lyon".to_string(),
                        is_correct: true,
                    },
                ],
            }],
        };

        let err = service(store).create_quiz(quiz).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn quiz_questions_need_options() {
        let store = MockQuizStore::new();
        let quiz = NewQuiz {
            name: "Empty".to_string(),
            description: None,
            questions: vec![NewQuestion {
                question_text: "Anything?".to_string(),
                options: Vec::new(),
            }],
        };
        assert!(service(store).create_quiz(quiz).await.is_err());
    }
}
