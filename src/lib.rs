pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::database::quiz_store::{PgQuizStore, QuizStore};
use crate::services::{
    donation_service::DonationService, history_service::HistoryService,
    quiz_service::QuizService, vendor_service::VendorService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_secret: Arc<str>,
    pub quiz_service: QuizService,
    pub donation_service: DonationService,
    pub vendor_service: VendorService,
    pub history_service: HistoryService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let quiz_store = Arc::new(PgQuizStore::new(pool.clone()));
        Self::with_quiz_store(
            pool,
            quiz_store,
            config.quiz_question_count,
            &config.jwt_secret,
        )
    }

    /// Builds the state around an explicit quiz storage backend.
    pub fn with_quiz_store(
        pool: PgPool,
        quiz_store: Arc<dyn QuizStore>,
        quiz_question_count: usize,
        jwt_secret: &str,
    ) -> Self {
        Self {
            jwt_secret: Arc::from(jwt_secret),
            quiz_service: QuizService::new(quiz_store, quiz_question_count),
            donation_service: DonationService::new(pool.clone()),
            vendor_service: VendorService::new(pool.clone()),
            history_service: HistoryService::new(pool.clone()),
            pool,
        }
    }
}
