use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::dto::quiz_dto::{
    CreateQuizPayload, LeaderboardEntryResponse, QuizCreatedResponse, QuizListQuery,
    QuizSummaryResponse, SessionQuestionResponse, StartQuizRequest, SubmitQuizRequest,
    SubmitQuizResponse,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Principal;
use crate::utils::validation::require_mobile;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/quizzes",
    params(
        ("mobile" = String, Query, description = "Participant mobile number, 10 digits")
    ),
    responses(
        (status = 200, description = "Quizzes with completion flags", body = Json<Vec<QuizSummaryResponse>>),
        (status = 400, description = "Missing or malformed mobile")
    )
)]
#[axum::debug_handler]
pub async fn list_quizzes(
    State(state): State<AppState>,
    query: std::result::Result<Query<QuizListQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let mobile = query
        .mobile
        .ok_or_else(|| Error::BadRequest("mobile is required".to_string()))?;
    let quizzes = state.quiz_service.list_quizzes(&mobile).await?;
    let body: Vec<QuizSummaryResponse> = quizzes.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/start",
    request_body = StartQuizRequest,
    responses(
        (status = 200, description = "Sampled questions with shuffled options", body = Json<Vec<SessionQuestionResponse>>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Quiz has no questions")
    )
)]
#[axum::debug_handler]
pub async fn start_quiz(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StartQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload?;
    req.validate()?;
    require_mobile(&req.user.mobile)?;

    let session = state.quiz_service.start_session(req.quiz_id).await?;
    let body: Vec<SessionQuestionResponse> = session.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/submit",
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, description = "Submission scored", body = Json<SubmitQuizResponse>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Already submitted for this mobile and quiz")
    )
)]
#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubmitQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload?;
    req.validate()?;
    let score = state.quiz_service.submit(req.into()).await?;
    Ok(Json(SubmitQuizResponse { score }))
}

#[utoipa::path(
    get,
    path = "/api/leaderboard/{quiz_id}",
    params(
        ("quiz_id" = i32, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Ranked participations", body = Json<Vec<LeaderboardEntryResponse>>),
        (status = 400, description = "Quiz ID is not numeric")
    )
)]
#[axum::debug_handler]
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse> {
    let quiz_id: i32 = quiz_id
        .parse()
        .map_err(|_| Error::BadRequest("quizId must be numeric".to_string()))?;
    let entries = state.quiz_service.leaderboard(quiz_id).await?;
    let body: Vec<LeaderboardEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/admin/quizzes",
    request_body = CreateQuizPayload,
    responses(
        (status = 201, description = "Quiz created", body = Json<QuizCreatedResponse>),
        (status = 400, description = "Invalid quiz definition"),
        (status = 403, description = "Missing quizzes:write")
    )
)]
#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: std::result::Result<Json<CreateQuizPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let question_count = payload.questions.len();
    let quiz = state.quiz_service.create_quiz(payload.into()).await?;
    tracing::info!(quiz_id = quiz.id, created_by = %principal.id, "quiz created via admin API");
    Ok((
        StatusCode::CREATED,
        Json(QuizCreatedResponse::new(quiz, question_count)),
    ))
}
