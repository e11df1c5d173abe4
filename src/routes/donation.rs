use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::donation_dto::{
    CreateDonationPayload, DonationListQuery, DonationListResponse, DonationResponse,
    UpdateDonationPayload,
};
use crate::dto::history_dto::HistoryEntryResponse;
use crate::error::Result;
use crate::middleware::auth::Principal;
use crate::services::donation_service::DONATION_TABLE;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/donations",
    responses(
        (status = 200, description = "Paginated donations", body = Json<DonationListResponse>),
        (status = 400, description = "Malformed query string")
    )
)]
#[axum::debug_handler]
pub async fn list_donations(
    State(state): State<AppState>,
    query: std::result::Result<Query<DonationListQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let list = state.donation_service.list(query).await?;
    Ok(Json(DonationListResponse::from(list)))
}

#[utoipa::path(
    post,
    path = "/api/admin/donations",
    request_body = CreateDonationPayload,
    responses(
        (status = 201, description = "Donation recorded", body = Json<DonationResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_donation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: std::result::Result<Json<CreateDonationPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let donation = state.donation_service.create(payload).await?;
    tracing::info!(donation_id = %donation.id, created_by = %principal.id, "donation recorded");
    Ok((StatusCode::CREATED, Json(DonationResponse::from(donation))))
}

#[utoipa::path(
    get,
    path = "/api/admin/donations/{id}",
    params(
        ("id" = Uuid, Path, description = "Donation ID")
    ),
    responses(
        (status = 200, description = "Donation", body = Json<DonationResponse>),
        (status = 404, description = "Donation not found")
    )
)]
#[axum::debug_handler]
pub async fn get_donation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let donation = state.donation_service.get_by_id(id).await?;
    Ok(Json(DonationResponse::from(donation)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/donations/{id}",
    params(
        ("id" = Uuid, Path, description = "Donation ID")
    ),
    request_body = UpdateDonationPayload,
    responses(
        (status = 200, description = "Donation updated, changes logged", body = Json<DonationResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Donation not found")
    )
)]
#[axum::debug_handler]
pub async fn update_donation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    payload: std::result::Result<Json<UpdateDonationPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let (donation, _history) = state
        .donation_service
        .update(id, payload, principal.id)
        .await?;
    Ok(Json(DonationResponse::from(donation)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/donations/{id}",
    params(
        ("id" = Uuid, Path, description = "Donation ID")
    ),
    responses(
        (status = 204, description = "Donation soft-deleted"),
        (status = 404, description = "Donation not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_donation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse> {
    state.donation_service.soft_delete(id, principal.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/donations/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Donation ID")
    ),
    responses(
        (status = 200, description = "Field-level change log, oldest first", body = Json<Vec<HistoryEntryResponse>>)
    )
)]
#[axum::debug_handler]
pub async fn donation_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let rows = state.history_service.list(DONATION_TABLE, id).await?;
    let body: Vec<HistoryEntryResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(body))
}
