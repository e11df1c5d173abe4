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

use crate::dto::history_dto::HistoryEntryResponse;
use crate::dto::vendor_dto::{
    CreateVendorPayload, UpdateVendorPayload, VendorListQuery, VendorListResponse, VendorResponse,
};
use crate::error::Result;
use crate::middleware::auth::Principal;
use crate::services::vendor_service::VENDOR_TABLE;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/vendors",
    responses(
        (status = 200, description = "Paginated vendors", body = Json<VendorListResponse>),
        (status = 400, description = "Malformed query string")
    )
)]
#[axum::debug_handler]
pub async fn list_vendors(
    State(state): State<AppState>,
    query: std::result::Result<Query<VendorListQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let list = state.vendor_service.list(query).await?;
    Ok(Json(VendorListResponse::from(list)))
}

#[utoipa::path(
    post,
    path = "/api/admin/vendors",
    request_body = CreateVendorPayload,
    responses(
        (status = 201, description = "Vendor created", body = Json<VendorResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_vendor(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: std::result::Result<Json<CreateVendorPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let vendor = state.vendor_service.create(payload).await?;
    tracing::info!(vendor_id = %vendor.id, created_by = %principal.id, "vendor created");
    Ok((StatusCode::CREATED, Json(VendorResponse::from(vendor))))
}

#[utoipa::path(
    get,
    path = "/api/admin/vendors/{id}",
    params(
        ("id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Vendor", body = Json<VendorResponse>),
        (status = 404, description = "Vendor not found")
    )
)]
#[axum::debug_handler]
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let vendor = state.vendor_service.get_by_id(id).await?;
    Ok(Json(VendorResponse::from(vendor)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/vendors/{id}",
    params(
        ("id" = Uuid, Path, description = "Vendor ID")
    ),
    request_body = UpdateVendorPayload,
    responses(
        (status = 200, description = "Vendor updated, changes logged", body = Json<VendorResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Vendor not found")
    )
)]
#[axum::debug_handler]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    payload: std::result::Result<Json<UpdateVendorPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let (vendor, _history) = state
        .vendor_service
        .update(id, payload, principal.id)
        .await?;
    Ok(Json(VendorResponse::from(vendor)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/vendors/{id}",
    params(
        ("id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 204, description = "Vendor soft-deleted"),
        (status = 404, description = "Vendor not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse> {
    state.vendor_service.soft_delete(id, principal.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/vendors/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Field-level change log, oldest first", body = Json<Vec<HistoryEntryResponse>>)
    )
)]
#[axum::debug_handler]
pub async fn vendor_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let rows = state.history_service.list(VENDOR_TABLE, id).await?;
    let body: Vec<HistoryEntryResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(body))
}
