use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::admin_code::{
    CreateAdminCodeRequest, ListAdminCodesQuery, NewAdminCode, VerifyCodeRequest,
    VerifyCodeResponse,
};
use crate::models::event::{CreateEventRequest, EventId};
use crate::models::Caller;
use crate::services::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, ApiPath};
use crate::utils::response::{created, message, success};

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "westside-server",
    };

    success(payload).into_response()
}

pub async fn verify_code(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyCodeRequest>,
) -> Result<Response, AppError> {
    let row = state.directory.verify(req.code.as_deref()).await?;
    Ok(success(VerifyCodeResponse::from(row)).into_response())
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.catalog.list_events().await?;
    Ok(success(events).into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<Response, AppError> {
    let id = state
        .catalog
        .create_event(
            req.event,
            req.created_by_code.as_deref(),
            req.created_by_name.as_deref(),
        )
        .await?;

    Ok(created(EventId { id }, "Event created successfully").into_response())
}

/// A missing or malformed body is an anonymous, non-main caller.
pub async fn delete_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    caller: Option<Json<Caller>>,
) -> Result<Response, AppError> {
    let caller = caller.map(|Json(c)| c).unwrap_or_else(Caller::anonymous);
    state.catalog.delete_event(id, &caller).await?;
    Ok(message("Event deleted successfully").into_response())
}

pub async fn create_admin_code(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateAdminCodeRequest>,
) -> Result<Response, AppError> {
    let caller = Caller {
        code: None,
        is_main_admin: req.is_main_admin,
    };
    let code = state
        .directory
        .create_sub_admin_code(&caller, req.sub_admin_name.as_deref())
        .await?;

    Ok(created(NewAdminCode { code }, "Admin code created successfully").into_response())
}

pub async fn list_admin_codes(
    State(state): State<AppState>,
    Query(query): Query<ListAdminCodesQuery>,
) -> Result<Response, AppError> {
    let caller = Caller::from_query_flag(query.is_main_admin.as_deref());
    let codes = state.directory.list_codes(&caller).await?;
    Ok(success(codes).into_response())
}

pub async fn delete_admin_code(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
    caller: Option<Json<Caller>>,
) -> Result<Response, AppError> {
    let caller = caller.map(|Json(c)| c).unwrap_or_else(Caller::anonymous);
    state.directory.delete_code(&caller, &code).await?;
    Ok(message("Admin code deleted successfully").into_response())
}
