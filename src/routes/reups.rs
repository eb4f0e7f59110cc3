//! REST endpoints for ReUps, answering with the `{status, data}` envelope.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    dto::{
        IdInput,
        reups::{CreateReUpRequest, ReUpList, ReplaceReUpRequest, UpdateReUpRequest},
    },
    error::{AppError, LegacyError, LegacyResult},
    middleware::auth::Ctx,
    models::{ReUp, ReUpDetail, ReUpWithProducts},
    response::JsonEnvelope,
    services::reup_service,
    state::AppState,
    validation::decode,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reups).post(create_reup))
        .route(
            "/{id}",
            get(get_reup)
                .put(replace_reup)
                .patch(patch_reup)
                .delete(delete_reup),
        )
}

/// Rejected or missing credentials both answer 403 on these endpoints.
fn require_caller(ctx: Result<Ctx, AppError>) -> LegacyResult<Ctx> {
    let ctx = ctx?;
    ctx.require_user()?;
    Ok(ctx)
}

fn parse_id(raw: &str) -> LegacyResult<i32> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| LegacyError(AppError::Validation("Invalid id provided.".into())))
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> LegacyResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Validation("Missing required field(s) in request body.".into()).into());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| AppError::Validation(format!("invalid JSON body: {err}")))?;
    Ok(decode(value)?)
}

#[utoipa::path(
    get,
    path = "/api/reups",
    responses(
        (status = 200, description = "The caller's ReUps, newest first", body = JsonEnvelope<ReUpList>),
        (status = 403, description = "Not logged in"),
    ),
    security(("bearer_auth" = [])),
    tag = "ReUps"
)]
pub async fn list_reups(
    State(state): State<AppState>,
    ctx: Result<Ctx, AppError>,
) -> LegacyResult<Json<JsonEnvelope<ReUpList>>> {
    let ctx = require_caller(ctx)?;
    let reups = reup_service::list_reups(&state, &ctx).await?;
    Ok(Json(JsonEnvelope::success(reups)))
}

#[utoipa::path(
    post,
    path = "/api/reups",
    request_body = CreateReUpRequest,
    responses(
        (status = 200, description = "Created ReUp", body = JsonEnvelope<ReUpWithProducts>),
        (status = 400, description = "Invalid body"),
        (status = 403, description = "Not logged in"),
    ),
    security(("bearer_auth" = [])),
    tag = "ReUps"
)]
pub async fn create_reup(
    State(state): State<AppState>,
    ctx: Result<Ctx, AppError>,
    body: Bytes,
) -> LegacyResult<Json<JsonEnvelope<ReUpWithProducts>>> {
    let ctx = require_caller(ctx)?;
    let payload: CreateReUpRequest = parse_body(&body)?;
    let reup = reup_service::create_reup(&state, &ctx, payload).await?;
    Ok(Json(JsonEnvelope::success(reup)))
}

#[utoipa::path(
    get,
    path = "/api/reups/{id}",
    params(("id" = i32, Path, description = "ReUp id")),
    responses(
        (status = 200, description = "The ReUp", body = JsonEnvelope<ReUpDetail>),
        (status = 400, description = "Invalid id or not found"),
        (status = 403, description = "Not logged in"),
    ),
    security(("bearer_auth" = [])),
    tag = "ReUps"
)]
pub async fn get_reup(
    State(state): State<AppState>,
    ctx: Result<Ctx, AppError>,
    Path(id): Path<String>,
) -> LegacyResult<Json<JsonEnvelope<ReUpDetail>>> {
    let ctx = require_caller(ctx)?;
    let id = parse_id(&id)?;
    match reup_service::get_reup(&state, &ctx, IdInput { id }).await? {
        Some(reup) => Ok(Json(JsonEnvelope::success(reup))),
        None => Err(AppError::NotFound(format!("ReUp with id '{id}' not found.")).into()),
    }
}

#[utoipa::path(
    put,
    path = "/api/reups/{id}",
    params(("id" = i32, Path, description = "ReUp id")),
    request_body = ReplaceReUpRequest,
    responses(
        (status = 200, description = "Updated ReUp", body = JsonEnvelope<ReUp>),
        (status = 400, description = "Invalid body, id, or not found"),
        (status = 403, description = "Not logged in or not the owner"),
    ),
    security(("bearer_auth" = [])),
    tag = "ReUps"
)]
pub async fn replace_reup(
    State(state): State<AppState>,
    ctx: Result<Ctx, AppError>,
    Path(id): Path<String>,
    body: Bytes,
) -> LegacyResult<Json<JsonEnvelope<ReUp>>> {
    let ctx = require_caller(ctx)?;
    let id = parse_id(&id)?;
    let payload: ReplaceReUpRequest = parse_body(&body)?;
    let reup = reup_service::update_reup(&state, &ctx, id, payload.into()).await?;
    Ok(Json(JsonEnvelope::success(reup)))
}

#[utoipa::path(
    patch,
    path = "/api/reups/{id}",
    params(("id" = i32, Path, description = "ReUp id")),
    request_body = UpdateReUpRequest,
    responses(
        (status = 200, description = "Updated ReUp", body = JsonEnvelope<ReUp>),
        (status = 400, description = "Invalid body, id, or not found"),
        (status = 403, description = "Not logged in or not the owner"),
    ),
    security(("bearer_auth" = [])),
    tag = "ReUps"
)]
pub async fn patch_reup(
    State(state): State<AppState>,
    ctx: Result<Ctx, AppError>,
    Path(id): Path<String>,
    body: Bytes,
) -> LegacyResult<Json<JsonEnvelope<ReUp>>> {
    let ctx = require_caller(ctx)?;
    let id = parse_id(&id)?;
    let payload: UpdateReUpRequest = parse_body(&body)?;
    let reup = reup_service::update_reup(&state, &ctx, id, payload).await?;
    Ok(Json(JsonEnvelope::success(reup)))
}

#[utoipa::path(
    delete,
    path = "/api/reups/{id}",
    params(("id" = i32, Path, description = "ReUp id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid id or not found"),
        (status = 403, description = "Not logged in or not the owner"),
    ),
    security(("bearer_auth" = [])),
    tag = "ReUps"
)]
pub async fn delete_reup(
    State(state): State<AppState>,
    ctx: Result<Ctx, AppError>,
    Path(id): Path<String>,
) -> LegacyResult<StatusCode> {
    let ctx = require_caller(ctx)?;
    let id = parse_id(&id)?;
    reup_service::delete_reup(&state, &ctx, IdInput { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
