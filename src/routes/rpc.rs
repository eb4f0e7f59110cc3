use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::Ctx,
    procedures::{self, Procedure},
    response::ApiResponse,
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RpcQuery {
    /// JSON-encoded procedure input.
    pub input: Option<String>,
}

/// Procedure input or result: any JSON value, `null` included.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct ProcedureValue(pub Value);

pub fn router() -> Router<AppState> {
    Router::new().route("/{procedure}", get(query_procedure).post(call_procedure))
}

#[utoipa::path(
    post,
    path = "/api/rpc/{procedure}",
    params(
        ("procedure" = String, Path, description = "Procedure name, e.g. `reups.create`")
    ),
    request_body(
        content = ProcedureValue,
        description = "Procedure input; may be empty for procedures without input",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Procedure result", body = ApiResponse<ProcedureValue>),
        (status = 401, description = "No caller, or the caller does not own the row"),
        (status = 404, description = "Unknown procedure or missing row"),
        (status = 422, description = "Input failed validation"),
    ),
    security(("bearer_auth" = [])),
    tag = "Procedures"
)]
pub async fn call_procedure(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(name): Path<String>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ProcedureValue>>> {
    let procedure: Procedure = name.parse()?;
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| AppError::Validation(format!("invalid JSON body: {err}")))?
    };

    let data = procedures::call(&state, &ctx, procedure, input).await?;
    Ok(Json(ApiResponse::success(
        procedure.name(),
        ProcedureValue(data),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/rpc/{procedure}",
    params(
        ("procedure" = String, Path, description = "Query procedure name, e.g. `reups.list`"),
        RpcQuery
    ),
    responses(
        (status = 200, description = "Query result", body = ApiResponse<ProcedureValue>),
        (status = 400, description = "Procedure is a mutation"),
        (status = 404, description = "Unknown procedure"),
    ),
    security(("bearer_auth" = [])),
    tag = "Procedures"
)]
pub async fn query_procedure(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(name): Path<String>,
    Query(query): Query<RpcQuery>,
) -> AppResult<Json<ApiResponse<ProcedureValue>>> {
    let procedure: Procedure = name.parse()?;
    if !procedure.is_query() {
        return Err(AppError::BadRequest(format!(
            "{procedure} is a mutation, call it with POST"
        )));
    }

    let input = match query.input.as_deref() {
        None | Some("") => Value::Null,
        Some(raw) => serde_json::from_str(raw)
            .map_err(|err| AppError::Validation(format!("invalid input parameter: {err}")))?,
    };

    let data = procedures::call(&state, &ctx, procedure, input).await?;
    Ok(Json(ApiResponse::success(
        procedure.name(),
        ProcedureValue(data),
        None,
    )))
}
