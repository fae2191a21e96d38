use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::codec::build::record_from_data;
use crate::codec::store::RouteFormat;
use crate::error::RouteError;
use crate::routing::router::{RouteOutcome, RouteRequest};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub generation: u64,
    pub carriers: usize,
    pub domains: usize,
    pub rules: usize,
    pub route_file: String,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub generation: u64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub domain: String,
    pub number: String,
    pub carrier: Option<String>,
    pub destination: Option<String>,
    /// Selection key for hash-based routing.
    pub key: Option<String>,
    pub probing: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DumpQuery {
    pub format: Option<RouteFormat>,
}

fn error_response(e: RouteError) -> Response {
    let status = match e {
        RouteError::ConfigNotFound { .. } => StatusCode::NOT_FOUND,
        RouteError::ConfigParse { .. }
        | RouteError::Malformed { .. }
        | RouteError::DuplicateRule { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RouteError::Allocation(_) | RouteError::Io { .. } | RouteError::Encode(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

fn join_error(e: tokio::task::JoinError) -> Response {
    tracing::error!(error = %e, "Admin task failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: "internal task failure".into() }),
    )
        .into_response()
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let data = state.table.snapshot();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        generation: data.generation(),
        carriers: data.carriers().len(),
        domains: data.domain_count(),
        rules: data.rule_count(),
        route_file: state.store.path().display().to_string(),
    })
}

pub async fn post_reload(State(state): State<AdminState>) -> Response {
    let table = state.table.clone();
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || table.reload(&store)).await {
        Ok(Ok(generation)) => Json(ReloadResponse { generation }).into_response(),
        Ok(Err(e)) => error_response(e),
        Err(e) => join_error(e),
    }
}

pub async fn post_save(State(state): State<AdminState>) -> Response {
    let table = state.table.clone();
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || table.save(&store)).await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(e)) => error_response(e),
        Err(e) => join_error(e),
    }
}

pub async fn get_route(
    State(state): State<AdminState>,
    Query(query): Query<RouteQuery>,
) -> Json<RouteOutcome> {
    let mut request = RouteRequest::new(&query.domain, &query.number)
        .allow_probing(query.probing.unwrap_or(state.routing.allow_probing));
    if let Some(carrier) = query.carrier.as_deref().or(state.routing.default_carrier.as_deref()) {
        request = request.carrier(carrier);
    }
    if let Some(destination) = query.destination.as_deref() {
        request = request.destination(destination);
    }
    if let Some(key) = query.key.as_deref() {
        request = request.selection_key(key);
    }
    Json(state.table.route(&request))
}

pub async fn get_dump(State(state): State<AdminState>, Query(query): Query<DumpQuery>) -> Response {
    let format = query.format.unwrap_or(state.store.format());
    let record = record_from_data(&state.table.snapshot());
    match format.encode(&record) {
        Ok(text) => {
            let content_type = match format {
                RouteFormat::Json => "application/json",
                RouteFormat::Toml | RouteFormat::Native => "text/plain; charset=utf-8",
            };
            ([(header::CONTENT_TYPE, content_type)], text).into_response()
        }
        Err(e) => error_response(e),
    }
}
