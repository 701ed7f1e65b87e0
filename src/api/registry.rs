use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde_json::{Value, json};
use tracing::{Span, field, instrument};

use crate::api::error::ApiError;
use crate::api::tenant::TenantId;
use crate::domain::ModuleError;
use crate::import;
use crate::infrastructure::AppState;
use crate::registry::{BatchOutcome, EntryDescriptor, EntryKind, RegistryError, entry_id};

fn parse_kind(kind: &str) -> Result<EntryKind, ApiError> {
    kind.parse()
        .map_err(|_| ApiError::UnknownKind(kind.to_string()))
}

fn outcome_json(outcome: BatchOutcome) -> Value {
    match outcome.result {
        Ok(result) => json!({
            "index": outcome.index,
            "ok": true,
            "result": result
        }),
        Err(e) => json!({
            "index": outcome.index,
            "ok": false,
            "error": e.to_string(),
            "field": e.field()
        }),
    }
}

#[utoipa::path(
    get,
    path = "/api/registry",
    responses(
        (status = 200, description = "Every registry entry", body = [EntryDescriptor])
    )
)]
pub async fn list_entries(State(state): State<AppState>) -> impl IntoResponse {
    let entries: Vec<_> = state.registry.list().collect();

    Json(json!({
        "success": true,
        "count": entries.len(),
        "entries": entries
    }))
}

#[utoipa::path(
    get,
    path = "/api/registry/{kind}",
    params(("kind" = String, Path, description = "validators, calculations, transformers or generators")),
    responses(
        (status = 200, description = "Entries of one family", body = [EntryDescriptor]),
        (status = 404, description = "Unknown family")
    )
)]
pub async fn list_kind(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entries = state.registry.list_kind(kind);

    Ok(Json(json!({
        "success": true,
        "kind": kind.segment(),
        "count": entries.len(),
        "entries": entries
    })))
}

#[utoipa::path(
    get,
    path = "/api/registry/{kind}/{name}",
    params(
        ("kind" = String, Path, description = "Registry family"),
        ("name" = String, Path, description = "Entry name")
    ),
    responses(
        (status = 200, description = "Entry description", body = EntryDescriptor),
        (status = 404, description = "Unknown entry")
    )
)]
pub async fn describe_entry(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    tenant: TenantId,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let descriptor = state.registry.get(kind, &name).ok_or_else(|| {
        ModuleError::registry(
            tenant.0.clone(),
            RegistryError::NotFound {
                id: entry_id(kind, &name),
            },
        )
    })?;

    Ok(Json(json!({
        "success": true,
        "entry": descriptor
    })))
}

#[utoipa::path(
    post,
    path = "/api/registry/{kind}/{name}",
    params(
        ("kind" = String, Path, description = "Registry family"),
        ("name" = String, Path, description = "Entry name"),
        ("X-Tenant-ID" = Option<String>, Header, description = "Tenant used to label logs and errors")
    ),
    request_body(content = serde_json::Value, description = "Entry input fields as a JSON object"),
    responses(
        (status = 200, description = "Entry result"),
        (status = 404, description = "Unknown entry"),
        (status = 422, description = "Missing or invalid input field")
    )
)]
#[instrument(skip_all, fields(entry = field::Empty, tenant = tenant.label()))]
pub async fn invoke_entry(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    tenant: TenantId,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = entry_id(kind, &name);
    Span::current().record("entry", id.as_str());

    let module = state
        .registry
        .get(kind, &name)
        .map(|d| d.module)
        .ok_or_else(|| {
            ModuleError::registry(tenant.0.clone(), RegistryError::NotFound { id: id.clone() })
        })?;

    let payload =
        parse_payload(&body).map_err(|e| ModuleError::new(module, tenant.0.clone(), e))?;

    let result = state
        .registry
        .invoke(kind, &name, &payload)
        .map_err(|e| ModuleError::new(module, tenant.0.clone(), e))?;

    tracing::debug!("Registry entry succeeded");

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "id": id,
            "result": result
        })),
    ))
}

/// Single-invocation body. Any JSON is accepted here; the registry rejects
/// non-objects with the entry's module attached.
fn parse_payload(body: &[u8]) -> Result<Value, RegistryError> {
    serde_json::from_slice(body)
        .map_err(|e| RegistryError::InvalidPayload(format!("invalid JSON: {}", e)))
}

/// Records of a batch body: a JSON array, or CSV when the content type says so
fn batch_records(headers: &HeaderMap, body: &[u8]) -> Result<Vec<Value>, RegistryError> {
    let is_csv = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/csv"));

    if is_csv {
        return import::parse_csv_records(body);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(records)) => Ok(records),
        Ok(_) => Err(RegistryError::InvalidPayload(
            "batch body must be a JSON array of objects".to_string(),
        )),
        Err(e) => Err(RegistryError::InvalidPayload(format!("invalid JSON: {}", e))),
    }
}

#[utoipa::path(
    post,
    path = "/api/registry/{kind}/{name}/batch",
    params(
        ("kind" = String, Path, description = "Registry family"),
        ("name" = String, Path, description = "Entry name"),
        ("X-Tenant-ID" = Option<String>, Header, description = "Tenant used to label logs and errors")
    ),
    request_body(content = serde_json::Value, description = "JSON array of input objects, or text/csv with a header row"),
    responses(
        (status = 200, description = "One outcome per record"),
        (status = 404, description = "Unknown entry"),
        (status = 413, description = "Too many records"),
        (status = 422, description = "Malformed batch body")
    )
)]
#[instrument(skip_all, fields(entry = field::Empty, tenant = tenant.label()))]
pub async fn invoke_batch(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    tenant: TenantId,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = entry_id(kind, &name);
    Span::current().record("entry", id.as_str());

    let module = state
        .registry
        .get(kind, &name)
        .map(|d| d.module)
        .ok_or_else(|| {
            ModuleError::registry(tenant.0.clone(), RegistryError::NotFound { id: id.clone() })
        })?;

    let records = batch_records(&headers, &body)
        .map_err(|e| ModuleError::registry(tenant.0.clone(), e))?;

    if records.len() > state.max_batch_size {
        return Err(ApiError::BatchTooLarge {
            size: records.len(),
            limit: state.max_batch_size,
        });
    }

    let outcomes = state
        .registry
        .invoke_batch(kind, &name, &records)
        .map_err(|e| ModuleError::new(module, tenant.0.clone(), e))?;

    let error_count = outcomes.iter().filter(|o| o.result.is_err()).count();
    let ok_count = outcomes.len() - error_count;

    tracing::info!(
        "Batch processed: {} ok, {} errors",
        ok_count,
        error_count
    );

    let results: Vec<Value> = outcomes.into_iter().map(outcome_json).collect();

    Ok(Json(json!({
        "success": true,
        "id": id,
        "ok_count": ok_count,
        "error_count": error_count,
        "results": results
    })))
}
