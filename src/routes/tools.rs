use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Query, State},
    http::{Method, StatusCode, Uri},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::AppError;
use crate::infra::NewHistoryRecord;
use crate::shared::{is_valid_domain, is_valid_ipv4};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub addresses: Vec<String>,
    pub domain: String,
    pub client_ip: String,
    /// Unix epoch seconds.
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub ip: String,
}

/// `status` is the string `"true"` or `"false"`, not a JSON boolean.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub status: &'static str,
}

/// Resolves `?domain=` to an IPv4 address and records the answer in history
/// before acknowledging it.
pub async fn lookup(
    State(state): State<AppState>,
    method: Method,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Result<Json<LookupResponse>, AppError> {
    state.hits.increment(method.as_str(), "lookup");

    let Query(params) = Query::<LookupParams>::try_from_uri(&uri)
        .map_err(|e| AppError::MalformedRequest(e.body_text()))?;
    let domain = params
        .domain
        .ok_or_else(|| AppError::MalformedRequest("missing domain parameter".to_string()))?;

    let hostname = state.resolver.resolve_canonical_name(&domain).await?;
    if !is_valid_domain(&hostname) {
        tracing::debug!(domain = %domain, hostname = %hostname, "Rejected invalid domain");
        return Err(AppError::NotFound);
    }

    let address = state.resolver.resolve_address(&hostname).await?;
    let response = LookupResponse {
        addresses: vec![address.to_string()],
        domain: hostname,
        client_ip: peer.ip().to_string(),
        created_at: chrono::Utc::now().timestamp(),
    };

    let record = state
        .store
        .append(NewHistoryRecord {
            route: uri.path().to_string(),
            method: method.as_str().to_string(),
            domain,
            request_body: uri.query().unwrap_or_default().to_string(),
            response_code: i32::from(StatusCode::OK.as_u16()),
            response_body: serde_json::to_string(&response)?,
        })
        .await?;

    tracing::debug!(
        id = record.id,
        domain = %record.domain,
        hostname = %response.domain,
        %address,
        "Lookup succeeded"
    );
    Ok(Json(response))
}

pub async fn validate(
    State(state): State<AppState>,
    method: Method,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, AppError> {
    state.hits.increment(method.as_str(), "validate");

    let Json(request) = body.map_err(|e| AppError::MalformedRequest(e.body_text()))?;
    let status = if is_valid_ipv4(&request.ip) {
        "true"
    } else {
        "false"
    };

    Ok(Json(ValidateResponse { status }))
}
