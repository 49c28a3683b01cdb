//! HTTP routes for the account collection

use super::store::{AccountStore, DeleteOutcome};
use crate::error::Error;
use crate::pagination::PageDescriptor;
use crate::types::{DataEnvelope, NewAccount};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Maximum number of account holder name lines
const MAX_NAME_LINES: usize = 4;

/// Build the API router over a store
pub fn router(store: AccountStore) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/account", get(list_accounts).post(create_account))
        .route("/v1/account/:id", get(fetch_account).delete(delete_account))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Error body shared by all endpoints
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "status": "error", "message": message.into() })),
    )
        .into_response()
}

fn store_failure(e: &Error) -> Response {
    warn!("Store operation failed: {}", e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Problem accessing account storage: {e}"),
    )
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `GET /v1/account`
async fn list_accounts(
    State(store): State<AccountStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let page = match PageDescriptor::from_query(&params) {
        Ok(page) => page,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match store.list(&page).await {
        Ok(accounts) => (StatusCode::OK, Json(DataEnvelope::new(accounts))).into_response(),
        Err(e) => store_failure(&e),
    }
}

/// `GET /v1/account/:id`
async fn fetch_account(State(store): State<AccountStore>, Path(id): Path<String>) -> Response {
    match store.get(&id).await {
        Ok(Some(account)) => (StatusCode::OK, Json(DataEnvelope::new(account))).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            Error::AccountNotFound { id }.to_string(),
        ),
        Err(e) => store_failure(&e),
    }
}

/// `POST /v1/account`
async fn create_account(
    State(store): State<AccountStore>,
    body: Result<Json<DataEnvelope<NewAccount>>, JsonRejection>,
) -> Response {
    let account = match body {
        Ok(Json(envelope)) => envelope.data,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Wrong request body: {}", rejection.body_text()),
            )
        }
    };

    if let Err(e) = validate_new_account(&account) {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    match store.insert(account).await {
        Ok(created) => {
            info!(id = %created.id, "Created account");
            (StatusCode::CREATED, Json(DataEnvelope::new(created))).into_response()
        }
        Err(e @ Error::AccountExists { .. }) => error_response(StatusCode::CONFLICT, e.to_string()),
        Err(e) => store_failure(&e),
    }
}

/// `DELETE /v1/account/:id?version=N`
async fn delete_account(
    State(store): State<AccountStore>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(version) = params.get("version").and_then(|v| v.trim().parse::<i64>().ok()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Wrong value in version query parameter",
        );
    };

    match store.delete(&id, version).await {
        Ok(DeleteOutcome::Deleted) => {
            info!(id = %id, version, "Deleted account");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(DeleteOutcome::NotFound) => error_response(
            StatusCode::NOT_FOUND,
            Error::AccountNotFound { id }.to_string(),
        ),
        Ok(DeleteOutcome::VersionMismatch) => error_response(
            StatusCode::CONFLICT,
            Error::WrongVersion { id, version }.to_string(),
        ),
        Err(e) => store_failure(&e),
    }
}

fn validate_new_account(account: &NewAccount) -> Result<(), Error> {
    uuid::Uuid::parse_str(&account.id)
        .map_err(|e| Error::invalid_request(format!("Wrong id '{}': {e}", account.id)))?;
    uuid::Uuid::parse_str(&account.organisation_id).map_err(|e| {
        Error::invalid_request(format!(
            "Wrong organisation_id '{}': {e}",
            account.organisation_id
        ))
    })?;

    let attributes = &account.attributes;
    if attributes.country.trim().is_empty() {
        return Err(Error::invalid_request("attributes.country is required"));
    }
    if attributes.name.is_empty() || attributes.name.len() > MAX_NAME_LINES {
        return Err(Error::invalid_request(format!(
            "attributes.name must have between 1 and {MAX_NAME_LINES} lines"
        )));
    }
    Ok(())
}
