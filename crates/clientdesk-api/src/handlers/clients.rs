//! Client record handlers: CRUD, sub-resource appends, folder lookup.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use clientdesk_core::{
    AppendNoteRequest, AppendTrackingRequest, ClientRecord, ClientRepository,
    CreateClientRequest, ListClientsRequest, Note, TrackingEntry, UpdateClientRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::AppState;

/// Parse a path id. A malformed id is reported as the same uniform
/// not-found as a true miss, so the response never leaks which it was.
fn parse_client_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Client not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    /// Search term for real-time search.
    pub search: Option<String>,
    /// Filter by client type: person, company (lenient).
    pub client_type: Option<String>,
    /// Number of clients to return.
    pub limit: Option<i64>,
    /// Number of clients to skip.
    pub skip: Option<i64>,
}

/// GET /api/clients
pub async fn list_clients(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(query): Query<ListClientsQuery>,
) -> Result<Json<Vec<ClientRecord>>, ApiError> {
    let clients = state
        .db
        .clients
        .list(ListClientsRequest {
            search: query.search,
            client_type: query.client_type,
            limit: query.limit,
            skip: query.skip,
        })
        .await?;
    Ok(Json(clients))
}

/// POST /api/clients
pub async fn create_client(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(req): Json<CreateClientRequest>,
) -> Result<Json<ClientRecord>, ApiError> {
    let record = state.db.clients.create(req).await?;
    Ok(Json(record))
}

/// GET /api/clients/:id
pub async fn get_client(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<ClientRecord>, ApiError> {
    let id = parse_client_id(&id)?;
    let record = state.db.clients.fetch(id).await?;
    Ok(Json(record))
}

/// PUT /api/clients/:id — partial update.
pub async fn update_client(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<UpdateClientRequest>,
) -> Result<Json<ClientRecord>, ApiError> {
    let id = parse_client_id(&id)?;
    let record = state.db.clients.update(id, req).await?;
    Ok(Json(record))
}

/// DELETE /api/clients/:id
pub async fn delete_client(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>, ApiError> {
    let id = parse_client_id(&id)?;
    state.db.clients.delete(id).await?;
    Ok(Json(json!({"message": "Client deleted successfully"})))
}

/// POST /api/clients/:id/notes
pub async fn add_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<AppendNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_client_id(&id)?;
    let note = state
        .db
        .clients
        .append_note(id, req, &auth.identity.email)
        .await?;
    Ok(Json(note))
}

/// POST /api/clients/:id/tracking
pub async fn add_tracking(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<AppendTrackingRequest>,
) -> Result<Json<TrackingEntry>, ApiError> {
    let id = parse_client_id(&id)?;
    let entry = state
        .db
        .clients
        .append_tracking(id, req, &auth.identity.email)
        .await?;
    Ok(Json(entry))
}

/// GET /api/clients/:id/sharepoint-url — lazily synthesizes the folder
/// URL if persistence lost it.
pub async fn get_sharepoint_url(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>, ApiError> {
    let id = parse_client_id(&id)?;
    let url = state.db.clients.folder_url(id).await?;
    Ok(Json(json!({"sharepoint_url": url})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_client_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_client_id_maps_garbage_to_not_found() {
        let err = parse_client_id("not-a-uuid").unwrap_err();
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Client not found"),
            _ => panic!("expected uniform not-found"),
        }
    }
}
