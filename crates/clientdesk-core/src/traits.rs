//! Core traits for clientdesk abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CLIENT REPOSITORY
// =============================================================================

/// Request for creating a new client record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientRequest {
    #[serde(rename = "type")]
    pub client_type: ClientType,
    pub data: Map<String, JsonValue>,
    pub ownership: Ownership,
}

/// Partial-update request. Absent fields are left untouched; there is
/// no way to null out a section wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientRequest {
    #[serde(rename = "type")]
    pub client_type: Option<ClientType>,
    pub data: Option<Map<String, JsonValue>>,
    pub billing: Option<BillingInfo>,
    pub documents: Option<DocumentsInfo>,
    pub credentials: Option<CredentialsInfo>,
    pub ownership: Option<Ownership>,
}

/// Request for listing client records.
///
/// `client_type` is kept as raw text here: invalid values are dropped
/// by the query builder rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct ListClientsRequest {
    /// Case-insensitive substring search across the well-known `data`
    /// keys and note contents. Treated as literal text, never a pattern.
    pub search: Option<String>,
    /// Filter by client type ("person" | "company"); lenient.
    pub client_type: Option<String>,
    /// Maximum results (default 50).
    pub limit: Option<i64>,
    /// Pagination offset.
    pub skip: Option<i64>,
}

/// Request for appending a note to a client record.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendNoteRequest {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request for appending a tracking entry to a client record.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendTrackingRequest {
    pub activity_type: String,
    pub description: String,
    pub outcome: Option<String>,
}

/// Repository for client record CRUD and sub-resource appends.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Create a client record with a generated id, timestamps, and a
    /// synthesized document-folder URL.
    async fn create(&self, req: CreateClientRequest) -> Result<ClientRecord>;

    /// Fetch a full client record by id, including notes and tracking.
    async fn fetch(&self, id: Uuid) -> Result<ClientRecord>;

    /// List client records ordered by recency (newest first).
    async fn list(&self, req: ListClientsRequest) -> Result<Vec<ClientRecord>>;

    /// Merge the supplied fields into a record and refresh `updated_at`.
    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<ClientRecord>;

    /// Delete a client record and its sub-resources.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Append a note. Does not touch the parent record's `updated_at`.
    async fn append_note(&self, id: Uuid, req: AppendNoteRequest, created_by: &str)
        -> Result<Note>;

    /// Append a tracking entry. Does not touch the parent record's
    /// `updated_at`.
    async fn append_tracking(
        &self,
        id: Uuid,
        req: AppendTrackingRequest,
        created_by: &str,
    ) -> Result<TrackingEntry>;

    /// Check if a client record exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// Resolve the document-folder URL, synthesizing it deterministically
    /// when persistence lost the value.
    async fn folder_url(&self, id: Uuid) -> Result<String>;
}

// =============================================================================
// TOKEN VERIFICATION
// =============================================================================

/// Black-box credential check consumed by the HTTP boundary.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a bearer credential and return the caller's identity.
    async fn verify(&self, token: &str) -> Result<AuthIdentity>;
}

/// Response for an upstream token exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub user: AuthIdentity,
}
