//! Client record repository implementation.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value as JsonValue};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use clientdesk_core::defaults::{DEFAULT_LIST_LIMIT, DEFAULT_LIST_SKIP};
use clientdesk_core::{
    documents, new_id, AppendNoteRequest, AppendTrackingRequest, BillingInfo, ClientRecord,
    ClientRepository, ClientType, CreateClientRequest, CredentialsInfo, DocumentsInfo, Error,
    ListClientsRequest, Note, Ownership, Result, TrackingEntry, UpdateClientRequest,
    DEFAULT_FOLDER_BASE,
};

use crate::query::ClientQueryBuilder;

const CLIENT_COLUMNS: &str =
    "c.id, c.client_type, c.data, c.billing, c.documents, c.credentials, c.ownership, \
     c.created_at_utc, c.updated_at_utc";

/// PostgreSQL implementation of ClientRepository.
///
/// Notes and tracking entries live in child tables; a row INSERT is the
/// atomic append primitive, so concurrent appenders can never lose each
/// other's entries and insertion order is preserved by the sequence
/// column.
#[derive(Clone)]
pub struct PgClientRepository {
    pool: Pool<Postgres>,
    folder_base: String,
}

impl PgClientRepository {
    /// Create a new PgClientRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            folder_base: DEFAULT_FOLDER_BASE.to_string(),
        }
    }

    /// Override the document-site base URL used for folder synthesis.
    pub fn with_folder_base(mut self, base: &str) -> Self {
        self.folder_base = base.trim_end_matches('/').to_string();
        self
    }

    fn map_client_row(row: &PgRow) -> Result<ClientRecord> {
        let raw_type: String = row.get("client_type");
        let client_type = ClientType::parse(&raw_type)
            .ok_or_else(|| Error::Internal(format!("invalid client_type in store: {}", raw_type)))?;

        let data = match row.get::<JsonValue, _>("data") {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };

        let billing: BillingInfo =
            serde_json::from_value(row.get::<JsonValue, _>("billing")).unwrap_or_default();
        let documents: DocumentsInfo =
            serde_json::from_value(row.get::<JsonValue, _>("documents")).unwrap_or_default();
        let credentials: CredentialsInfo =
            serde_json::from_value(row.get::<JsonValue, _>("credentials")).unwrap_or_default();
        let ownership: Ownership = serde_json::from_value(row.get::<JsonValue, _>("ownership"))?;

        Ok(ClientRecord {
            id: row.get("id"),
            client_type,
            data,
            billing,
            documents,
            credentials,
            notes: Vec::new(),
            tracking: Vec::new(),
            ownership,
            created_at: row.get("created_at_utc"),
            updated_at: row.get("updated_at_utc"),
        })
    }

    fn map_note_row(row: &PgRow) -> Note {
        Note {
            id: row.get("id"),
            content: row.get("content"),
            created_by: row.get("created_by"),
            created_at: row.get("created_at_utc"),
            tags: row.get("tags"),
        }
    }

    fn map_tracking_row(row: &PgRow) -> TrackingEntry {
        TrackingEntry {
            id: row.get("id"),
            activity_type: row.get("activity_type"),
            description: row.get("description"),
            created_by: row.get("created_by"),
            created_at: row.get("created_at_utc"),
            outcome: row.get("outcome"),
        }
    }

    /// Load notes and tracking entries for a batch of records in two
    /// queries (avoids per-record fan-out on list).
    async fn attach_sub_resources(&self, records: &mut [ClientRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();

        let note_rows = sqlx::query(
            "SELECT id, client_id, content, created_by, created_at_utc, tags
             FROM client_note WHERE client_id = ANY($1) ORDER BY client_id, seq",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut notes_by_client: HashMap<Uuid, Vec<Note>> = HashMap::new();
        for row in &note_rows {
            let client_id: Uuid = row.get("client_id");
            notes_by_client
                .entry(client_id)
                .or_default()
                .push(Self::map_note_row(row));
        }

        let tracking_rows = sqlx::query(
            "SELECT id, client_id, activity_type, description, created_by, created_at_utc, outcome
             FROM client_tracking WHERE client_id = ANY($1) ORDER BY client_id, seq",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut tracking_by_client: HashMap<Uuid, Vec<TrackingEntry>> = HashMap::new();
        for row in &tracking_rows {
            let client_id: Uuid = row.get("client_id");
            tracking_by_client
                .entry(client_id)
                .or_default()
                .push(Self::map_tracking_row(row));
        }

        for record in records.iter_mut() {
            record.notes = notes_by_client.remove(&record.id).unwrap_or_default();
            record.tracking = tracking_by_client.remove(&record.id).unwrap_or_default();
        }
        Ok(())
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn create(&self, req: CreateClientRequest) -> Result<ClientRecord> {
        if req.ownership.primary_owner.trim().is_empty() {
            return Err(Error::InvalidInput(
                "ownership.primary_owner is required".to_string(),
            ));
        }

        let id = new_id();
        let now = Utc::now();

        let documents = DocumentsInfo {
            folder_url: Some(documents::folder_url(&self.folder_base, id, &req.data)),
            ..DocumentsInfo::default()
        };

        let record = ClientRecord {
            id,
            client_type: req.client_type,
            data: req.data,
            billing: BillingInfo::default(),
            documents,
            credentials: CredentialsInfo::default(),
            notes: Vec::new(),
            tracking: Vec::new(),
            ownership: req.ownership,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO client
                 (id, client_type, data, billing, documents, credentials, ownership,
                  created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.id)
        .bind(record.client_type.as_str())
        .bind(JsonValue::Object(record.data.clone()))
        .bind(serde_json::to_value(&record.billing)?)
        .bind(serde_json::to_value(&record.documents)?)
        .bind(serde_json::to_value(&record.credentials)?)
        .bind(serde_json::to_value(&record.ownership)?)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "clients",
            op = "create",
            client_id = %record.id,
            client_type = %record.client_type,
            "Created client record"
        );
        Ok(record)
    }

    async fn fetch(&self, id: Uuid) -> Result<ClientRecord> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM client c WHERE c.id = $1",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::ClientNotFound(id))?;

        let mut record = Self::map_client_row(&row)?;
        self.attach_sub_resources(std::slice::from_mut(&mut record))
            .await?;
        Ok(record)
    }

    async fn list(&self, req: ListClientsRequest) -> Result<Vec<ClientRecord>> {
        let start = Instant::now();
        let limit = req.limit.unwrap_or(DEFAULT_LIST_LIMIT).max(0);
        let skip = req.skip.unwrap_or(DEFAULT_LIST_SKIP).max(0);

        let builder = ClientQueryBuilder::from_request(&req, 0);
        let (where_sql, params) = builder.build();

        let sql = format!(
            "SELECT {} FROM client c WHERE {} \
             ORDER BY c.created_at_utc DESC, c.seq ASC LIMIT ${} OFFSET ${}",
            CLIENT_COLUMNS,
            where_sql,
            params.len() + 1,
            params.len() + 2
        );

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = query.bind(param);
        }
        let rows = query
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut records = rows
            .iter()
            .map(Self::map_client_row)
            .collect::<Result<Vec<_>>>()?;
        self.attach_sub_resources(&mut records).await?;

        debug!(
            subsystem = "db",
            component = "clients",
            op = "list",
            result_count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed client records"
        );
        Ok(records)
    }

    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<ClientRecord> {
        if !self.exists(id).await? {
            return Err(Error::ClientNotFound(id));
        }

        let now = Utc::now();
        // $1 = now, $2 = id, dynamic params start at $3
        let mut updates: Vec<String> = vec!["updated_at_utc = $1".to_string()];
        let mut param_idx = 3;

        if req.client_type.is_some() {
            updates.push(format!("client_type = ${}", param_idx));
            param_idx += 1;
        }
        if req.data.is_some() {
            updates.push(format!("data = ${}", param_idx));
            param_idx += 1;
        }
        if req.billing.is_some() {
            updates.push(format!("billing = ${}", param_idx));
            param_idx += 1;
        }
        if req.documents.is_some() {
            updates.push(format!("documents = ${}", param_idx));
            param_idx += 1;
        }
        if req.credentials.is_some() {
            updates.push(format!("credentials = ${}", param_idx));
            param_idx += 1;
        }
        if req.ownership.is_some() {
            updates.push(format!("ownership = ${}", param_idx));
        }

        let sql = format!("UPDATE client SET {} WHERE id = $2", updates.join(", "));

        let mut query = sqlx::query(&sql).bind(now).bind(id);
        if let Some(client_type) = req.client_type {
            query = query.bind(client_type.as_str());
        }
        if let Some(data) = req.data {
            query = query.bind(JsonValue::Object(data));
        }
        if let Some(billing) = req.billing {
            query = query.bind(serde_json::to_value(&billing)?);
        }
        if let Some(docs) = req.documents {
            query = query.bind(serde_json::to_value(&docs)?);
        }
        if let Some(credentials) = req.credentials {
            query = query.bind(serde_json::to_value(&credentials)?);
        }
        if let Some(ownership) = req.ownership {
            query = query.bind(serde_json::to_value(&ownership)?);
        }

        query.execute(&self.pool).await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "clients",
            op = "update",
            client_id = %id,
            "Updated client record"
        );
        self.fetch(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM client WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ClientNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "clients",
            op = "delete",
            client_id = %id,
            "Deleted client record"
        );
        Ok(())
    }

    async fn append_note(
        &self,
        id: Uuid,
        req: AppendNoteRequest,
        created_by: &str,
    ) -> Result<Note> {
        if !self.exists(id).await? {
            return Err(Error::ClientNotFound(id));
        }

        let note = Note {
            id: new_id(),
            content: req.content,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
            tags: req.tags,
        };

        // Plain INSERT: atomic append, never touches the parent row's
        // updated_at_utc.
        sqlx::query(
            "INSERT INTO client_note (id, client_id, content, created_by, created_at_utc, tags)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(note.id)
        .bind(id)
        .bind(&note.content)
        .bind(&note.created_by)
        .bind(note.created_at)
        .bind(&note.tags)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "clients",
            op = "append_note",
            client_id = %id,
            note_id = %note.id,
            "Appended note"
        );
        Ok(note)
    }

    async fn append_tracking(
        &self,
        id: Uuid,
        req: AppendTrackingRequest,
        created_by: &str,
    ) -> Result<TrackingEntry> {
        if !self.exists(id).await? {
            return Err(Error::ClientNotFound(id));
        }

        let entry = TrackingEntry {
            id: new_id(),
            activity_type: req.activity_type,
            description: req.description,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
            outcome: req.outcome,
        };

        sqlx::query(
            "INSERT INTO client_tracking
                 (id, client_id, activity_type, description, created_by, created_at_utc, outcome)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(id)
        .bind(&entry.activity_type)
        .bind(&entry.description)
        .bind(&entry.created_by)
        .bind(entry.created_at)
        .bind(&entry.outcome)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "clients",
            op = "append_tracking",
            client_id = %id,
            entry_id = %entry.id,
            "Appended tracking entry"
        );
        Ok(entry)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS one FROM client WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.is_some())
    }

    async fn folder_url(&self, id: Uuid) -> Result<String> {
        let row = sqlx::query("SELECT data, documents FROM client WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::ClientNotFound(id))?;

        let docs: DocumentsInfo =
            serde_json::from_value(row.get::<JsonValue, _>("documents")).unwrap_or_default();
        if let Some(url) = docs.folder_url.filter(|u| !u.is_empty()) {
            return Ok(url);
        }

        // Persistence lost the value; recompute deterministically.
        let data = match row.get::<JsonValue, _>("data") {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };
        Ok(documents::folder_url(&self.folder_base, id, &data))
    }
}
