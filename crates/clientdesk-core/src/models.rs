//! Core data models for clientdesk.
//!
//! These types are shared across all clientdesk crates and represent
//! the client record and its sub-resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use uuid::Uuid;

// =============================================================================
// CLIENT TYPE DISCRIMINATOR
// =============================================================================

/// Discriminator selecting which convention governs the `data` payload.
///
/// `person` records carry first_name/last_name/email/... keys;
/// `company` records carry company_name/contact_person/... keys.
/// The key set is convention-enforced only — the store never validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    Person,
    Company,
}

impl ClientType {
    /// Lenient parse used by the type filter: unknown values yield `None`
    /// (the filter is dropped, not rejected).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "person" => Some(ClientType::Person),
            "company" => Some(ClientType::Company),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Person => "person",
            ClientType::Company => "company",
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// FIXED-SHAPE SECTIONS
// =============================================================================

/// External-accounting linkage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingInfo {
    pub customer_id: Option<String>,
    pub billing_address: Option<String>,
    pub payment_terms: Option<String>,
    pub tax_id: Option<String>,
    pub credit_limit: Option<f64>,
    pub account_balance: Option<f64>,
}

/// Document-location pointer and access labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentsInfo {
    /// External folder URL. Synthesized deterministically from the record
    /// id and display name when absent (see [`crate::documents`]).
    pub folder_url: Option<String>,
    #[serde(default)]
    pub document_categories: Vec<String>,
    #[serde(default)]
    pub access_permissions: Vec<String>,
}

/// Credential references. Treated as opaque label maps, never parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsInfo {
    #[serde(default)]
    pub login_portals: Vec<HashMap<String, String>>,
    #[serde(default)]
    pub api_keys: Vec<HashMap<String, String>>,
    #[serde(default)]
    pub certificates: Vec<HashMap<String, String>>,
}

/// Ownership section. `primary_owner` is always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ownership {
    pub primary_owner: String,
    #[serde(default)]
    pub secondary_owners: Vec<String>,
    pub department: Option<String>,
    pub account_manager: Option<String>,
    pub relationship_type: Option<String>,
}

// =============================================================================
// SUB-RESOURCES (append-only)
// =============================================================================

/// A free-text note attached to a client record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An activity-tracking entry (call, email, meeting, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEntry {
    pub id: Uuid,
    pub activity_type: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub outcome: Option<String>,
}

// =============================================================================
// ROOT ENTITY
// =============================================================================

/// The root client record.
///
/// `data` is an open mapping whose meaningful keys are selected by
/// `client_type`; it is deliberately not validated so client attributes
/// can vary without schema churn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    pub data: Map<String, JsonValue>,
    #[serde(default)]
    pub billing: BillingInfo,
    #[serde(default)]
    pub documents: DocumentsInfo,
    #[serde(default)]
    pub credentials: CredentialsInfo,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub tracking: Vec<TrackingEntry>,
    pub ownership: Ownership,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// AUTH
// =============================================================================

/// Identity returned by token verification.
///
/// The core never inspects token internals; only this identity is used
/// (its email stamps `created_by` on sub-resources).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub subject: String,
    pub email: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_type_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&ClientType::Person).unwrap(),
            "\"person\""
        );
        let t: ClientType = serde_json::from_str("\"company\"").unwrap();
        assert_eq!(t, ClientType::Company);
    }

    #[test]
    fn test_client_type_parse_is_lenient() {
        assert_eq!(ClientType::parse("person"), Some(ClientType::Person));
        assert_eq!(ClientType::parse("company"), Some(ClientType::Company));
        assert_eq!(ClientType::parse("PERSON"), None);
        assert_eq!(ClientType::parse("robot"), None);
        assert_eq!(ClientType::parse(""), None);
    }

    #[test]
    fn test_client_record_serializes_type_field() {
        let record = ClientRecord {
            id: Uuid::nil(),
            client_type: ClientType::Person,
            data: Map::new(),
            billing: BillingInfo::default(),
            documents: DocumentsInfo::default(),
            credentials: CredentialsInfo::default(),
            notes: vec![],
            tracking: vec![],
            ownership: Ownership {
                primary_owner: "owner@example.com".to_string(),
                secondary_owners: vec![],
                department: None,
                account_manager: None,
                relationship_type: None,
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], json!("person"));
        assert!(value.get("client_type").is_none());
    }

    #[test]
    fn test_sections_default_on_missing_keys() {
        let value = json!({
            "id": Uuid::nil(),
            "type": "company",
            "data": {"company_name": "Acme"},
            "ownership": {"primary_owner": "owner@example.com"},
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        });

        let record: ClientRecord = serde_json::from_value(value).unwrap();
        assert!(record.billing.customer_id.is_none());
        assert!(record.documents.folder_url.is_none());
        assert!(record.notes.is_empty());
        assert!(record.tracking.is_empty());
        assert!(record.ownership.secondary_owners.is_empty());
    }

    #[test]
    fn test_data_accepts_arbitrary_keys() {
        let value = json!({
            "id": Uuid::nil(),
            "type": "person",
            "data": {"first_name": "John", "favorite_color": "teal", "score": 7},
            "ownership": {"primary_owner": "owner@example.com"},
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        });

        let record: ClientRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.data.get("favorite_color"), Some(&json!("teal")));
        assert_eq!(record.data.get("score"), Some(&json!(7)));
    }
}
