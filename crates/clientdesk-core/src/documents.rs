//! Deterministic document-folder URL synthesis.
//!
//! The folder URL is computed at create time and recomputed as a lazy
//! fallback at read time if persistence lost the value, so the
//! derivation must be byte-identical across calls for the same inputs.

use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// Default external document-site base URL.
pub const DEFAULT_FOLDER_BASE: &str = "https://mock.sharepoint.com";

fn str_field<'a>(data: &'a Map<String, JsonValue>, key: &str) -> Option<&'a str> {
    data.get(key).and_then(JsonValue::as_str)
}

/// Derive the human-readable display name for a record's folder.
///
/// Prefers a non-empty `company_name`; otherwise joins `first_name` and
/// `last_name` with a single space (missing parts render empty).
pub fn display_name(data: &Map<String, JsonValue>) -> String {
    match str_field(data, "company_name") {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "{} {}",
            str_field(data, "first_name").unwrap_or(""),
            str_field(data, "last_name").unwrap_or("")
        ),
    }
}

/// Synthesize the folder URL for a record: `{base}/Client_{id}_{name}`
/// with spaces in the display name replaced by underscores.
pub fn folder_url(base: &str, id: Uuid, data: &Map<String, JsonValue>) -> String {
    let name = display_name(data).replace(' ', "_");
    format!("{}/Client_{}_{}", base, id, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: serde_json::Value) -> Map<String, JsonValue> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_company_name_preferred() {
        let d = data(json!({"company_name": "Acme Corp", "first_name": "John"}));
        assert_eq!(display_name(&d), "Acme Corp");
    }

    #[test]
    fn test_empty_company_name_falls_back_to_person_name() {
        let d = data(json!({"company_name": "", "first_name": "John", "last_name": "Doe"}));
        assert_eq!(display_name(&d), "John Doe");
    }

    #[test]
    fn test_missing_name_parts_render_empty() {
        let d = data(json!({"first_name": "John"}));
        assert_eq!(display_name(&d), "John ");

        let d = data(json!({}));
        assert_eq!(display_name(&d), " ");
    }

    #[test]
    fn test_folder_url_replaces_spaces() {
        let id = Uuid::nil();
        let d = data(json!({"company_name": "Acme Holding Group"}));
        assert_eq!(
            folder_url("https://mock.sharepoint.com", id, &d),
            format!("https://mock.sharepoint.com/Client_{}_Acme_Holding_Group", id)
        );
    }

    #[test]
    fn test_folder_url_is_deterministic() {
        let id = Uuid::new_v4();
        let d = data(json!({"first_name": "Jane", "last_name": "Smith"}));
        let a = folder_url(DEFAULT_FOLDER_BASE, id, &d);
        let b = folder_url(DEFAULT_FOLDER_BASE, id, &d);
        assert_eq!(a, b);
        assert!(a.ends_with(&format!("Client_{}_Jane_Smith", id)));
    }
}
