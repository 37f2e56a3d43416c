//! List-query construction for client records.
//!
//! Converts the caller's filter/search parameters into a parameterized
//! SQL WHERE fragment. Search input is compiled to an escaped ILIKE
//! pattern so user text is always matched literally, never interpreted
//! as a pattern language.

use tracing::debug;

use clientdesk_core::{ClientType, ListClientsRequest};

use crate::escape_like;

/// `data` keys matched by free-text search, plus note contents.
pub const SEARCH_DATA_KEYS: [&str; 7] = [
    "first_name",
    "last_name",
    "company_name",
    "contact_person",
    "email",
    "phone",
    "company",
];

/// Generates the WHERE fragment for client list queries.
///
/// Composes the type filter and free-text search conjunctively. The
/// type filter is lenient: an unrecognized value is dropped, not an
/// error.
///
/// # Example
///
/// ```rust,ignore
/// let builder = ClientQueryBuilder::from_request(&req, 0);
/// let (where_sql, params) = builder.build();
/// // where_sql: "c.client_type = $1 AND (c.data->>'first_name' ILIKE $2 ESCAPE '\' OR ...)"
/// // params: ["person", "%john%"]
/// ```
#[derive(Debug, Clone)]
pub struct ClientQueryBuilder {
    client_type: Option<ClientType>,
    search: Option<String>,
    param_offset: usize,
}

impl ClientQueryBuilder {
    /// Create a builder from a list request.
    ///
    /// `param_offset` is the number of parameters already bound ahead of
    /// this fragment in the final query.
    pub fn from_request(req: &ListClientsRequest, param_offset: usize) -> Self {
        let client_type = match req.client_type.as_deref() {
            Some(raw) => {
                let parsed = ClientType::parse(raw);
                if parsed.is_none() {
                    debug!(
                        subsystem = "db",
                        component = "query",
                        op = "type_filter",
                        value = raw,
                        "Dropping unrecognized client_type filter"
                    );
                }
                parsed
            }
            None => None,
        };

        let search = req
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(String::from);

        Self {
            client_type,
            search,
            param_offset,
        }
    }

    /// Build the WHERE fragment and its parameters, in bind order.
    ///
    /// Returns `("TRUE", [])` when no filter applies. The search pattern
    /// is bound once and referenced from every OR arm.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        let mut param_idx = self.param_offset;

        if let Some(client_type) = self.client_type {
            param_idx += 1;
            clauses.push(format!("c.client_type = ${}", param_idx));
            params.push(client_type.as_str().to_string());
        }

        if let Some(search) = &self.search {
            param_idx += 1;
            let mut arms: Vec<String> = SEARCH_DATA_KEYS
                .iter()
                .map(|key| format!("c.data->>'{}' ILIKE ${} ESCAPE '\\'", key, param_idx))
                .collect();
            arms.push(format!(
                "EXISTS (SELECT 1 FROM client_note cn WHERE cn.client_id = c.id AND cn.content ILIKE ${} ESCAPE '\\')",
                param_idx
            ));
            clauses.push(format!("({})", arms.join(" OR ")));
            params.push(format!("%{}%", escape_like(search)));
        }

        if clauses.is_empty() {
            ("TRUE".to_string(), vec![])
        } else {
            (clauses.join(" AND "), params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(search: Option<&str>, client_type: Option<&str>) -> ListClientsRequest {
        ListClientsRequest {
            search: search.map(String::from),
            client_type: client_type.map(String::from),
            limit: None,
            skip: None,
        }
    }

    #[test]
    fn test_no_filters_matches_everything() {
        let builder = ClientQueryBuilder::from_request(&request(None, None), 0);
        let (sql, params) = builder.build();
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_type_filter_only() {
        let builder = ClientQueryBuilder::from_request(&request(None, Some("person")), 0);
        let (sql, params) = builder.build();
        assert_eq!(sql, "c.client_type = $1");
        assert_eq!(params, vec!["person"]);
    }

    #[test]
    fn test_invalid_type_filter_is_dropped() {
        let builder = ClientQueryBuilder::from_request(&request(None, Some("robot")), 0);
        let (sql, params) = builder.build();
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_search_matches_all_fields_with_one_param() {
        let builder = ClientQueryBuilder::from_request(&request(Some("john"), None), 0);
        let (sql, params) = builder.build();

        for key in SEARCH_DATA_KEYS {
            assert!(
                sql.contains(&format!("c.data->>'{}' ILIKE $1", key)),
                "missing arm for {}",
                key
            );
        }
        assert!(sql.contains("cn.content ILIKE $1"));
        assert_eq!(params, vec!["%john%"]);
    }

    #[test]
    fn test_search_input_is_escaped_literal() {
        let builder = ClientQueryBuilder::from_request(&request(Some("50%_off"), None), 0);
        let (_, params) = builder.build();
        assert_eq!(params, vec!["%50\\%\\_off%"]);
    }

    #[test]
    fn test_type_and_search_compose_with_and() {
        let builder =
            ClientQueryBuilder::from_request(&request(Some("acme"), Some("company")), 0);
        let (sql, params) = builder.build();

        assert!(sql.starts_with("c.client_type = $1 AND ("));
        assert!(sql.contains("ILIKE $2"));
        assert_eq!(params, vec!["company".to_string(), "%acme%".to_string()]);
    }

    #[test]
    fn test_param_offset_shifts_indexes() {
        let builder =
            ClientQueryBuilder::from_request(&request(Some("acme"), Some("company")), 2);
        let (sql, _) = builder.build();
        assert!(sql.contains("c.client_type = $3"));
        assert!(sql.contains("ILIKE $4"));
    }

    #[test]
    fn test_empty_search_is_ignored() {
        let builder = ClientQueryBuilder::from_request(&request(Some(""), None), 0);
        let (sql, params) = builder.build();
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }
}
