//! # clientdesk-db
//!
//! PostgreSQL database layer for clientdesk.
//!
//! This crate provides:
//! - Connection pool management
//! - The client record repository
//! - Safe list-query construction (escaped literal-text search)
//!
//! ## Example
//!
//! ```rust,ignore
//! use clientdesk_db::Database;
//! use clientdesk_core::{ClientRepository, CreateClientRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/clientdesk").await?;
//!     let record = db.clients.create(req).await?;
//!     println!("Created client: {}", record.id);
//!     Ok(())
//! }
//! ```

pub mod clients;
pub mod pool;
pub mod query;

// Re-export core types
pub use clientdesk_core::*;

// Re-export repository implementations
pub use clients::PgClientRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use query::ClientQueryBuilder;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Client record repository.
    pub clients: PgClientRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            clients: PgClientRepository::new(pool.clone()),
            pool,
        }
    }

    /// Configure the external document-site base URL used for folder
    /// synthesis (defaults to [`clientdesk_core::DEFAULT_FOLDER_BASE`]).
    pub fn with_folder_base(mut self, base: &str) -> Self {
        self.clients = PgClientRepository::new(self.pool.clone()).with_folder_base(base);
        self
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            clients: self.clients.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("under_score"), "under\\_score");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_escape_like_plain_text_unchanged() {
        assert_eq!(escape_like("john doe"), "john doe");
        assert_eq!(escape_like(""), "");
    }

    #[test]
    fn test_escape_like_order_of_replacement() {
        // Backslash must be escaped first or it would double-escape
        // the escapes added for % and _.
        assert_eq!(escape_like("\\%"), "\\\\\\%");
    }
}
