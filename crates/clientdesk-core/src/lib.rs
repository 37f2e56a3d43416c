//! # clientdesk-core
//!
//! Core types, traits, and abstractions for the clientdesk service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the database and API crates depend on.

pub mod defaults;
pub mod documents;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use documents::{display_name, folder_url, DEFAULT_FOLDER_BASE};
pub use error::{Error, Result};
pub use ids::{extract_timestamp, is_v7, new_id};
pub use models::*;
pub use traits::*;
