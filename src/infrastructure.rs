//! Infrastructure layer: database access, HTTP retrieval, HTML parsing,
//! configuration and logging.

pub mod config;
pub mod database_connection;
pub mod http_client;
pub mod item_repository;
pub mod logging;
pub mod parsing;

// Re-export commonly used items
pub use config::AppConfig;
pub use database_connection::DatabaseConnection;
pub use http_client::{HttpClient, HttpClientConfig};
pub use item_repository::{ApplyStats, SqliteItemRepository};
pub use parsing::{ExtractError, ExtractResult, ListingParser, ListingSelectors};
