// Database connection and pool management for the SQLite snapshot store.

use std::path::Path;

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    pub async fn new(database_url: &str) -> Result<Self> {
        let db_path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");

        // sqlx does not create the database file on its own.
        if db_path != ":memory:" && !Path::new(db_path).exists() {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::File::create(db_path)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        let create_categories_sql = r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                url TEXT NOT NULL,
                title TEXT NOT NULL
            )
        "#;

        let create_items_sql = r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                categories TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                img_url TEXT NOT NULL,
                name TEXT NOT NULL,
                price TEXT NOT NULL,
                discount TEXT NOT NULL DEFAULT '',
                first_seen DATETIME NOT NULL,
                last_seen DATETIME NOT NULL
            )
        "#;

        sqlx::query(create_categories_sql).execute(&self.pool).await?;
        sqlx::query(create_items_sql).execute(&self.pool).await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_url ON items (url)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_last_seen ON items (last_seen)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
