//! SQLite-backed item store.
//!
//! Categories are persisted as an ordered comma-joined list in a single
//! column and parsed back into a set on load. All writes of one
//! reconciliation pass go through [`SqliteItemRepository::apply_reconciliation`]
//! inside one transaction.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::domain::collaborators::ItemStore;
use crate::domain::item::{
    categories_from_column, categories_to_column, CanonicalItem, Category, Reconciliation,
    StoredItem,
};

/// Counts of the writes applied for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub inserted: usize,
    pub updated: usize,
    /// Unchanged items whose `last_seen` was silently refreshed.
    pub touched: usize,
}

#[derive(Clone)]
pub struct SqliteItemRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Insert categories that are not present yet. The original snapshot
    /// database shipped pre-seeded; a fresh one starts empty.
    pub async fn seed_categories(&self, categories: &[Category]) -> Result<()> {
        for category in categories {
            sqlx::query("INSERT OR IGNORE INTO categories (id, url, title) VALUES (?, ?, ?)")
                .bind(category.id)
                .bind(&category.url)
                .bind(&category.title)
                .execute(&*self.pool)
                .await
                .with_context(|| format!("Failed to seed category {}", category.id))?;
        }
        Ok(())
    }

    /// Apply all writes of one reconciliation pass in a single transaction:
    /// inserts, updates, and the silent `last_seen` touch of unchanged
    /// items. Disappeared items are left untouched.
    pub async fn apply_reconciliation(
        &self,
        reconciliation: &Reconciliation,
        pass_time: DateTime<Utc>,
    ) -> Result<ApplyStats> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut stats = ApplyStats::default();

        for item in &reconciliation.inserts {
            sqlx::query(
                r#"
                INSERT INTO items
                (categories, url, img_url, name, price, discount, first_seen, last_seen)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(categories_to_column(&item.categories))
            .bind(&item.url)
            .bind(&item.image_url)
            .bind(&item.name)
            .bind(&item.price)
            .bind(&item.discount)
            .bind(item.first_seen)
            .bind(item.last_seen)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert item {}", item.url))?;
            stats.inserted += 1;
        }

        for item in &reconciliation.updates {
            let id = item
                .id
                .with_context(|| format!("Update for {} carries no identity", item.url))?;
            sqlx::query(
                r#"
                UPDATE items
                SET categories = ?, img_url = ?, name = ?, price = ?, discount = ?,
                    first_seen = ?, last_seen = ?
                WHERE id = ?
                "#,
            )
            .bind(categories_to_column(&item.categories))
            .bind(&item.image_url)
            .bind(&item.name)
            .bind(&item.price)
            .bind(&item.discount)
            .bind(item.first_seen)
            .bind(item.last_seen)
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to update item {}", item.url))?;
            stats.updated += 1;
        }

        for item in &reconciliation.unchanged {
            let id = item
                .id
                .with_context(|| format!("Unchanged item {} carries no identity", item.url))?;
            sqlx::query("UPDATE items SET last_seen = ? WHERE id = ?")
                .bind(pass_time)
                .bind(id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to touch item {}", item.url))?;
            stats.touched += 1;
        }

        tx.commit().await.context("Failed to commit pass")?;

        info!(
            "Applied pass: {} inserted, {} updated, {} touched",
            stats.inserted, stats.updated, stats.touched
        );
        Ok(stats)
    }
}

#[async_trait]
impl ItemStore for SqliteItemRepository {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, url, title FROM categories ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .context("Failed to load categories")?;

        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: row.get("id"),
                url: row.get("url"),
                title: row.get("title"),
            })
            .collect())
    }

    async fn load_current_items(&self) -> Result<Vec<StoredItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, categories, url, img_url, name, price, discount, first_seen, last_seen
            FROM items ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .context("Failed to load item snapshot")?;

        Ok(rows
            .into_iter()
            .map(|row| StoredItem {
                id: row.get("id"),
                categories: categories_from_column(row.get("categories")),
                url: row.get("url"),
                image_url: row.get("img_url"),
                name: row.get("name"),
                price: row.get("price"),
                discount: row.get("discount"),
                first_seen: row.get("first_seen"),
                last_seen: row.get("last_seen"),
            })
            .collect())
    }

    async fn insert_item(&self, item: &CanonicalItem) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO items
            (categories, url, img_url, name, price, discount, first_seen, last_seen)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(categories_to_column(&item.categories))
        .bind(&item.url)
        .bind(&item.image_url)
        .bind(&item.name)
        .bind(&item.price)
        .bind(&item.discount)
        .bind(item.first_seen)
        .bind(item.last_seen)
        .execute(&*self.pool)
        .await
        .with_context(|| format!("Failed to insert item {}", item.url))?;

        Ok(result.last_insert_rowid())
    }

    async fn update_item(&self, id: i64, item: &CanonicalItem) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE items
            SET categories = ?, img_url = ?, name = ?, price = ?, discount = ?,
                first_seen = ?, last_seen = ?
            WHERE id = ?
            "#,
        )
        .bind(categories_to_column(&item.categories))
        .bind(&item.image_url)
        .bind(&item.name)
        .bind(&item.price)
        .bind(&item.discount)
        .bind(item.first_seen)
        .bind(item.last_seen)
        .bind(id)
        .execute(&*self.pool)
        .await
        .with_context(|| format!("Failed to update item {}", item.url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database_connection::DatabaseConnection;
    use chrono::TimeZone;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    async fn test_repository(dir: &tempfile::TempDir) -> Result<SqliteItemRepository> {
        let db_path = dir.path().join("items.db");
        let db = DatabaseConnection::new(&format!("sqlite:{}", db_path.display())).await?;
        db.migrate().await?;
        Ok(SqliteItemRepository::new(db.pool().clone()))
    }

    fn canonical(url: &str, categories: &[i64]) -> CanonicalItem {
        let now = Utc.timestamp_opt(1_500_000_000, 0).unwrap();
        CanonicalItem {
            id: None,
            categories: categories.iter().copied().collect::<BTreeSet<_>>(),
            url: url.to_string(),
            image_url: format!("http://cdn.example.com{url}.jpg"),
            name: format!("Item {url}"),
            price: "100".to_string(),
            discount: String::new(),
            first_seen: now,
            last_seen: now,
        }
    }

    #[tokio::test]
    async fn insert_then_load_round_trips_category_set() -> Result<()> {
        let dir = tempdir()?;
        let repo = test_repository(&dir).await?;

        let item = canonical("/p1", &[2, 1]);
        let id = repo.insert_item(&item).await?;
        assert!(id > 0);

        let stored = repo.load_current_items().await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].url, "/p1");
        assert_eq!(stored[0].categories, [1, 2].into_iter().collect());
        Ok(())
    }

    #[tokio::test]
    async fn seeded_categories_are_listed_in_id_order() -> Result<()> {
        let dir = tempdir()?;
        let repo = test_repository(&dir).await?;

        let categories = vec![
            Category { id: 4, url: "/skafferi".to_string(), title: "Skafferi".to_string() },
            Category { id: 0, url: "/kampanj".to_string(), title: "Kampanj".to_string() },
        ];
        repo.seed_categories(&categories).await?;
        repo.seed_categories(&categories).await?; // idempotent

        let listed = repo.list_categories().await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, 0);
        assert_eq!(listed[1].id, 4);
        Ok(())
    }

    #[tokio::test]
    async fn seeding_an_empty_list_is_a_no_op() -> Result<()> {
        let dir = tempdir()?;
        let repo = test_repository(&dir).await?;

        repo.seed_categories(&[]).await?;
        assert!(repo.list_categories().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn apply_reconciliation_covers_insert_update_and_touch() -> Result<()> {
        let dir = tempdir()?;
        let repo = test_repository(&dir).await?;

        let existing_id = repo.insert_item(&canonical("/p1", &[1])).await?;
        let untouched_id = repo.insert_item(&canonical("/p2", &[1])).await?;

        let pass_time = Utc.timestamp_opt(1_500_100_000, 0).unwrap();
        let mut updated = canonical("/p1", &[1, 2]);
        updated.id = Some(existing_id);
        updated.price = "80".to_string();
        updated.last_seen = pass_time;

        let mut unchanged = canonical("/p2", &[1]);
        unchanged.id = Some(untouched_id);

        let reconciliation = Reconciliation {
            inserts: vec![canonical("/p3", &[2])],
            updates: vec![updated],
            unchanged: vec![unchanged],
            disappeared: Vec::new(),
        };

        let stats = repo.apply_reconciliation(&reconciliation, pass_time).await?;
        assert_eq!(stats, ApplyStats { inserted: 1, updated: 1, touched: 1 });

        let stored = repo.load_current_items().await?;
        assert_eq!(stored.len(), 3);

        let p1 = stored.iter().find(|i| i.url == "/p1").unwrap();
        assert_eq!(p1.price, "80");
        assert_eq!(p1.categories, [1, 2].into_iter().collect());

        let p2 = stored.iter().find(|i| i.url == "/p2").unwrap();
        assert_eq!(p2.last_seen, pass_time);
        Ok(())
    }
}
