//! Repository layer for portfolio documents.
//!
//! One row per profile; the whole document is stored as a JSON blob and
//! replaced on every save. Last writer wins, which is fine for a
//! single-user tool.

use crate::domain::PortfolioDocument;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// A named profile for the account picker. The id doubles as the key of the
/// profile's portfolio document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
    pub avatar_color: String,
}

/// Repository for portfolio persistence.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Load the document for a profile. Returns None when the profile has
    /// never been saved.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored blob does not
    /// deserialize.
    pub async fn load_portfolio(
        &self,
        profile_id: &str,
    ) -> Result<Option<PortfolioDocument>, sqlx::Error> {
        let row = sqlx::query("SELECT document FROM portfolios WHERE profile_id = ?")
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let blob: String = row.get("document");
                let document = serde_json::from_str(&blob)
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// Replace a profile's document.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn save_portfolio(
        &self,
        profile_id: &str,
        document: &PortfolioDocument,
    ) -> Result<(), sqlx::Error> {
        let blob = serde_json::to_string(document)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        sqlx::query(
            r#"
            INSERT INTO portfolios (profile_id, document, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(profile_id) DO UPDATE
            SET document = excluded.document, updated_at = excluded.updated_at
            "#,
        )
        .bind(profile_id)
        .bind(blob)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Create or rename a profile.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn save_profile(&self, profile: &ProfileRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, name, avatar_color)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE
            SET name = excluded.name, avatar_color = excluded.avatar_color
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.avatar_color)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List registered profiles, sorted by name.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, name, avatar_color FROM profiles ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| ProfileRecord {
                id: row.get("id"),
                name: row.get("name"),
                avatar_color: row.get("avatar_color"),
            })
            .collect())
    }

    /// Remove a profile and its portfolio document. Returns whether anything
    /// existed to delete.
    ///
    /// # Errors
    /// Returns an error if either delete fails.
    pub async fn delete_profile(&self, profile_id: &str) -> Result<bool, sqlx::Error> {
        let profile = sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        let document = sqlx::query("DELETE FROM portfolios WHERE profile_id = ?")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(profile.rows_affected() > 0 || document.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::{Lot, LotStatus, PositionKind};
    use crate::domain::{Decimal, LotId, Ticker};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn repo() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (temp_dir, Repository::new(pool))
    }

    fn sample_document() -> PortfolioDocument {
        PortfolioDocument {
            trades: vec![Lot {
                id: LotId::generate(),
                kind: PositionKind::ShortPut,
                symbol: Ticker::new("MARA"),
                broker: None,
                open_date: NaiveDate::from_ymd_opt(2025, 12, 23).unwrap(),
                open_price: Decimal::parse("0.59").unwrap(),
                total_quantity: 2,
                remaining_quantity: 2,
                status: LotStatus::Open,
                expiry_date: NaiveDate::from_ymd_opt(2026, 1, 16),
                strike_price: Some(Decimal::parse("9.5").unwrap()),
                close_transactions: vec![],
            }],
            stock_portfolio: Default::default(),
            brokers: vec!["IBKR".to_string()],
        }
    }

    #[tokio::test]
    async fn test_load_missing_profile_is_none() {
        let (_tmp, repo) = repo().await;
        let loaded = repo.load_portfolio("nobody").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let (_tmp, repo) = repo().await;
        let document = sample_document();
        repo.save_portfolio("default", &document).await.unwrap();

        let loaded = repo.load_portfolio("default").await.unwrap().unwrap();
        assert_eq!(loaded, document);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_document() {
        let (_tmp, repo) = repo().await;
        repo.save_portfolio("default", &sample_document())
            .await
            .unwrap();
        repo.save_portfolio("default", &PortfolioDocument::default())
            .await
            .unwrap();

        let loaded = repo.load_portfolio("default").await.unwrap().unwrap();
        assert!(loaded.trades.is_empty());
    }

    #[tokio::test]
    async fn test_profiles_are_independent() {
        let (_tmp, repo) = repo().await;
        repo.save_portfolio("a", &sample_document()).await.unwrap();
        repo.save_portfolio("b", &PortfolioDocument::default())
            .await
            .unwrap();

        let a = repo.load_portfolio("a").await.unwrap().unwrap();
        let b = repo.load_portfolio("b").await.unwrap().unwrap();
        assert_eq!(a.trades.len(), 1);
        assert!(b.trades.is_empty());
    }

    #[tokio::test]
    async fn test_save_profile_upserts_and_lists_by_name() {
        let (_tmp, repo) = repo().await;
        repo.save_profile(&ProfileRecord {
            id: "p1".to_string(),
            name: "Zoe".to_string(),
            avatar_color: "#ef4444".to_string(),
        })
        .await
        .unwrap();
        repo.save_profile(&ProfileRecord {
            id: "p2".to_string(),
            name: "Ann".to_string(),
            avatar_color: "#3b82f6".to_string(),
        })
        .await
        .unwrap();
        // Renaming reuses the same row.
        repo.save_profile(&ProfileRecord {
            id: "p1".to_string(),
            name: "Zoe B".to_string(),
            avatar_color: "#ef4444".to_string(),
        })
        .await
        .unwrap();

        let profiles = repo.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "Ann");
        assert_eq!(profiles[1].name, "Zoe B");
    }

    #[tokio::test]
    async fn test_delete_profile_removes_record_and_document() {
        let (_tmp, repo) = repo().await;
        repo.save_profile(&ProfileRecord {
            id: "gone".to_string(),
            name: "Gone".to_string(),
            avatar_color: "#000000".to_string(),
        })
        .await
        .unwrap();
        repo.save_portfolio("gone", &sample_document()).await.unwrap();

        assert!(repo.delete_profile("gone").await.unwrap());
        assert!(!repo.delete_profile("gone").await.unwrap());
        assert!(repo.load_portfolio("gone").await.unwrap().is_none());
        assert!(repo.list_profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_profile_with_document_only() {
        // A profile addressed only via the query parameter has a document but
        // no picker record; deleting it still drops the document.
        let (_tmp, repo) = repo().await;
        repo.save_portfolio("adhoc", &sample_document()).await.unwrap();
        assert!(repo.delete_profile("adhoc").await.unwrap());
        assert!(repo.load_portfolio("adhoc").await.unwrap().is_none());
    }
}
