use async_trait::async_trait;
use serde_json::Value;

use super::schema::Database;
use super::types::{DocumentStore, StoreError};

#[async_trait]
impl DocumentStore for Database {
    /// Full replace via `INSERT ... ON CONFLICT DO UPDATE`. The body column is
    /// overwritten wholesale, so no field of a previous version survives.
    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(body)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, doc_key, body, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(collection, doc_key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
        "#,
        )
        .bind(collection)
        .bind(key)
        .bind(&encoded)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND doc_key = ?")
                .bind(collection)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((body,)) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let db = test_db().await;
        db.put("Articles", "k", &json!({"title": "A"})).await.unwrap();

        let doc = db.get("Articles", "k").await.unwrap();
        assert_eq!(doc, Some(json!({"title": "A"})));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = test_db().await;
        assert_eq!(db.get("Articles", "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_whole_document() {
        let db = test_db().await;
        db.put("Articles", "k", &json!({"title": "A", "imgUrl": "x"}))
            .await
            .unwrap();
        db.put("Articles", "k", &json!({"title": "B"})).await.unwrap();

        let doc = db.get("Articles", "k").await.unwrap().unwrap();
        assert_eq!(doc, json!({"title": "B"}));
        assert_eq!(db.count("Articles").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_collections_are_separate() {
        let db = test_db().await;
        db.put("Articles", "k", &json!(1)).await.unwrap();
        db.put("Other", "k", &json!(2)).await.unwrap();

        assert_eq!(db.get("Articles", "k").await.unwrap(), Some(json!(1)));
        assert_eq!(db.get("Other", "k").await.unwrap(), Some(json!(2)));
        assert_eq!(db.count("Articles").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reopen_migrations_idempotent() {
        let db = test_db().await;
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
        assert_eq!(db.count("Articles").await.unwrap(), 0);
    }
}
