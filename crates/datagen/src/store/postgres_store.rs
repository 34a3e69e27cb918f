//! PostgreSQL 文档存储
//!
//! 所有集合共用一张 JSONB 文档表，以 (collection, id) 为主键。
//! 批量插入按 `chunk_size` 拆分为多条多值 INSERT，控制往返次数与绑定参数数量。

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, instrument};

use learnbench_shared::database::Database;
use learnbench_shared::error::Result;

use super::{Document, DocumentFilter, DocumentStore, check_patch, document_id};

const CREATE_DOCUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body JSONB NOT NULL,
    PRIMARY KEY (collection, id)
)
"#;

/// 每条绑定参数上限为 65535，每个文档占 3 个参数
const MAX_CHUNK_SIZE: usize = 20_000;

/// PostgreSQL 文档存储
#[derive(Clone)]
pub struct PostgresDocumentStore {
    db: Database,
    chunk_size: usize,
}

impl PostgresDocumentStore {
    pub fn new(db: Database, chunk_size: usize) -> Self {
        Self {
            db,
            chunk_size: effective_chunk_size(chunk_size),
        }
    }

    async fn ensure_table(&self) -> Result<()> {
        sqlx::query(CREATE_DOCUMENTS_TABLE)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

fn effective_chunk_size(requested: usize) -> usize {
    requested.clamp(1, MAX_CHUNK_SIZE)
}

/// 追加筛选条件
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &DocumentFilter) {
    if let DocumentFilter::Eq { field, value } = filter {
        builder
            .push(" AND body -> ")
            .push_bind(field.clone())
            .push(" = ")
            .push_bind(Json(value.clone()));
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ensure_collections(&self, _names: &[&str]) -> Result<()> {
        // 集合是文档表中的逻辑分区，只需保证表存在
        self.ensure_table().await
    }

    #[instrument(skip(self))]
    async fn reset_collection(&self, name: &str) -> Result<()> {
        self.ensure_table().await?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(name)
            .execute(self.db.pool())
            .await?;
        debug!(removed = result.rows_affected(), "集合已清空");
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        let id = document_id(collection, &document)?.to_string();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(document))
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        let rows = documents
            .into_iter()
            .map(|document| {
                let id = document_id(collection, &document)?.to_string();
                Ok((id, document))
            })
            .collect::<Result<Vec<_>>>()?;

        let total = rows.len();
        let mut rows = rows.into_iter();
        loop {
            let chunk: Vec<(String, Document)> = rows.by_ref().take(self.chunk_size).collect();
            if chunk.is_empty() {
                break;
            }

            let mut builder: QueryBuilder<'_, Postgres> =
                QueryBuilder::new("INSERT INTO documents (collection, id, body) ");
            builder.push_values(chunk, |mut row, (id, document)| {
                row.push_bind(collection.to_string())
                    .push_bind(id)
                    .push_bind(Json(document));
            });
            builder.build().execute(self.db.pool()).await?;
        }

        Ok(total)
    }

    async fn update_one(&self, collection: &str, id: &str, patch: Document) -> Result<bool> {
        check_patch(collection, &patch)?;
        let result = sqlx::query(
            "UPDATE documents SET body = body || $3 WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(patch))
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        patch: Document,
    ) -> Result<u64> {
        check_patch(collection, &patch)?;

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE documents SET body = body || ");
        builder
            .push_bind(Json(patch))
            .push(" WHERE collection = ")
            .push_bind(collection.to_string());
        push_filter(&mut builder, filter);

        let result = builder.build().execute(self.db.pool()).await?;
        Ok(result.rows_affected())
    }

    async fn delete_many(&self, collection: &str, filter: &DocumentFilter) -> Result<u64> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("DELETE FROM documents WHERE collection = ");
        builder.push_bind(collection.to_string());
        push_filter(&mut builder, filter);

        let result = builder.build().execute(self.db.pool()).await?;
        Ok(result.rows_affected())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let rows: Vec<(Json<Document>,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = $1 ORDER BY id")
                .bind(collection)
                .fetch_all(self.db.pool())
                .await?;
        Ok(rows.into_iter().map(|(Json(body),)| body).collect())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::set_field;
    use learnbench_shared::config::DatabaseConfig;
    use serde_json::json;

    async fn test_store() -> PostgresDocumentStore {
        let config = DatabaseConfig {
            url: std::env::var("TEST_DATABASE_URL")
                .unwrap_or_else(|_| DatabaseConfig::default().url),
            ..Default::default()
        };
        let db = Database::connect(&config).await.expect("无法连接数据库");
        PostgresDocumentStore::new(db, 2)
    }

    fn doc(id: &str, value: i64) -> Document {
        let mut document = Document::new();
        document.insert("id".to_string(), json!(id));
        document.insert("value".to_string(), json!(value));
        document
    }

    #[test]
    fn test_chunk_size_is_clamped() {
        assert_eq!(effective_chunk_size(0), 1);
        assert_eq!(effective_chunk_size(500), 500);
        assert_eq!(effective_chunk_size(1_000_000), MAX_CHUNK_SIZE);
    }

    #[tokio::test]
    #[ignore = "需要数据库"]
    async fn test_postgres_store_crud() {
        let store = test_store().await;
        let collection = "pg_store_crud_test";

        store.reset_collection(collection).await.unwrap();
        store.reset_collection(collection).await.unwrap();

        // 5 个文档、chunk_size 为 2，走多次批量插入
        let docs = (0..5).map(|i| doc(&format!("d{i}"), i)).collect();
        assert_eq!(store.insert_many(collection, docs).await.unwrap(), 5);
        store.insert_one(collection, doc("d9", 9)).await.unwrap();
        assert_eq!(store.count(collection).await.unwrap(), 6);

        assert!(
            store
                .update_one(collection, "d1", set_field("value", 100))
                .await
                .unwrap()
        );
        let updated = store
            .update_many(collection, &DocumentFilter::eq("value", 100), set_field("hot", true))
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let all = store.find_all(collection).await.unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all[1]["hot"], json!(true));

        let deleted = store
            .delete_many(collection, &DocumentFilter::All)
            .await
            .unwrap();
        assert_eq!(deleted, 6);
        store.reset_collection(collection).await.unwrap();
    }
}
