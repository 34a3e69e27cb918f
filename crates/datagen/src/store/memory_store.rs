//! 内存文档存储
//!
//! 使用 DashMap 实现的进程内文档存储，适用于测试和开发环境。
//! 每个集合内部以 id 排序保存，使 `find_all` 的返回顺序可复现。

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use learnbench_shared::error::{LearnBenchError, Result};

use super::{Document, DocumentFilter, DocumentStore, check_patch, document_id};

type CollectionData = BTreeMap<String, Document>;

/// 内存文档存储
///
/// 集合在首次写入时自动创建，与文档数据库的行为一致。
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: DashMap<String, CollectionData>,
}

impl MemoryDocumentStore {
    /// 创建新的内存存储实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 id 获取文档
    pub fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .get(collection)
            .and_then(|data| data.get(id).cloned())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ensure_collections(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.collections.entry((*name).to_string()).or_default();
        }
        Ok(())
    }

    async fn reset_collection(&self, name: &str) -> Result<()> {
        let removed = self.collections.remove(name).map(|(_, data)| data.len());
        debug!(collection = name, removed = ?removed, "集合已清空");
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.insert_many(collection, vec![document]).await.map(|_| ())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        let mut data = self.collections.entry(collection.to_string()).or_default();

        // 先整体校验，避免部分写入
        let mut batch = BTreeMap::new();
        for document in documents {
            let id = document_id(collection, &document)?.to_string();
            if data.contains_key(&id) || batch.contains_key(&id) {
                return Err(LearnBenchError::Store(format!(
                    "重复的文档 id: {collection}/{id}"
                )));
            }
            batch.insert(id, document);
        }

        let inserted = batch.len();
        data.extend(batch);
        Ok(inserted)
    }

    async fn update_one(&self, collection: &str, id: &str, patch: Document) -> Result<bool> {
        check_patch(collection, &patch)?;

        let Some(mut data) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        match data.get_mut(id) {
            Some(document) => {
                document.extend(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        patch: Document,
    ) -> Result<u64> {
        check_patch(collection, &patch)?;

        let Some(mut data) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut updated = 0;
        for document in data.values_mut().filter(|d| filter.matches(d)) {
            document.extend(patch.clone());
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_many(&self, collection: &str, filter: &DocumentFilter) -> Result<u64> {
        let Some(mut data) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = data.len();
        data.retain(|_, document| !filter.matches(document));
        Ok((before - data.len()) as u64)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|data| data.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        Ok(self
            .collections
            .get(collection)
            .map(|data| data.len() as u64)
            .unwrap_or(0))
    }
}
