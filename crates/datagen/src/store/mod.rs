//! 文档存储适配层
//!
//! 生成器只依赖 [`DocumentStore`] trait，把存储当作不透明的批量写入目标。
//! 提供两种实现：
//!
//! - `memory`: DashMap 实现的进程内存储，适用于测试和本地试跑
//! - `postgres`: 以 JSONB 文档表模拟文档数据库

pub mod memory_store;
pub mod postgres_store;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::info;

use learnbench_shared::config::{AppConfig, StoreBackend};
use learnbench_shared::database::Database;
use learnbench_shared::error::{LearnBenchError, Result};

pub use memory_store::MemoryDocumentStore;
pub use postgres_store::PostgresDocumentStore;

/// 文档：JSON 对象，`id` 字段为主键
pub type Document = Map<String, Value>;

/// 主键字段名
pub const ID_FIELD: &str = "id";

/// 数据集包含的集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Courses,
    Lessons,
    Quizzes,
    QuizQuestions,
    Enrollments,
}

impl Collection {
    /// 所有集合
    pub const ALL: [Collection; 6] = [
        Self::Users,
        Self::Courses,
        Self::Enrollments,
        Self::Lessons,
        Self::Quizzes,
        Self::QuizQuestions,
    ];

    /// 集合名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Courses => "courses",
            Self::Lessons => "lessons",
            Self::Quizzes => "quizzes",
            Self::QuizQuestions => "quiz_questions",
            Self::Enrollments => "enrollments",
        }
    }

    /// 所有集合名称
    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Collection::name).collect()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 文档筛选条件
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentFilter {
    /// 匹配集合中的所有文档
    All,
    /// 顶层字段等于给定值
    Eq { field: String, value: Value },
}

impl DocumentFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// 判断文档是否满足条件
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => document.get(field) == Some(value),
        }
    }
}

/// 写入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// 每层每门课程一次 insert_many
    #[default]
    Batched,
    /// 逐条 insert_one，用于与批量写入对比
    PerDocument,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batched => "batched",
            Self::PerDocument => "per-document",
        }
    }
}

impl FromStr for WriteMode {
    type Err = LearnBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batched" | "batch" => Ok(Self::Batched),
            "per-document" | "per_document" | "single" => Ok(Self::PerDocument),
            other => Err(LearnBenchError::InvalidArgument {
                field: "write_mode".to_string(),
                message: format!("未知的写入模式: {other}（可选 batched, per-document）"),
            }),
        }
    }
}

/// 文档存储
///
/// 不提供跨集合事务，跨集合一致性由调用方的写入顺序保证。
/// 更新语义为顶层字段覆盖（等价于 `$set`），补丁中不允许修改 `id`。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 后端名称，用于日志和报告文件命名
    fn backend_name(&self) -> &'static str;

    /// 确保集合存在（首次写入前调用，可重复调用）
    async fn ensure_collections(&self, names: &[&str]) -> Result<()>;

    /// 清空集合
    ///
    /// 对空集合或不存在的集合调用同样成功。
    async fn reset_collection(&self, name: &str) -> Result<()>;

    /// 插入单个文档
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()>;

    /// 批量插入文档，返回插入数量
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize>;

    /// 按 id 更新单个文档，返回是否命中
    async fn update_one(&self, collection: &str, id: &str, patch: Document) -> Result<bool>;

    /// 批量更新满足条件的文档，返回更新数量
    async fn update_many(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        patch: Document,
    ) -> Result<u64>;

    /// 批量删除满足条件的文档，返回删除数量
    async fn delete_many(&self, collection: &str, filter: &DocumentFilter) -> Result<u64>;

    /// 读取集合中的全部文档
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// 集合文档数量
    async fn count(&self, collection: &str) -> Result<u64>;
}

/// 可持久化的实体
pub trait StoredEntity: Serialize + DeserializeOwned {
    /// 实体所在集合
    const COLLECTION: Collection;

    /// 实体 id
    fn id(&self) -> &str;
}

/// 实体转换为文档
pub fn to_document<T: StoredEntity>(entity: &T) -> Result<Document> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(LearnBenchError::InvalidDocument {
            collection: T::COLLECTION.name().to_string(),
            reason: format!("实体序列化结果不是对象: {other}"),
        }),
    }
}

/// 文档转换为实体
pub fn from_document<T: StoredEntity>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// 读取文档 id
pub fn document_id<'a>(collection: &str, document: &'a Document) -> Result<&'a str> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| LearnBenchError::InvalidDocument {
            collection: collection.to_string(),
            reason: "缺少字符串类型的 id 字段".to_string(),
        })
}

/// 校验更新补丁
pub(crate) fn check_patch(collection: &str, patch: &Document) -> Result<()> {
    if patch.contains_key(ID_FIELD) {
        return Err(LearnBenchError::InvalidDocument {
            collection: collection.to_string(),
            reason: "更新补丁不能修改 id".to_string(),
        });
    }
    Ok(())
}

/// 构造单字段补丁
pub fn set_field(field: &str, value: impl Into<Value>) -> Document {
    let mut patch = Document::new();
    patch.insert(field.to_string(), value.into());
    patch
}

/// 按写入模式持久化一组实体，返回写入数量
pub async fn write_entities<T: StoredEntity>(
    store: &dyn DocumentStore,
    entities: &[T],
    mode: WriteMode,
) -> Result<usize> {
    if entities.is_empty() {
        return Ok(0);
    }

    let collection = T::COLLECTION.name();
    let documents = entities
        .iter()
        .map(to_document)
        .collect::<Result<Vec<_>>>()?;

    match mode {
        WriteMode::Batched => store.insert_many(collection, documents).await,
        WriteMode::PerDocument => {
            let total = documents.len();
            for document in documents {
                store.insert_one(collection, document).await?;
            }
            Ok(total)
        }
    }
}

/// 读取集合中的全部实体
pub async fn find_all_as<T: StoredEntity>(store: &dyn DocumentStore) -> Result<Vec<T>> {
    store
        .find_all(T::COLLECTION.name())
        .await?
        .into_iter()
        .map(from_document)
        .collect()
}

/// 根据配置打开存储
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("使用内存存储");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            db.health_check().await?;
            let version = db.server_version().await?;
            info!(%version, "使用 PostgreSQL 文档存储");
            Ok(Arc::new(PostgresDocumentStore::new(
                db,
                config.database.insert_chunk_size,
            )))
        }
    }
}
