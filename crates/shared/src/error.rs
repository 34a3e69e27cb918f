//! 统一错误处理模块
//!
//! 定义生成器、存储适配器和基准测试共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum LearnBenchError {
    // ==================== 存储错误 ====================
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("文档序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("无效文档: collection={collection} - {reason}")]
    InvalidDocument { collection: String, reason: String },

    #[error("存储错误: {0}")]
    Store(String),

    // ==================== 生成前置条件错误 ====================
    #[error("用户集合中没有讲师，无法为课程分配讲师")]
    NoInstructors,

    #[error("样本总体不足: 需要 {required}, 实际 {available}")]
    InsufficientPopulation { required: usize, available: usize },

    // ==================== 配置错误 ====================
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("无效的参数: {field} - {message}")]
    InvalidArgument { field: String, message: String },

    // ==================== 报告错误 ====================
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, LearnBenchError>;

impl LearnBenchError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::InvalidDocument { .. } => "INVALID_DOCUMENT",
            Self::Store(_) => "STORE_ERROR",
            Self::NoInstructors => "NO_INSTRUCTORS",
            Self::InsufficientPopulation { .. } => "INSUFFICIENT_POPULATION",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// 是否为引用前置条件不满足
    ///
    /// 此类错误说明生成配置本身不可行，重试没有意义，需要先重置存储并调整配置。
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::NoInstructors | Self::InsufficientPopulation { .. }
        )
    }
}
