//! 统一可观测性模块
//!
//! 提供日志与追踪订阅器的统一初始化。
//! 生成器和基准测试通过单一入口点配置日志，确保一致的字段命名和输出格式。

pub mod tracing;

use ::tracing::debug;
use anyhow::Result;

use crate::config::ObservabilityConfig;

/// 统一初始化可观测性
///
/// `RUST_LOG` 环境变量优先于配置中的日志级别。
///
/// # Example
///
/// ```ignore
/// use learnbench_shared::config::ObservabilityConfig;
/// use learnbench_shared::observability;
///
/// let config = ObservabilityConfig::default();
/// observability::init(&config)?;
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;

    debug!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(())
}
