//! 共享库
//!
//! 包含数据生成器与基准测试共用的配置、错误处理、数据库连接和日志初始化代码。

pub mod config;
pub mod database;
pub mod error;
pub mod observability;
