//! 配置加载集成测试
//!
//! 在临时目录中写入配置文件，验证分层加载与类型转换。

use std::fs;

use learnbench_shared::config::{AppConfig, StoreBackend};
use learnbench_shared::error::LearnBenchError;

// ============================================================================
// 分层加载测试
// ============================================================================

#[test]
fn test_load_default_and_environment_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[store]
backend = "postgres"

[generation]
profile = "small"
multiplier = "3"
seed = 42
enforce_answer_in_options = true

[report]
output_dir = "reports"
export_json = true
"#,
    )
    .unwrap();
    // 未设置 LEARNBENCH_ENV 时加载 development.toml
    fs::write(
        dir.path().join("development.toml"),
        r#"
[report]
output_dir = "dev-reports"

[database]
insert_chunk_size = 250
"#,
    )
    .unwrap();

    let config = AppConfig::load(dir.path().to_str()).unwrap();

    assert_eq!(config.store.backend, StoreBackend::Postgres);
    assert_eq!(config.generation.profile, "small");
    assert_eq!(config.generation.multiplier.as_deref(), Some("3"));
    assert_eq!(config.generation.seed, Some(42));
    assert!(config.generation.enforce_answer_in_options);
    // 环境特定文件覆盖默认文件
    assert_eq!(config.report.output_dir, "dev-reports");
    assert!(config.report.export_json);
    assert!(config.report.export_csv);
    assert_eq!(config.database.insert_chunk_size, 250);
    // 未配置的项保留默认值
    assert_eq!(config.database.max_connections, 5);
    assert_eq!(config.generation.write_mode, "batched");
    assert!(!config.is_production());
}

#[test]
fn test_invalid_backend_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        "[store]\nbackend = \"cassandra\"\n",
    )
    .unwrap();

    let err = AppConfig::load(dir.path().to_str()).unwrap_err();
    let err = LearnBenchError::from(err);
    assert_eq!(err.code(), "CONFIG_ERROR");
    assert!(!err.is_precondition_violation());
}
