//! 数据生成
//!
//! - `fake_values`: 注入式随机值提供者
//! - `scale`: 倍数与预设规模
//! - `graph_generator`: 用户与课程树生成、持久化
//! - `enrollment_sampler`: 学生选课抽样
//! - `integrity`: 生成结果的完整性校验

pub mod enrollment_sampler;
pub mod fake_values;
pub mod graph_generator;
pub mod integrity;
pub mod scale;

pub use enrollment_sampler::{EnrollmentOutcome, EnrollmentSampler};
pub use fake_values::{FakeValueProvider, FakerProvider};
pub use graph_generator::{
    CourseTree, EntityGraphGenerator, GenerationStats, GeneratorConfig, OPTIONS_PER_QUESTION,
};
pub use integrity::{CollectionCounts, EntityGraph, IntegrityReport, check_store};
pub use scale::{GenerationCounts, Multiplier, Profile};
