//! 在线学习领域数据模型
//!
//! 每个实体对应一个集合，父子关系只通过 id 字段表达（扁平、规范化存储），
//! 不在文档中内嵌子对象。

pub mod course;
pub mod enrollment;
pub mod user;

pub use course::{Course, Lesson, Question, Quiz};
pub use enrollment::Enrollment;
pub use user::{Role, User};
