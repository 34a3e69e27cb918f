//! 用户模型
//!
//! 用户分为学生和讲师两种角色。讲师作为课程负责人被引用，
//! 学生在选课阶段获得已选课程列表。

use serde::{Deserialize, Serialize};

use crate::store::{Collection, StoredEntity};

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    /// 获取角色名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
        }
    }
}

/// 用户
///
/// `enrolled_course_ids` 创建时为空，只有学生会在选课阶段被追加课程 id。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub enrolled_course_ids: Vec<String>,
}

impl User {
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }
}

impl StoredEntity for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.id
    }
}
