//! 课程树模型
//!
//! Course → Lesson → Quiz → Question 四层结构。
//! 子实体持有父实体 id，父实体持有有序的子实体 id 列表。

use serde::{Deserialize, Serialize};

use crate::store::{Collection, StoredEntity};

/// 课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 讲师用户 id
    pub instructor_id: String,
    #[serde(default)]
    pub lesson_ids: Vec<String>,
}

/// 课时
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub quiz_ids: Vec<String>,
}

/// 测验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub lesson_id: String,
    pub title: String,
    #[serde(default)]
    pub question_ids: Vec<String>,
}

/// 测验题目
///
/// 默认生成方式下 `correct_answer` 与 `options` 相互独立，
/// 只有开启答案校验时才保证答案出现在选项中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub quiz_id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl Question {
    /// 正确答案是否在选项中
    pub fn answer_in_options(&self) -> bool {
        self.options.iter().any(|o| o == &self.correct_answer)
    }

    /// 选项是否两两不同
    pub fn has_distinct_options(&self) -> bool {
        self.options
            .iter()
            .enumerate()
            .all(|(i, o)| !self.options[..i].contains(o))
    }
}

impl StoredEntity for Course {
    const COLLECTION: Collection = Collection::Courses;

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Lesson {
    const COLLECTION: Collection = Collection::Lessons;

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Quiz {
    const COLLECTION: Collection = Collection::Quizzes;

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Question {
    const COLLECTION: Collection = Collection::QuizQuestions;

    fn id(&self) -> &str {
        &self.id
    }
}
