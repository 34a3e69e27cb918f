//! 选课记录模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Collection, StoredEntity};

/// 选课记录
///
/// 每个 (user_id, course_id) 组合只对应一条记录。
/// `progress` 以百分比字符串存储，如 "42%"。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrollment_date: DateTime<Utc>,
    pub progress: String,
}

impl Enrollment {
    /// 格式化学习进度
    pub fn format_progress(percent: u8) -> String {
        format!("{}%", percent)
    }

    /// 解析学习进度百分比
    ///
    /// 格式不正确或超出 0-100 时返回 None
    pub fn progress_percent(&self) -> Option<u8> {
        self.progress
            .strip_suffix('%')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|p| *p <= 100)
    }
}

impl StoredEntity for Enrollment {
    const COLLECTION: Collection = Collection::Enrollments;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment_with_progress(progress: &str) -> Enrollment {
        Enrollment {
            id: "e-1".to_string(),
            user_id: "u-1".to_string(),
            course_id: "c-1".to_string(),
            enrollment_date: Utc::now(),
            progress: progress.to_string(),
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(enrollment_with_progress("0%").progress_percent(), Some(0));
        assert_eq!(enrollment_with_progress("57%").progress_percent(), Some(57));
        assert_eq!(enrollment_with_progress("100%").progress_percent(), Some(100));
        assert_eq!(enrollment_with_progress("101%").progress_percent(), None);
        assert_eq!(enrollment_with_progress("57").progress_percent(), None);
        assert_eq!(enrollment_with_progress("abc%").progress_percent(), None);
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(Enrollment::format_progress(42), "42%");
    }

    #[test]
    fn test_enrollment_date_serialization() {
        let enrollment = enrollment_with_progress("10%");
        let value = serde_json::to_value(&enrollment).unwrap();
        assert!(value["enrollmentDate"].is_string());
        assert_eq!(value["userId"], "u-1");

        let back: Enrollment = serde_json::from_value(value).unwrap();
        assert_eq!(back.enrollment_date, enrollment.enrollment_date);
    }
}
