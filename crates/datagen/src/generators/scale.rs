//! 规模控制
//!
//! 倍数只作用于顶层实体（用户、课程），每个父实体下的子实体数量保持不变，
//! 因此总文档数随倍数线性增长。

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use learnbench_shared::error::LearnBenchError;

/// 规模倍数
///
/// 始终为正整数；任何非法输入都回退为 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplier(usize);

impl Multiplier {
    pub const ONE: Multiplier = Multiplier(1);

    /// 从整数构造，0 或负数视为非法并回退为 1
    pub fn from_int(value: i64) -> Self {
        match usize::try_from(value) {
            Ok(value) if value > 0 => Self(value),
            _ => {
                warn!(value, "倍数必须为正整数，使用默认值 1");
                Self::ONE
            }
        }
    }

    /// 解析用户输入的倍数
    ///
    /// 非整数输入记录警告并回退为 1，不会中断运行。
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(value) => Self::from_int(value),
            Err(_) => {
                warn!(input, "未提供整数倍数，使用默认值 1");
                Self::ONE
            }
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 预设规模
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// 10 用户、20 课程，嵌套 5/2/3
    Small,
    /// 100 用户、20 课程，嵌套 5/2/3
    #[default]
    Standard,
    /// 1000 用户、200 课程，嵌套 50/20/30
    Stress,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Standard => "standard",
            Self::Stress => "stress",
        }
    }

    /// 预设的基础数量
    pub fn counts(&self) -> GenerationCounts {
        match self {
            Self::Small => GenerationCounts {
                users: 10,
                ..Self::Standard.counts()
            },
            Self::Standard => GenerationCounts {
                users: 100,
                courses: 20,
                lessons_per_course: 5,
                quizzes_per_lesson: 2,
                questions_per_quiz: 3,
                enrollments_per_student: 2,
            },
            Self::Stress => GenerationCounts {
                users: 1000,
                courses: 200,
                lessons_per_course: 50,
                quizzes_per_lesson: 20,
                questions_per_quiz: 30,
                enrollments_per_student: 20,
            },
        }
    }
}

impl FromStr for Profile {
    type Err = LearnBenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "standard" | "default" => Ok(Self::Standard),
            "stress" | "large" => Ok(Self::Stress),
            other => Err(LearnBenchError::InvalidArgument {
                field: "profile".to_string(),
                message: format!("未知的预设规模: {other}（可选 small, standard, stress）"),
            }),
        }
    }
}

/// 生成数量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationCounts {
    pub users: usize,
    pub courses: usize,
    pub lessons_per_course: usize,
    pub quizzes_per_lesson: usize,
    pub questions_per_quiz: usize,
    /// 每个学生选修的课程数
    pub enrollments_per_student: usize,
}

impl Default for GenerationCounts {
    fn default() -> Self {
        Profile::Standard.counts()
    }
}

impl GenerationCounts {
    /// 应用倍数，只放大用户和课程数量
    ///
    /// 乘积溢出时视为非法倍数，记录警告并按倍数 1 处理。
    pub fn scaled(&self, multiplier: Multiplier) -> Self {
        let m = multiplier.get();
        match (self.users.checked_mul(m), self.courses.checked_mul(m)) {
            (Some(users), Some(courses)) => Self {
                users,
                courses,
                ..*self
            },
            _ => {
                warn!(%multiplier, "倍数过大导致数量溢出，使用默认值 1");
                *self
            }
        }
    }

    pub fn total_lessons(&self) -> usize {
        self.courses * self.lessons_per_course
    }

    pub fn total_quizzes(&self) -> usize {
        self.total_lessons() * self.quizzes_per_lesson
    }

    pub fn total_questions(&self) -> usize {
        self.total_quizzes() * self.questions_per_quiz
    }
}
