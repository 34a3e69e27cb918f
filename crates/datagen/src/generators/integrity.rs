//! 数据集完整性校验
//!
//! 读取存储中的全部实体，检查父子引用双向一致、选课记录与用户已选课程列表一致，
//! 并可按期望数量核对各集合规模。

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use learnbench_shared::error::Result;

use super::scale::GenerationCounts;
use crate::models::{Course, Enrollment, Lesson, Question, Quiz, User};
use crate::store::{DocumentStore, find_all_as};

/// 单次校验最多保留的问题条数
const MAX_VIOLATIONS: usize = 50;

/// 各集合文档数量
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionCounts {
    pub users: usize,
    pub students: usize,
    pub instructors: usize,
    pub courses: usize,
    pub lessons: usize,
    pub quizzes: usize,
    pub questions: usize,
    pub enrollments: usize,
}

impl fmt::Display for CollectionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "users:          {} (students {}, instructors {})",
            self.users, self.students, self.instructors
        )?;
        writeln!(f, "courses:        {}", self.courses)?;
        writeln!(f, "lessons:        {}", self.lessons)?;
        writeln!(f, "quizzes:        {}", self.quizzes)?;
        writeln!(f, "quiz_questions: {}", self.questions)?;
        write!(f, "enrollments:    {}", self.enrollments)
    }
}

/// 校验结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub counts: CollectionCounts,
    pub violations: Vec<String>,
    /// 超出保留上限而未记录的问题数
    pub truncated: usize,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    fn violation(&mut self, message: String) {
        if self.violations.len() < MAX_VIOLATIONS {
            self.violations.push(message);
        } else {
            self.truncated += 1;
        }
    }
}

/// 存储中的完整实体图
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub lessons: Vec<Lesson>,
    pub quizzes: Vec<Quiz>,
    pub questions: Vec<Question>,
    pub enrollments: Vec<Enrollment>,
}

impl EntityGraph {
    /// 从存储读取全部集合
    pub async fn load(store: &dyn DocumentStore) -> Result<Self> {
        Ok(Self {
            users: find_all_as(store).await?,
            courses: find_all_as(store).await?,
            lessons: find_all_as(store).await?,
            quizzes: find_all_as(store).await?,
            questions: find_all_as(store).await?,
            enrollments: find_all_as(store).await?,
        })
    }

    /// 文档总数
    pub fn total_documents(&self) -> usize {
        self.users.len()
            + self.courses.len()
            + self.lessons.len()
            + self.quizzes.len()
            + self.questions.len()
            + self.enrollments.len()
    }

    pub fn counts(&self) -> CollectionCounts {
        CollectionCounts {
            users: self.users.len(),
            students: self.users.iter().filter(|u| u.is_student()).count(),
            instructors: self.users.iter().filter(|u| u.is_instructor()).count(),
            courses: self.courses.len(),
            lessons: self.lessons.len(),
            quizzes: self.quizzes.len(),
            questions: self.questions.len(),
            enrollments: self.enrollments.len(),
        }
    }

    /// 校验引用完整性
    ///
    /// `require_answer_in_options` 为真时额外要求正确答案出现在选项中。
    pub fn verify(&self, require_answer_in_options: bool) -> IntegrityReport {
        let mut report = IntegrityReport {
            counts: self.counts(),
            ..Default::default()
        };

        let users: HashMap<&str, &User> = self.users.iter().map(|u| (u.id.as_str(), u)).collect();
        let courses: HashMap<&str, &Course> =
            self.courses.iter().map(|c| (c.id.as_str(), c)).collect();
        let lessons: HashMap<&str, &Lesson> =
            self.lessons.iter().map(|l| (l.id.as_str(), l)).collect();
        let quizzes: HashMap<&str, &Quiz> =
            self.quizzes.iter().map(|q| (q.id.as_str(), q)).collect();
        let questions: HashMap<&str, &Question> =
            self.questions.iter().map(|q| (q.id.as_str(), q)).collect();

        for course in &self.courses {
            match users.get(course.instructor_id.as_str()) {
                Some(user) if user.is_instructor() => {}
                Some(user) => report.violation(format!(
                    "course {} 的负责人 {} 角色为 {}，不是讲师",
                    course.id,
                    course.instructor_id,
                    user.role.as_str()
                )),
                None => report.violation(format!(
                    "course {} 引用了不存在的讲师 {}",
                    course.id, course.instructor_id
                )),
            }
            for lesson_id in &course.lesson_ids {
                match lessons.get(lesson_id.as_str()) {
                    Some(lesson) if lesson.course_id == course.id => {}
                    Some(lesson) => report.violation(format!(
                        "lesson {} 属于 {}，但被 course {} 引用",
                        lesson.id, lesson.course_id, course.id
                    )),
                    None => report.violation(format!(
                        "course {} 引用了不存在的 lesson {lesson_id}",
                        course.id
                    )),
                }
            }
        }

        for lesson in &self.lessons {
            let listed = courses
                .get(lesson.course_id.as_str())
                .is_some_and(|c| c.lesson_ids.contains(&lesson.id));
            if !listed {
                report.violation(format!("lesson {} 未被其课程引用", lesson.id));
            }
            for quiz_id in &lesson.quiz_ids {
                if !quizzes
                    .get(quiz_id.as_str())
                    .is_some_and(|q| q.lesson_id == lesson.id)
                {
                    report.violation(format!(
                        "lesson {} 引用的 quiz {quiz_id} 不存在或不属于该课时",
                        lesson.id
                    ));
                }
            }
        }

        for quiz in &self.quizzes {
            let listed = lessons
                .get(quiz.lesson_id.as_str())
                .is_some_and(|l| l.quiz_ids.contains(&quiz.id));
            if !listed {
                report.violation(format!("quiz {} 未被其课时引用", quiz.id));
            }
            for question_id in &quiz.question_ids {
                if !questions
                    .get(question_id.as_str())
                    .is_some_and(|q| q.quiz_id == quiz.id)
                {
                    report.violation(format!(
                        "quiz {} 引用的题目 {question_id} 不存在或不属于该测验",
                        quiz.id
                    ));
                }
            }
        }

        for question in &self.questions {
            let listed = quizzes
                .get(question.quiz_id.as_str())
                .is_some_and(|q| q.question_ids.contains(&question.id));
            if !listed {
                report.violation(format!("题目 {} 未被其测验引用", question.id));
            }
            if !question.has_distinct_options() {
                report.violation(format!("题目 {} 的选项有重复", question.id));
            }
            if require_answer_in_options && !question.answer_in_options() {
                report.violation(format!("题目 {} 的正确答案不在选项中", question.id));
            }
        }

        let mut pairs = HashSet::new();
        let mut by_user: HashMap<&str, HashSet<&str>> = HashMap::new();
        for enrollment in &self.enrollments {
            if !pairs.insert((enrollment.user_id.as_str(), enrollment.course_id.as_str())) {
                report.violation(format!(
                    "用户 {} 重复选修课程 {}",
                    enrollment.user_id, enrollment.course_id
                ));
            }
            match users.get(enrollment.user_id.as_str()) {
                Some(user) if user.is_student() => {}
                _ => report.violation(format!(
                    "enrollment {} 引用的用户 {} 不存在或不是学生",
                    enrollment.id, enrollment.user_id
                )),
            }
            if !courses.contains_key(enrollment.course_id.as_str()) {
                report.violation(format!(
                    "enrollment {} 引用了不存在的课程 {}",
                    enrollment.id, enrollment.course_id
                ));
            }
            if enrollment.progress_percent().is_none() {
                report.violation(format!(
                    "enrollment {} 的进度格式不正确: {}",
                    enrollment.id, enrollment.progress
                ));
            }
            by_user
                .entry(enrollment.user_id.as_str())
                .or_default()
                .insert(enrollment.course_id.as_str());
        }

        for user in &self.users {
            let listed: HashSet<&str> = user
                .enrolled_course_ids
                .iter()
                .map(String::as_str)
                .collect();
            let enrolled = by_user.remove(user.id.as_str()).unwrap_or_default();
            if user.is_instructor() && !listed.is_empty() {
                report.violation(format!("讲师 {} 拥有已选课程", user.id));
            }
            if listed != enrolled {
                report.violation(format!(
                    "用户 {} 的已选课程与选课记录不一致",
                    user.id
                ));
            }
        }

        report
    }

    /// 按期望数量核对规模
    pub fn verify_counts(&self, expected: &GenerationCounts, report: &mut IntegrityReport) {
        let counts = self.counts();
        let checks = [
            ("users", counts.users, expected.users),
            ("courses", counts.courses, expected.courses),
            ("lessons", counts.lessons, expected.total_lessons()),
            ("quizzes", counts.quizzes, expected.total_quizzes()),
            ("quiz_questions", counts.questions, expected.total_questions()),
            (
                "enrollments",
                counts.enrollments,
                counts.students * expected.enrollments_per_student,
            ),
        ];
        for (collection, actual, expected) in checks {
            if actual != expected {
                report.violation(format!("{collection} 数量为 {actual}，期望 {expected}"));
            }
        }
    }
}

/// 读取存储并完成全部校验
pub async fn check_store(
    store: &dyn DocumentStore,
    expected: Option<&GenerationCounts>,
    require_answer_in_options: bool,
) -> Result<IntegrityReport> {
    let graph = EntityGraph::load(store).await?;
    let mut report = graph.verify(require_answer_in_options);
    if let Some(expected) = expected {
        graph.verify_counts(expected, &mut report);
    }

    if report.is_ok() {
        info!(documents = graph.total_documents(), "数据集完整性校验通过");
    } else {
        warn!(
            violations = report.violations.len() + report.truncated,
            "数据集完整性校验失败"
        );
    }
    Ok(report)
}
