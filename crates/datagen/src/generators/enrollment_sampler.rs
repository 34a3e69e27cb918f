//! 选课抽样
//!
//! 为每个学生从全部已持久化课程中无放回地抽取固定数量的课程，
//! 生成选课记录并更新学生的已选课程列表。

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::index;
use serde_json::Value;
use tracing::{info, instrument};

use learnbench_shared::error::{LearnBenchError, Result};

use super::fake_values::FakeValueProvider;
use super::graph_generator::GeneratorConfig;
use crate::models::{Course, Enrollment, User};
use crate::store::{DocumentStore, StoredEntity, WriteMode, find_all_as, set_field, write_entities};

/// 选课日期回溯的天数（约两年）
pub const ENROLLMENT_WINDOW_DAYS: i64 = 730;

/// 选课结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentOutcome {
    pub students: usize,
    pub enrollments: usize,
    pub updated_users: usize,
}

/// 选课抽样器
#[derive(Debug, Clone)]
pub struct EnrollmentSampler {
    per_student: usize,
    window: Duration,
    write_mode: WriteMode,
}

impl EnrollmentSampler {
    /// 创建抽样器，`per_student` 为每个学生选修的课程数
    pub fn new(per_student: usize) -> Self {
        Self {
            per_student,
            window: Duration::days(ENROLLMENT_WINDOW_DAYS),
            write_mode: WriteMode::Batched,
        }
    }

    /// 按生成配置创建，选课数量与写入模式都取自配置
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.counts.enrollments_per_student).with_write_mode(config.write_mode)
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn per_student(&self) -> usize {
        self.per_student
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// 校验课程总数足以完成抽样
    pub fn check_population(&self, available: usize) -> Result<()> {
        if available < self.per_student {
            return Err(LearnBenchError::InsufficientPopulation {
                required: self.per_student,
                available,
            });
        }
        Ok(())
    }

    /// 无放回抽取课程 id
    ///
    /// 课程数不足时返回 `InsufficientPopulation`，不会截断。
    pub fn sample_courses<'a, P: FakeValueProvider>(
        &self,
        provider: &mut P,
        course_ids: &'a [String],
    ) -> Result<Vec<&'a String>> {
        self.check_population(course_ids.len())?;

        Ok(index::sample(provider.rng(), course_ids.len(), self.per_student)
            .into_iter()
            .map(|i| &course_ids[i])
            .collect())
    }

    /// 为单个学生选课
    ///
    /// 追加课程 id 到 `enrolled_course_ids` 并返回对应的选课记录。
    pub fn enroll<P: FakeValueProvider>(
        &self,
        provider: &mut P,
        user: &mut User,
        course_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<Enrollment>> {
        let sampled = self.sample_courses(provider, course_ids)?;

        let mut enrollments = Vec::with_capacity(sampled.len());
        for course_id in sampled {
            let progress: u8 = provider.rng().random_range(0..=100);
            enrollments.push(Enrollment {
                id: provider.id(),
                user_id: user.id.clone(),
                course_id: course_id.clone(),
                enrollment_date: provider.date_between(now - self.window, now),
                progress: Enrollment::format_progress(progress),
            });
            user.enrolled_course_ids.push(course_id.clone());
        }
        Ok(enrollments)
    }

    /// 为所有学生选课，讲师保持不变
    ///
    /// 存在学生时先整体校验课程数量，失败时不修改任何用户。
    pub fn enroll_all<P: FakeValueProvider>(
        &self,
        provider: &mut P,
        users: &mut [User],
        course_ids: &[String],
    ) -> Result<Vec<Enrollment>> {
        if users.iter().any(User::is_student) {
            self.check_population(course_ids.len())?;
        }

        let now = Utc::now();
        let mut enrollments = Vec::new();
        for user in users.iter_mut().filter(|u| u.is_student()) {
            enrollments.extend(self.enroll(provider, user, course_ids, now)?);
        }
        Ok(enrollments)
    }

    /// 读取已持久化课程，完成选课并写回存储
    ///
    /// 批量模式下所有选课记录一次写入，逐条模式下每条一次 insert_one；
    /// 每个学生一次 update_one 持久化已选课程列表。
    #[instrument(skip_all, fields(per_student = self.per_student))]
    pub async fn enroll_students<P: FakeValueProvider>(
        &self,
        provider: &mut P,
        store: &dyn DocumentStore,
        users: &mut [User],
    ) -> Result<EnrollmentOutcome> {
        let courses: Vec<Course> = find_all_as(store).await?;
        let course_ids: Vec<String> = courses.into_iter().map(|c| c.id).collect();

        let enrollments = self.enroll_all(provider, users, &course_ids)?;
        write_entities(store, &enrollments, self.write_mode).await?;

        let mut outcome = EnrollmentOutcome {
            enrollments: enrollments.len(),
            ..Default::default()
        };
        for user in users.iter().filter(|u| u.is_student()) {
            outcome.students += 1;
            let patch = set_field(
                "enrolledCourseIds",
                Value::from(user.enrolled_course_ids.clone()),
            );
            if store
                .update_one(User::COLLECTION.name(), &user.id, patch)
                .await?
            {
                outcome.updated_users += 1;
            }
        }

        info!(
            students = outcome.students,
            enrollments = outcome.enrollments,
            courses = course_ids.len(),
            "选课记录生成完成"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::fake_values::FakerProvider;
    use crate::models::Role;
    use crate::store::MemoryDocumentStore;
    use std::collections::HashSet;

    fn course_ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("course-{i}")).collect()
    }

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: "Someone".to_string(),
            email: "someone@example.com".to_string(),
            role,
            enrolled_course_ids: vec![],
        }
    }

    #[test]
    fn test_from_config_takes_count_and_write_mode() {
        let config = GeneratorConfig {
            write_mode: WriteMode::PerDocument,
            ..Default::default()
        };
        let sampler = EnrollmentSampler::from_config(&config);
        assert_eq!(sampler.per_student(), config.counts.enrollments_per_student);
        assert_eq!(sampler.write_mode(), WriteMode::PerDocument);
        assert_eq!(EnrollmentSampler::new(2).write_mode(), WriteMode::Batched);
    }

    #[test]
    fn test_sample_two_from_twenty() {
        let sampler = EnrollmentSampler::new(2);
        let mut provider = FakerProvider::seeded(11);
        let pool = course_ids(20);

        for _ in 0..200 {
            let sampled = sampler.sample_courses(&mut provider, &pool).unwrap();
            assert_eq!(sampled.len(), 2);
            assert_ne!(sampled[0], sampled[1]);
        }
    }

    #[test]
    fn test_sample_from_too_small_pool_fails() {
        let sampler = EnrollmentSampler::new(2);
        let mut provider = FakerProvider::seeded(12);

        let err = sampler
            .sample_courses(&mut provider, &course_ids(1))
            .unwrap_err();
        assert!(matches!(
            err,
            LearnBenchError::InsufficientPopulation {
                required: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn test_sample_whole_pool() {
        let sampler = EnrollmentSampler::new(3);
        let mut provider = FakerProvider::seeded(13);
        let pool = course_ids(3);

        let sampled: HashSet<_> = sampler
            .sample_courses(&mut provider, &pool)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(sampled.len(), 3);
    }

    #[test]
    fn test_enroll_all_only_students() {
        let sampler = EnrollmentSampler::new(2);
        let mut provider = FakerProvider::seeded(14);
        let pool = course_ids(20);
        let mut users = vec![
            user("s-1", Role::Student),
            user("t-1", Role::Instructor),
            user("s-2", Role::Student),
        ];

        let enrollments = sampler
            .enroll_all(&mut provider, &mut users, &pool)
            .unwrap();
        assert_eq!(enrollments.len(), 4);

        for u in &users {
            if u.is_student() {
                let distinct: HashSet<_> = u.enrolled_course_ids.iter().collect();
                assert_eq!(distinct.len(), 2);
                assert!(u.enrolled_course_ids.iter().all(|c| pool.contains(c)));
            } else {
                assert!(u.enrolled_course_ids.is_empty());
            }
        }

        let now = Utc::now();
        for e in &enrollments {
            let progress = e.progress_percent().unwrap();
            assert!(progress <= 100);
            assert!(e.enrollment_date <= now);
            assert!(e.enrollment_date >= now - Duration::days(ENROLLMENT_WINDOW_DAYS + 1));
        }

        // (user, course) 组合唯一
        let pairs: HashSet<_> = enrollments
            .iter()
            .map(|e| (e.user_id.clone(), e.course_id.clone()))
            .collect();
        assert_eq!(pairs.len(), enrollments.len());
    }

    #[test]
    fn test_enroll_all_fails_without_mutation() {
        let sampler = EnrollmentSampler::new(2);
        let mut provider = FakerProvider::seeded(15);
        let mut users = vec![user("s-1", Role::Student), user("s-2", Role::Student)];

        let result = sampler.enroll_all(&mut provider, &mut users, &course_ids(1));
        assert!(result.is_err());
        assert!(users.iter().all(|u| u.enrolled_course_ids.is_empty()));
    }

    #[test]
    fn test_enroll_all_without_students_never_samples() {
        let sampler = EnrollmentSampler::new(2);
        let mut provider = FakerProvider::seeded(16);
        let mut users = vec![user("t-1", Role::Instructor)];

        let enrollments = sampler
            .enroll_all(&mut provider, &mut users, &[])
            .unwrap();
        assert!(enrollments.is_empty());
    }

    #[tokio::test]
    async fn test_enroll_students_persists_updates() {
        let store = MemoryDocumentStore::new();
        let mut users = vec![user("s-1", Role::Student), user("t-1", Role::Instructor)];
        write_entities(&store, &users, WriteMode::Batched)
            .await
            .unwrap();

        let courses: Vec<Course> = (0..5)
            .map(|i| Course {
                id: format!("c-{i}"),
                title: "Course".to_string(),
                description: "About".to_string(),
                instructor_id: "t-1".to_string(),
                lesson_ids: vec![],
            })
            .collect();
        write_entities(&store, &courses, WriteMode::Batched)
            .await
            .unwrap();

        let sampler = EnrollmentSampler::new(2);
        let mut provider = FakerProvider::seeded(17);
        let outcome = sampler
            .enroll_students(&mut provider, &store, &mut users)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            EnrollmentOutcome {
                students: 1,
                enrollments: 2,
                updated_users: 1,
            }
        );
        assert_eq!(
            store.count(Enrollment::COLLECTION.name()).await.unwrap(),
            2
        );

        let stored: Vec<User> = find_all_as(&store).await.unwrap();
        let student = stored.iter().find(|u| u.id == "s-1").unwrap();
        assert_eq!(student.enrolled_course_ids, users[0].enrolled_course_ids);
        let instructor = stored.iter().find(|u| u.id == "t-1").unwrap();
        assert!(instructor.enrolled_course_ids.is_empty());
    }
}
