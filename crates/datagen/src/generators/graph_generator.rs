//! 实体图生成器
//!
//! 先生成用户，再为每门课程自底向上构建课程树：
//! 题目 → 测验 → 课时 → 课程。父实体只保存子实体 id 列表，
//! 持久化时子层先于父层写入，任何时刻已写入的文档都不含悬空引用。

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, instrument};

use learnbench_shared::config::GenerationSettings;
use learnbench_shared::error::{LearnBenchError, Result};

use super::fake_values::FakeValueProvider;
use super::scale::{GenerationCounts, Multiplier, Profile};
use crate::models::{Course, Lesson, Question, Quiz, Role, User};
use crate::store::{DocumentStore, WriteMode, write_entities};

/// 每道题的选项数量
pub const OPTIONS_PER_QUESTION: usize = 4;

/// 抽取选项的重试上限
const MAX_OPTION_DRAWS: usize = 64;

/// 生成器配置
///
/// 运行期间不可变，生成器与选课抽样共享同一份配置。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratorConfig {
    /// 应用倍数后的实际数量
    pub counts: GenerationCounts,
    pub write_mode: WriteMode,
    /// 开启后正确答案取自选项；关闭时与选项相互独立
    pub enforce_answer_in_options: bool,
}

impl GeneratorConfig {
    /// 由配置文件中的生成参数和倍数构建
    ///
    /// 先取预设规模，再用显式配置的数量覆盖，最后应用倍数。
    pub fn from_settings(settings: &GenerationSettings, multiplier: Multiplier) -> Result<Self> {
        let profile: Profile = settings.profile.parse()?;
        let preset = profile.counts();

        let base = GenerationCounts {
            users: settings.users.unwrap_or(preset.users),
            courses: settings.courses.unwrap_or(preset.courses),
            lessons_per_course: settings
                .lessons_per_course
                .unwrap_or(preset.lessons_per_course),
            quizzes_per_lesson: settings
                .quizzes_per_lesson
                .unwrap_or(preset.quizzes_per_lesson),
            questions_per_quiz: settings
                .questions_per_quiz
                .unwrap_or(preset.questions_per_quiz),
            enrollments_per_student: settings
                .enrollments_per_student
                .unwrap_or(preset.enrollments_per_student),
        };

        Ok(Self {
            counts: base.scaled(multiplier),
            write_mode: settings.write_mode.parse()?,
            enforce_answer_in_options: settings.enforce_answer_in_options,
        })
    }
}

/// 一门课程及其全部子实体
#[derive(Debug, Clone)]
pub struct CourseTree {
    pub course: Course,
    pub lessons: Vec<Lesson>,
    pub quizzes: Vec<Quiz>,
    pub questions: Vec<Question>,
}

impl CourseTree {
    /// 按依赖顺序持久化：题目 → 测验 → 课时 → 课程
    ///
    /// 批量模式下每层一次写入。
    pub async fn persist(&self, store: &dyn DocumentStore, mode: WriteMode) -> Result<usize> {
        let mut written = write_entities(store, &self.questions, mode).await?;
        written += write_entities(store, &self.quizzes, mode).await?;
        written += write_entities(store, &self.lessons, mode).await?;
        written += write_entities(store, std::slice::from_ref(&self.course), mode).await?;
        Ok(written)
    }
}

/// 生成结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub users: usize,
    pub instructors: usize,
    pub courses: usize,
    pub lessons: usize,
    pub quizzes: usize,
    pub questions: usize,
}

impl GenerationStats {
    fn add_tree(&mut self, tree: &CourseTree) {
        self.courses += 1;
        self.lessons += tree.lessons.len();
        self.quizzes += tree.quizzes.len();
        self.questions += tree.questions.len();
    }
}

/// 收集讲师 id
pub fn instructor_ids(users: &[User]) -> Vec<String> {
    users
        .iter()
        .filter(|u| u.is_instructor())
        .map(|u| u.id.clone())
        .collect()
}

/// 实体图生成器
pub struct EntityGraphGenerator<P: FakeValueProvider> {
    config: GeneratorConfig,
    provider: P,
}

impl<P: FakeValueProvider> EntityGraphGenerator<P> {
    /// 创建生成器
    pub fn new(config: GeneratorConfig, provider: P) -> Self {
        Self { config, provider }
    }

    /// 获取配置
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// 获取随机值提供者（选课抽样沿用同一随机序列）
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// 生成单个用户，角色在学生和讲师之间均匀随机
    pub fn generate_user(&mut self) -> User {
        let role = if self.provider.rng().random_bool(0.5) {
            Role::Student
        } else {
            Role::Instructor
        };

        User {
            id: self.provider.id(),
            name: self.provider.name(),
            email: self.provider.email(),
            role,
            enrolled_course_ids: Vec::new(),
        }
    }

    /// 生成配置数量的用户
    pub fn generate_users(&mut self) -> Vec<User> {
        (0..self.config.counts.users)
            .map(|_| self.generate_user())
            .collect()
    }

    /// 生成互不相同的选项
    ///
    /// 词库有限，重复抽取超过上限后给重复词加序号后缀。
    fn distinct_options(&mut self) -> Vec<String> {
        let mut options: Vec<String> = Vec::with_capacity(OPTIONS_PER_QUESTION);
        let mut attempts = 0;
        while options.len() < OPTIONS_PER_QUESTION {
            let word = self.provider.word();
            attempts += 1;
            if !options.contains(&word) {
                options.push(word);
            } else if attempts >= MAX_OPTION_DRAWS {
                options.push(format!("{word}{}", options.len() + 1));
            }
        }
        options
    }

    /// 生成题目
    pub fn build_question(&mut self, quiz_id: &str) -> Question {
        let options = self.distinct_options();

        let correct_answer = if self.config.enforce_answer_in_options {
            options
                .choose(self.provider.rng())
                .cloned()
                .unwrap_or_else(|| self.provider.word())
        } else {
            self.provider.word()
        };

        Question {
            id: self.provider.id(),
            quiz_id: quiz_id.to_string(),
            text: self.provider.sentence(),
            options,
            correct_answer,
        }
    }

    /// 生成测验及其题目
    pub fn build_quiz(&mut self, lesson_id: &str) -> (Quiz, Vec<Question>) {
        let quiz_id = self.provider.id();
        let title = self.provider.sentence();

        let questions: Vec<Question> = (0..self.config.counts.questions_per_quiz)
            .map(|_| self.build_question(&quiz_id))
            .collect();

        let quiz = Quiz {
            id: quiz_id,
            lesson_id: lesson_id.to_string(),
            title,
            question_ids: questions.iter().map(|q| q.id.clone()).collect(),
        };
        (quiz, questions)
    }

    /// 生成课时及其测验、题目
    pub fn build_lesson(&mut self, course_id: &str) -> (Lesson, Vec<Quiz>, Vec<Question>) {
        let lesson_id = self.provider.id();
        let title = self.provider.sentence();
        let content = self.provider.paragraph();

        let mut quizzes = Vec::with_capacity(self.config.counts.quizzes_per_lesson);
        let mut questions = Vec::new();
        for _ in 0..self.config.counts.quizzes_per_lesson {
            let (quiz, quiz_questions) = self.build_quiz(&lesson_id);
            quizzes.push(quiz);
            questions.extend(quiz_questions);
        }

        let lesson = Lesson {
            id: lesson_id,
            course_id: course_id.to_string(),
            title,
            content,
            quiz_ids: quizzes.iter().map(|q| q.id.clone()).collect(),
        };
        (lesson, quizzes, questions)
    }

    /// 生成一门课程的完整课程树
    ///
    /// 讲师从候选列表中均匀随机选取；候选为空时返回 `NoInstructors`。
    pub fn build_course_tree(&mut self, instructor_ids: &[String]) -> Result<CourseTree> {
        let instructor_id = instructor_ids
            .choose(self.provider.rng())
            .cloned()
            .ok_or(LearnBenchError::NoInstructors)?;

        let course_id = self.provider.id();
        let title = self.provider.catch_phrase();
        let description = self.provider.paragraph();

        let mut lessons = Vec::with_capacity(self.config.counts.lessons_per_course);
        let mut quizzes = Vec::new();
        let mut questions = Vec::new();
        for _ in 0..self.config.counts.lessons_per_course {
            let (lesson, lesson_quizzes, lesson_questions) = self.build_lesson(&course_id);
            lessons.push(lesson);
            quizzes.extend(lesson_quizzes);
            questions.extend(lesson_questions);
        }

        let course = Course {
            id: course_id,
            title,
            description,
            instructor_id,
            lesson_ids: lessons.iter().map(|l| l.id.clone()).collect(),
        };

        Ok(CourseTree {
            course,
            lessons,
            quizzes,
            questions,
        })
    }

    /// 在内存中生成所有课程树
    ///
    /// 讲师为空时在生成任何课程之前失败。
    pub fn generate_course_trees(&mut self, users: &[User]) -> Result<Vec<CourseTree>> {
        let instructors = instructor_ids(users);
        if instructors.is_empty() && self.config.counts.courses > 0 {
            return Err(LearnBenchError::NoInstructors);
        }

        (0..self.config.counts.courses)
            .map(|_| self.build_course_tree(&instructors))
            .collect()
    }

    /// 生成并按写入模式写入用户
    #[instrument(skip_all, fields(users = self.config.counts.users))]
    pub async fn insert_users(&mut self, store: &dyn DocumentStore) -> Result<Vec<User>> {
        let users = self.generate_users();
        write_entities(store, &users, self.config.write_mode).await?;
        info!(count = users.len(), "用户写入完成");
        Ok(users)
    }

    /// 逐门课程生成并写入课程树
    ///
    /// 每门课程生成后立即写入，内存占用与课程总数无关。
    #[instrument(skip_all, fields(courses = self.config.counts.courses))]
    pub async fn insert_courses(
        &mut self,
        store: &dyn DocumentStore,
        users: &[User],
    ) -> Result<GenerationStats> {
        let instructors = instructor_ids(users);
        if instructors.is_empty() && self.config.counts.courses > 0 {
            return Err(LearnBenchError::NoInstructors);
        }

        let mut stats = GenerationStats {
            users: users.len(),
            instructors: instructors.len(),
            ..Default::default()
        };

        for index in 0..self.config.counts.courses {
            let tree = self.build_course_tree(&instructors)?;
            tree.persist(store, self.config.write_mode).await?;
            stats.add_tree(&tree);
            debug!(index, course_id = %tree.course.id, "课程树写入完成");
        }

        info!(
            courses = stats.courses,
            lessons = stats.lessons,
            quizzes = stats.quizzes,
            questions = stats.questions,
            "课程、课时、测验和题目写入完成"
        );
        Ok(stats)
    }
}
