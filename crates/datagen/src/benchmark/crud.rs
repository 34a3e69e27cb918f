//! CRUD 基准阶段
//!
//! 依次执行：清空集合、创建集合、写入全部数据、读取、批量更新、批量删除。

use std::future::Future;

use rand::Rng;
use tracing::{info, instrument};

use learnbench_shared::error::Result;

use super::harness::Phase;
use crate::generators::{
    EnrollmentOutcome, EnrollmentSampler, EntityGraphGenerator, FakeValueProvider, FakerProvider,
    GenerationStats, GeneratorConfig,
};
use crate::models::{Enrollment, User};
use crate::store::{Collection, Document, DocumentFilter, DocumentStore, find_all_as, set_field};

pub const DROP_TABLES: &str = "Drop Tables";
pub const CREATE_TABLES: &str = "Create Tables";
pub const INSERT_ALL_DATA: &str = "Insert All Data";
pub const READ_ALL_DATA: &str = "Read All Data";
pub const UPDATE_ALL_DATA: &str = "Update All Data";
pub const DELETE_ALL_DATA: &str = "Delete All Data";

/// 更新阶段使用独立随机序列，与写入阶段错开
const UPDATE_SEED_OFFSET: u64 = 0x5eed;

/// 写入阶段统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationSummary {
    pub generation: GenerationStats,
    pub enrollment: EnrollmentOutcome,
}

/// 清空全部集合
#[instrument(skip_all)]
pub async fn drop_collections(store: &dyn DocumentStore) -> Result<()> {
    for collection in Collection::ALL {
        store.reset_collection(collection.name()).await?;
    }
    info!("全部集合已清空");
    Ok(())
}

/// 创建全部集合
pub async fn create_collections(store: &dyn DocumentStore) -> Result<()> {
    store.ensure_collections(&Collection::all_names()).await
}

/// 写入完整数据集
///
/// 写入用户后重新读取用户集合，基于持久化结果生成课程树和选课记录。
#[instrument(skip_all, fields(store = store.backend_name()))]
pub async fn insert_all_data<P: FakeValueProvider>(
    store: &dyn DocumentStore,
    config: &GeneratorConfig,
    provider: P,
) -> Result<PopulationSummary> {
    let mut generator = EntityGraphGenerator::new(config.clone(), provider);

    generator.insert_users(store).await?;
    let mut users: Vec<User> = find_all_as(store).await?;
    info!(count = users.len(), "用户读取完成");

    let generation = generator.insert_courses(store, &users).await?;
    let enrollment = EnrollmentSampler::from_config(config)
        .enroll_students(generator.provider_mut(), store, &mut users)
        .await?;

    Ok(PopulationSummary {
        generation,
        enrollment,
    })
}

/// 读取全部集合，返回读取的文档总数
pub async fn read_all_data(store: &dyn DocumentStore) -> Result<usize> {
    let mut total = 0;
    for collection in Collection::ALL {
        total += store.find_all(collection.name()).await?.len();
    }
    info!(documents = total, "全部数据读取完成");
    Ok(total)
}

/// 每个集合的更新补丁
fn update_patch<P: FakeValueProvider>(provider: &mut P, collection: Collection) -> Document {
    match collection {
        Collection::Users => set_field("email", provider.email()),
        Collection::Courses => set_field("description", provider.paragraph()),
        Collection::Enrollments => {
            let progress = provider.rng().random_range(0..=100u8);
            set_field("progress", Enrollment::format_progress(progress))
        }
        Collection::Lessons => set_field("content", provider.paragraph()),
        Collection::Quizzes => set_field("title", provider.sentence()),
        Collection::QuizQuestions => set_field("text", provider.sentence()),
    }
}

/// 对每个集合执行一次全量 update_many，返回更新的文档总数
pub async fn update_all_data<P: FakeValueProvider>(
    store: &dyn DocumentStore,
    provider: &mut P,
) -> Result<u64> {
    let mut total = 0;
    for collection in Collection::ALL {
        let patch = update_patch(provider, collection);
        total += store
            .update_many(collection.name(), &DocumentFilter::All, patch)
            .await?;
    }
    info!(documents = total, "全部数据更新完成");
    Ok(total)
}

/// 对每个集合执行一次全量 delete_many，返回删除的文档总数
pub async fn delete_all_data(store: &dyn DocumentStore) -> Result<u64> {
    let mut total = 0;
    for collection in Collection::ALL {
        total += store
            .delete_many(collection.name(), &DocumentFilter::All)
            .await?;
    }
    info!(documents = total, "全部数据删除完成");
    Ok(total)
}

/// 标准 CRUD 基准计划
///
/// 写入与更新阶段各自使用一个随机值提供者；给定种子时两者都可复现。
pub fn standard_plan<'a>(
    store: &'a dyn DocumentStore,
    config: &'a GeneratorConfig,
    seed: Option<u64>,
) -> Vec<(String, Phase<'a>)> {
    let insert_provider = FakerProvider::new(seed);
    let mut update_provider = FakerProvider::new(seed.map(|s| s.wrapping_add(UPDATE_SEED_OFFSET)));

    vec![
        phase(DROP_TABLES, drop_collections(store)),
        phase(CREATE_TABLES, create_collections(store)),
        phase(INSERT_ALL_DATA, async move {
            insert_all_data(store, config, insert_provider).await?;
            Ok(())
        }),
        phase(READ_ALL_DATA, async move {
            read_all_data(store).await?;
            Ok(())
        }),
        phase(UPDATE_ALL_DATA, async move {
            update_all_data(store, &mut update_provider).await?;
            Ok(())
        }),
        phase(DELETE_ALL_DATA, async move {
            delete_all_data(store).await?;
            Ok(())
        }),
    ]
}

fn phase<'a, F>(name: &str, future: F) -> (String, Phase<'a>)
where
    F: Future<Output = Result<()>> + Send + 'a,
{
    (name.to_string(), Box::pin(future))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkHarness;
    use crate::generators::GenerationCounts;
    use crate::models::{Course, Lesson, Question, Quiz};
    use crate::store::MemoryDocumentStore;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            counts: GenerationCounts {
                users: 30,
                courses: 6,
                lessons_per_course: 3,
                quizzes_per_lesson: 2,
                questions_per_quiz: 2,
                enrollments_per_student: 2,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_drop_collections_is_idempotent() {
        let store = MemoryDocumentStore::new();
        drop_collections(&store).await.unwrap();
        drop_collections(&store).await.unwrap();
        for collection in Collection::ALL {
            assert_eq!(store.count(collection.name()).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_insert_all_data_counts() {
        let store = MemoryDocumentStore::new();
        let summary = insert_all_data(&store, &config(), FakerProvider::seeded(8))
            .await
            .unwrap();

        assert_eq!(summary.generation.users, 30);
        assert_eq!(summary.generation.courses, 6);
        assert_eq!(summary.generation.lessons, 18);
        assert_eq!(summary.generation.quizzes, 36);
        assert_eq!(summary.generation.questions, 72);
        assert_eq!(
            summary.enrollment.enrollments,
            summary.enrollment.students * 2
        );
        assert_eq!(
            read_all_data(&store).await.unwrap(),
            30 + 6 + 18 + 36 + 72 + summary.enrollment.enrollments
        );
    }

    #[tokio::test]
    async fn test_update_touches_every_collection() {
        let store = MemoryDocumentStore::new();
        insert_all_data(&store, &config(), FakerProvider::seeded(9))
            .await
            .unwrap();
        let before = read_all_data(&store).await.unwrap();

        let mut provider = FakerProvider::seeded(10);
        let updated = update_all_data(&store, &mut provider).await.unwrap();
        assert_eq!(updated as usize, before);

        // 同一集合内的文档被设置为相同的值
        let quizzes: Vec<Quiz> = find_all_as(&store).await.unwrap();
        assert!(quizzes.windows(2).all(|w| w[0].title == w[1].title));
        let questions: Vec<Question> = find_all_as(&store).await.unwrap();
        assert!(questions.windows(2).all(|w| w[0].text == w[1].text));
        let lessons: Vec<Lesson> = find_all_as(&store).await.unwrap();
        assert!(lessons.windows(2).all(|w| w[0].content == w[1].content));
        let courses: Vec<Course> = find_all_as(&store).await.unwrap();
        assert!(courses.windows(2).all(|w| w[0].description == w[1].description));
        let enrollments: Vec<Enrollment> = find_all_as(&store).await.unwrap();
        assert!(enrollments.iter().all(|e| e.progress_percent().is_some()));
    }

    #[tokio::test]
    async fn test_standard_plan_runs_all_phases() {
        let store = MemoryDocumentStore::new();
        let config = config();
        let mut harness = BenchmarkHarness::quiet();

        harness
            .run_all(standard_plan(&store, &config, Some(1)))
            .await
            .unwrap();

        let names: Vec<_> = harness.timings().iter().map(|t| t.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                DROP_TABLES,
                CREATE_TABLES,
                INSERT_ALL_DATA,
                READ_ALL_DATA,
                UPDATE_ALL_DATA,
                DELETE_ALL_DATA
            ]
        );
        for collection in Collection::ALL {
            assert_eq!(store.count(collection.name()).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_plan_aborts_without_instructors() {
        let store = MemoryDocumentStore::new();
        let config = GeneratorConfig {
            counts: GenerationCounts {
                users: 0,
                ..config().counts
            },
            ..Default::default()
        };
        let mut harness = BenchmarkHarness::quiet();

        let err = harness
            .run_all(standard_plan(&store, &config, Some(2)))
            .await
            .unwrap_err();
        assert!(err.is_precondition_violation());
        // 只有清空与创建阶段完成
        assert_eq!(harness.timings().len(), 2);
    }
}
