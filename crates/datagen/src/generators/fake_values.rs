//! 随机值提供者
//!
//! 生成器和选课抽样所需的全部随机性都来自同一个注入的伪随机数生成器，
//! 固定种子即可复现整份数据集（包括 id）。

use chrono::{DateTime, Duration, Utc};
use fake::Fake;
use fake::faker::company::en::CatchPhrase;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::Name;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Builder;

/// 随机值提供者
///
/// 只要求实现随机数生成器访问和文本类生产方法，
/// id 与日期有基于随机数生成器的默认实现。
pub trait FakeValueProvider {
    /// 底层随机数生成器，用于角色、讲师、课程抽样等选择
    fn rng(&mut self) -> &mut StdRng;

    /// 人名
    fn name(&mut self) -> String;

    /// 邮箱地址
    fn email(&mut self) -> String;

    /// 课程标题风格的短语
    fn catch_phrase(&mut self) -> String;

    /// 单句
    fn sentence(&mut self) -> String;

    /// 段落
    fn paragraph(&mut self) -> String;

    /// 单词
    fn word(&mut self) -> String;

    /// 随机 UUID（v4 格式）
    fn id(&mut self) -> String {
        let bytes: [u8; 16] = self.rng().random();
        Builder::from_random_bytes(bytes).into_uuid().to_string()
    }

    /// 区间内均匀分布的时间点，区间颠倒时返回 `start`
    fn date_between(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
        let span = (end - start).num_seconds();
        if span <= 0 {
            return start;
        }
        start + Duration::seconds(self.rng().random_range(0..=span))
    }
}

/// 基于 fake crate 的随机值提供者
pub struct FakerProvider {
    rng: StdRng,
}

impl FakerProvider {
    /// 创建提供者，未指定种子时使用系统熵源
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self {
                rng: StdRng::from_os_rng(),
            },
        }
    }

    /// 使用固定种子创建，结果可复现
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl FakeValueProvider for FakerProvider {
    fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    fn name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    fn email(&mut self) -> String {
        SafeEmail().fake_with_rng(&mut self.rng)
    }

    fn catch_phrase(&mut self) -> String {
        CatchPhrase().fake_with_rng(&mut self.rng)
    }

    fn sentence(&mut self) -> String {
        Sentence(4..10).fake_with_rng(&mut self.rng)
    }

    fn paragraph(&mut self) -> String {
        Paragraph(2..5).fake_with_rng(&mut self.rng)
    }

    fn word(&mut self) -> String {
        Word().fake_with_rng(&mut self.rng)
    }
}
