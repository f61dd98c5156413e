//! 作答评分 - 业务能力层
//!
//! 只负责"从录音时长推导流利度 / 复杂度"这一能力。
//! 评分是有意的占位启发式：只看时长相对期望的比例，
//! 不做任何语音识别或语言学分析。

use rand::Rng;

use crate::models::{Question, UserResponse};

/// 随机抖动来源
///
/// 复杂度评分带有刻意的随机性；把随机源做成可注入的依赖，
/// 测试时给定固定值即可得到确定性结果。
pub trait JitterSource: Send {
    /// 返回 [0, 1) 区间内的随机值
    fn next_jitter(&mut self) -> f64;
}

/// 默认随机源（线程级 RNG）
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn next_jitter(&mut self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }
}

/// 固定抖动值（测试用）
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn next_jitter(&mut self) -> f64 {
        self.0
    }
}

/// 作答评分器
pub struct ResponseScorer {
    jitter: Box<dyn JitterSource>,
}

impl ResponseScorer {
    pub fn new(jitter: Box<dyn JitterSource>) -> Self {
        Self { jitter }
    }

    /// 使用线程级 RNG 的默认评分器
    pub fn with_thread_rng() -> Self {
        Self::new(Box::new(ThreadRngJitter))
    }

    /// 对一次完成的录音评分，生成作答记录
    pub fn score(&mut self, question: &Question, duration: f64) -> UserResponse {
        let fluency = fluency_for(duration, question.expected_length);
        let complexity = self.complexity_for(fluency);
        UserResponse {
            question_id: question.id.clone(),
            duration,
            fluency,
            complexity,
        }
    }

    /// 复杂度：流利度打八折再叠加随机抖动
    fn complexity_for(&mut self, fluency: u8) -> u8 {
        let raw = f64::from(fluency) * 0.8 + self.jitter.next_jitter();
        clamp_score(raw.round())
    }
}

/// 流利度：时长比例（封顶 2 倍）映射到 1..=5
///
/// `ratio = min(duration / expected, 2)`，`fluency = clamp(round(2 + ratio * 1.5), 1, 5)`。
/// 超长作答被封顶，避免"话多即高分"。
pub fn fluency_for(duration: f64, expected_length: f64) -> u8 {
    let ratio = (duration / expected_length).min(2.0);
    clamp_score((2.0 + ratio * 1.5).round())
}

fn clamp_score(value: f64) -> u8 {
    value.clamp(1.0, 5.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;

    fn question(expected_length: f64) -> Question {
        Question::new("b1", Level::Beginner, "Hola", expected_length)
    }

    #[test]
    fn test_fluency_at_expected_length_is_four() {
        // ratio = 1 -> round(3.5) = 4
        assert_eq!(fluency_for(10.0, 10.0), 4);
    }

    #[test]
    fn test_fluency_for_silence_is_two() {
        // ratio = 0 -> round(2) = 2
        assert_eq!(fluency_for(0.0, 10.0), 2);
        assert_eq!(fluency_for(0.0, 60.0), 2);
    }

    #[test]
    fn test_fluency_caps_at_double_expected() {
        // ratio 封顶 2 -> round(5) = 5，再长也不加分
        assert_eq!(fluency_for(20.0, 10.0), 5);
        assert_eq!(fluency_for(500.0, 10.0), 5);
        assert_eq!(fluency_for(20.0, 10.0), fluency_for(1000.0, 10.0));
    }

    #[test]
    fn test_complexity_stays_in_range_for_all_inputs() {
        // 扫一遍所有流利度 × 抖动边界，复杂度必须落在 1..=5
        for fluency in 1..=5u8 {
            for jitter in [0.0, 0.25, 0.5, 0.999] {
                let mut scorer = ResponseScorer::new(Box::new(FixedJitter(jitter)));
                let response = scorer.score(&question(10.0), f64::from(fluency) * 2.0);
                assert!((1..=5).contains(&response.complexity));
            }
        }
    }

    #[test]
    fn test_fixed_jitter_makes_scoring_deterministic() {
        let mut scorer = ResponseScorer::new(Box::new(FixedJitter(0.0)));
        let response = scorer.score(&question(10.0), 10.0);
        assert_eq!(response.fluency, 4);
        // complexity = round(4 * 0.8 + 0) = 3
        assert_eq!(response.complexity, 3);
        assert_eq!(response.question_id, "b1");
        assert!((response.duration - 10.0).abs() < f64::EPSILON);

        let mut high = ResponseScorer::new(Box::new(FixedJitter(0.9)));
        // complexity = round(3.2 + 0.9) = 4
        assert_eq!(high.score(&question(10.0), 10.0).complexity, 4);
    }

    #[test]
    fn test_thread_rng_complexity_in_range() {
        let mut scorer = ResponseScorer::with_thread_rng();
        for _ in 0..100 {
            let response = scorer.score(&question(10.0), 15.0);
            assert!((1..=5).contains(&response.complexity));
        }
    }
}
