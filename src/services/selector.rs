//! 自适应选题 - 业务能力层
//!
//! 只负责"根据作答历史推导题目序列"这一能力：
//! - 相同历史永远推导出相同序列（纯函数，可重复调用）
//! - 不持有任何资源
//! - 不关心录音 / 评分 / 流程顺序
//!
//! 选题规则：前三次作答用于粗定难度带，之后退化为固定目录顺序，
//! 整场测试最多 8 题，避免无限摇摆。

use std::sync::Arc;

use crate::models::{Level, Question, QuestionBank, UserResponse};

/// 整场测试的题目数上限
pub const MAX_SEQUENCE_LEN: usize = 8;

/// 自适应选题器
pub struct AdaptiveSelector {
    bank: Arc<QuestionBank>,
}

impl AdaptiveSelector {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }

    /// 根据作答历史推导"截至下一道未答题"的完整题目序列
    ///
    /// - 0 条历史：只有第一道初级题
    /// - 1 条历史：在前一序列上追加——流利度 >= 4 追加第一道中级题，
    ///   否则追加第二道初级题
    /// - 2 条历史：按平均流利度追加——>= 4 第一道高级题，
    ///   >= 3 第二道中级题，否则第三道初级题
    /// - >= 3 条历史：不再分支，直接取目录前 `min(len+1, 8)` 道题
    pub fn sequence(&self, history: &[UserResponse]) -> Vec<&Question> {
        let beginner = self.bank.questions_by_level(Level::Beginner);
        let intermediate = self.bank.questions_by_level(Level::Intermediate);
        let advanced = self.bank.questions_by_level(Level::Advanced);

        match history.len() {
            0 => vec![beginner[0]],
            1 => {
                let mut seq = self.sequence(&history[..0]);
                if history[0].fluency >= 4 {
                    seq.push(intermediate[0]);
                } else {
                    seq.push(beginner[1]);
                }
                seq
            }
            2 => {
                let mut seq = self.sequence(&history[..1]);
                let mean = mean_fluency(history);
                if mean >= 4.0 {
                    seq.push(advanced[0]);
                } else if mean >= 3.0 {
                    seq.push(intermediate[1]);
                } else {
                    seq.push(beginner[2]);
                }
                seq
            }
            n => self.bank.catalog_prefix((n + 1).min(MAX_SEQUENCE_LEN)),
        }
    }

    /// 学习者可见的进度分数：`(当前题号) / min(序列长度, 8)`
    pub fn progress(&self, current_index: usize, history: &[UserResponse]) -> f64 {
        let total = self.sequence(history).len().min(MAX_SEQUENCE_LEN);
        (current_index + 1) as f64 / total as f64
    }
}

/// 平均流利度
pub fn mean_fluency(history: &[UserResponse]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let sum: u32 = history.iter().map(|r| u32::from(r.fluency)).sum();
    f64::from(sum) / history.len() as f64
}
