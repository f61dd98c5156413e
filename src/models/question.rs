//! 测评题目与作答记录的数据模型

use serde::{Deserialize, Serialize};

use crate::models::Level;

/// 测评题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 题目唯一标识，整个目录内稳定不变
    pub id: String,
    /// 难度等级
    pub level: Level,
    /// 朗读给学习者的题干内容
    pub text: String,
    /// 期望作答时长（秒），作为评分基准
    pub expected_length: f64,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        level: Level,
        text: impl Into<String>,
        expected_length: f64,
    ) -> Self {
        Self {
            id: id.into(),
            level,
            text: text.into(),
            expected_length,
        }
    }
}

/// 学习者的一次作答记录
///
/// 每次确认的录音恰好产生一条记录，按作答时间顺序存入历史；
/// 记录一旦写入不做字段级修改，重答同一题时整条替换。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    /// 所回答的题目 ID
    pub question_id: String,
    /// 录音实际时长（秒，含小数）
    pub duration: f64,
    /// 流利度估计，1..=5
    pub fluency: u8,
    /// 复杂度估计，1..=5
    pub complexity: u8,
}
