/// 难度等级枚举
///
/// 既是题目的属性，也是学习者最终的定级结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// 初级
    Beginner,
    /// 中级
    Intermediate,
    /// 高级
    Advanced,
}

impl Level {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }

    /// 题库目录顺序（初级在前，高级在后）
    pub fn rank(self) -> u8 {
        match self {
            Level::Beginner => 0,
            Level::Intermediate => 1,
            Level::Advanced => 2,
        }
    }

    /// 尝试从字符串解析难度（忽略大小写）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Some(Level::Beginner),
            "intermediate" => Some(Level::Intermediate),
            "advanced" => Some(Level::Advanced),
            _ => None,
        }
    }

    /// 根据平均流利度定级
    ///
    /// 规则：平均流利度 >= 4 为高级，>= 3 为中级，其余为初级。
    pub fn from_mean_fluency(mean: f64) -> Self {
        if mean >= 4.0 {
            Level::Advanced
        } else if mean >= 3.0 {
            Level::Intermediate
        } else {
            Level::Beginner
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mean_fluency_mapping() {
        // 定级边界：4.2 -> 高级，3.0 -> 中级，2.9 -> 初级
        assert_eq!(Level::from_mean_fluency(4.2), Level::Advanced);
        assert_eq!(Level::from_mean_fluency(4.0), Level::Advanced);
        assert_eq!(Level::from_mean_fluency(3.0), Level::Intermediate);
        assert_eq!(Level::from_mean_fluency(2.9), Level::Beginner);
        assert_eq!(Level::from_mean_fluency(1.0), Level::Beginner);
    }

    #[test]
    fn test_from_str_roundtrip() {
        for level in [Level::Beginner, Level::Intermediate, Level::Advanced] {
            assert_eq!(Level::from_str(level.name()), Some(level));
        }
        assert_eq!(Level::from_str("Intermediate"), Some(Level::Intermediate));
        assert_eq!(Level::from_str("expert"), None);
    }

    #[test]
    fn test_rank_is_catalog_order() {
        assert!(Level::Beginner.rank() < Level::Intermediate.rank());
        assert!(Level::Intermediate.rank() < Level::Advanced.rank());
    }
}
