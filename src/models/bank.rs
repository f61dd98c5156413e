//! 题库 - 数据模型层
//!
//! 测评题目的只读目录：按"初级 → 中级 → 高级"的目录顺序存放，
//! 会话期间不可变。构建时校验不变量（见 [`QuestionBank::new`]）。

use crate::error::{AppError, AppResult, CatalogError};
use crate::models::{Level, Question};

/// 题库
///
/// 职责：
/// - 持有完整的题目目录（目录顺序）
/// - 暴露按难度的只读查询
/// - 构建时校验，之后不再出现错误
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

/// 自适应分支对每个难度的最低题目数要求
///
/// 前两次分支最多会用到第 3 个初级题、第 2 个中级题和第 1 个高级题。
const MIN_PER_LEVEL: [(Level, usize); 3] = [
    (Level::Beginner, 3),
    (Level::Intermediate, 2),
    (Level::Advanced, 1),
];

impl QuestionBank {
    /// 构建并校验题库
    ///
    /// 校验内容：
    /// - 每个难度至少有一道题，且数量满足自适应分支需要
    /// - 所有 `expected_length` 为正数
    /// - 题目 ID 不重复
    ///
    /// 题目会按难度稳定排序，保证目录顺序为"初级、中级、高级"拼接，
    /// 各难度内部保持传入顺序。
    pub fn new(mut questions: Vec<Question>) -> AppResult<Self> {
        for question in &questions {
            if question.expected_length <= 0.0 {
                return Err(AppError::Catalog(CatalogError::NonPositiveExpectedLength {
                    question_id: question.id.clone(),
                }));
            }
        }

        let mut seen_ids = std::collections::HashSet::new();
        for question in &questions {
            if !seen_ids.insert(question.id.as_str()) {
                return Err(AppError::Catalog(CatalogError::DuplicateId {
                    question_id: question.id.clone(),
                }));
            }
        }

        for (level, needed) in MIN_PER_LEVEL {
            let actual = questions.iter().filter(|q| q.level == level).count();
            if actual == 0 {
                return Err(AppError::Catalog(CatalogError::EmptyLevel { level }));
            }
            if actual < needed {
                return Err(AppError::Catalog(CatalogError::InsufficientQuestions {
                    level,
                    needed,
                    actual,
                }));
            }
        }

        questions.sort_by_key(|q| q.level.rank());

        Ok(Self { questions })
    }

    /// 内置西班牙语题库（15 道题）
    pub fn builtin() -> AppResult<Self> {
        Self::new(builtin_questions())
    }

    /// 完整目录（目录顺序）
    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    /// 某一难度的题目列表（稳定顺序，只读）
    pub fn questions_by_level(&self, level: Level) -> Vec<&Question> {
        self.questions.iter().filter(|q| q.level == level).collect()
    }

    /// 目录前缀：按目录顺序取前 `n` 道题
    pub fn catalog_prefix(&self, n: usize) -> Vec<&Question> {
        self.questions.iter().take(n).collect()
    }

    /// 按 ID 查找题目
    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// 题目总数
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// 内置题目清单
///
/// 与线上产品的西班牙语测评口径一致：每个难度 5 道题，
/// 期望时长随难度递增。
fn builtin_questions() -> Vec<Question> {
    vec![
        // ---- 初级 ----
        Question::new("b1", Level::Beginner, "Hola, ¿cómo te llamas?", 10.0),
        Question::new("b2", Level::Beginner, "¿De dónde eres?", 8.0),
        Question::new(
            "b3",
            Level::Beginner,
            "¿Qué te gusta hacer en tu tiempo libre?",
            15.0,
        ),
        Question::new(
            "b4",
            Level::Beginner,
            "¿Cuál es tu comida favorita y por qué?",
            12.0,
        ),
        Question::new(
            "b5",
            Level::Beginner,
            "Describe tu día típico desde que te levantas hasta que te acuestas.",
            20.0,
        ),
        // ---- 中级 ----
        Question::new(
            "i1",
            Level::Intermediate,
            "Cuéntame sobre tu trabajo o estudios. ¿Qué es lo que más te gusta de ello?",
            30.0,
        ),
        Question::new(
            "i2",
            Level::Intermediate,
            "Si pudieras viajar a cualquier lugar del mundo, ¿adónde irías y por qué?",
            45.0,
        ),
        Question::new(
            "i3",
            Level::Intermediate,
            "Describe una tradición importante de tu cultura.",
            40.0,
        ),
        Question::new(
            "i4",
            Level::Intermediate,
            "¿Cómo ha cambiado tu ciudad en los últimos años? ¿Te gustan estos cambios?",
            35.0,
        ),
        Question::new(
            "i5",
            Level::Intermediate,
            "Explica un problema que hayas tenido que resolver recientemente y cómo lo solucionaste.",
            40.0,
        ),
        // ---- 高级 ----
        Question::new(
            "a1",
            Level::Advanced,
            "¿Cómo crees que la tecnología está cambiando la forma en que nos comunicamos? \
             Explica tanto los aspectos positivos como los negativos.",
            60.0,
        ),
        Question::new(
            "a2",
            Level::Advanced,
            "Si fueras líder de tu país, ¿qué cambios implementarías para mejorar la educación y por qué?",
            90.0,
        ),
        Question::new(
            "a3",
            Level::Advanced,
            "Compara las ventajas y desventajas de vivir en una ciudad grande versus un pueblo pequeño.",
            75.0,
        ),
        Question::new(
            "a4",
            Level::Advanced,
            "Analiza el impacto del cambio climático en tu región y propón soluciones concretas \
             que podrían implementarse a nivel local.",
            80.0,
        ),
        Question::new(
            "a5",
            Level::Advanced,
            "Discute el papel de las redes sociales en la formación de la opinión pública \
             y su influencia en la democracia moderna.",
            85.0,
        ),
    ]
}
