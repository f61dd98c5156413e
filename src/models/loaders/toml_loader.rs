//! 自定义题库加载器
//!
//! 从 TOML 文件加载题目，用于替换内置题库（例如换一套提示语料）。
//! 文件格式：
//!
//! ```toml
//! [[question]]
//! id = "b1"
//! level = "beginner"
//! text = "Hola, ¿cómo te llamas?"
//! expected_length = 10.0
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::{Level, Question, QuestionBank};

/// TOML 题库文件的反序列化结构
#[derive(Debug, Deserialize)]
struct BankFile {
    #[serde(default)]
    question: Vec<QuestionEntry>,
}

#[derive(Debug, Deserialize)]
struct QuestionEntry {
    id: String,
    level: String,
    text: String,
    expected_length: f64,
}

/// 从单个 TOML 文件加载题目列表
pub async fn load_questions_from_file(toml_file_path: &Path) -> Result<Vec<Question>> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let file: BankFile = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    let mut questions = Vec::with_capacity(file.question.len());
    for entry in file.question {
        let level = Level::from_str(&entry.level).with_context(|| {
            format!(
                "题目 {} 的难度无法识别: {} (应为 beginner/intermediate/advanced)",
                entry.id, entry.level
            )
        })?;
        questions.push(Question::new(
            entry.id,
            level,
            entry.text,
            entry.expected_length,
        ));
    }

    Ok(questions)
}

/// 从文件夹中加载所有 TOML 文件并构建题库
///
/// 文件按文件名排序后依次合并，保证目录顺序稳定；
/// 单个文件加载失败只告警并跳过，合并结果统一交给
/// [`QuestionBank::new`] 校验。
pub async fn load_bank_from_folder(folder_path: &str) -> Result<QuestionBank> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("题库文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }

    if toml_files.is_empty() {
        anyhow::bail!("在文件夹 {} 中没有找到 TOML 题库文件", folder_path);
    }

    toml_files.sort();

    let mut all_questions = Vec::new();
    for path in &toml_files {
        tracing::info!(
            "正在加载题库文件: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_questions_from_file(path).await {
            Ok(questions) => {
                tracing::info!("成功加载 {} 道题目", questions.len());
                all_questions.extend(questions);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    let bank = QuestionBank::new(all_questions)?;
    Ok(bank)
}
