/// 日志工具模块
///
/// 提供日志初始化、报告文件输出的辅助函数
use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use crate::models::{Level, UserResponse};

/// 初始化全局日志
///
/// 优先读取 `RUST_LOG`，未设置时按 verbose 开关取 debug / info。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 初始化报告文件（写入表头）
pub fn init_report_file(report_file_path: &str) -> Result<()> {
    let header = format!(
        "{}\n西班牙语口语定级测试报告 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(report_file_path, header)
        .with_context(|| format!("无法写入报告文件: {}", report_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(bank_size: usize, has_credential: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 西班牙语口语定级测试");
    info!("📚 题库题目数: {}", bank_size);
    if !has_credential {
        info!("💡 未配置语音合成 API Key，题目朗读不可用");
    }
    info!("{}", "=".repeat(60));
}

/// 追加最终报告：定级 + 每题作答明细
pub fn write_final_report(
    report_file_path: &str,
    level: Level,
    history: &[UserResponse],
) -> Result<()> {
    let mut report = String::new();
    report.push_str(&format!(
        "完成时间: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("定级结果: {}\n\n", level));
    report.push_str(&format!(
        "{:<8} {:>10} {:>8} {:>8}\n",
        "题号", "时长(秒)", "流利度", "复杂度"
    ));
    report.push_str(&format!("{}\n", "-".repeat(40)));
    for response in history {
        report.push_str(&format!(
            "{:<8} {:>10.1} {:>8} {:>8}\n",
            response.question_id, response.duration, response.fluency, response.complexity
        ));
    }
    report.push_str(&format!("{}\n", "=".repeat(60)));

    let mut content = fs::read_to_string(report_file_path).unwrap_or_default();
    content.push_str(&report);
    fs::write(report_file_path, content)
        .with_context(|| format!("无法写入报告文件: {}", report_file_path))?;
    Ok(())
}

/// 打印最终统计信息
pub fn print_final_stats(level: Level, answered: usize, report_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 测试完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🎯 定级结果: {}", level);
    info!("📝 作答题数: {}", answered);
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", report_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
