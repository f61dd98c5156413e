//! 应用编排 - 编排层
//!
//! 职责：
//! - 组装各层组件（题库、采集、合成、播放、会话）
//! - 驱动交互主循环：读取用户事件，应用到会话 / 播放器
//! - 测试结束时输出定级报告
//!
//! 所有异步边界（采集、合成、播放）都在本层或播放器内持有，
//! 取消语义显式可见。

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::{AudioSink, MicrophoneCapture, NullSink, SimulatedMicrophone};
use crate::models::{load_bank_from_folder, QuestionBank};
use crate::services::{PromptPlayer, ResponseScorer, SpeechService};
use crate::utils::logging;
use crate::workflow::{AdvanceOutcome, TestSession};

/// 用户事件
///
/// 一行输入对应一个事件，无法识别的输入被忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    /// 播放 / 重播题目朗读
    PlayPrompt,
    /// 暂停朗读
    PausePrompt,
    /// 开始 / 停止录音（开关语义）
    ToggleRecording,
    /// 丢弃本题录音，重录
    ReRecord,
    /// 回放自己的录音
    PlayRecording,
    /// 确认作答，进入下一题
    Next,
    /// 回到上一题
    Back,
    /// 显示当前状态
    Status,
    /// 退出程序
    Quit,
}

impl UserEvent {
    /// 从一行输入解析事件
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "play" => Some(UserEvent::PlayPrompt),
            "x" | "pause" => Some(UserEvent::PausePrompt),
            "r" | "record" => Some(UserEvent::ToggleRecording),
            "rr" | "redo" => Some(UserEvent::ReRecord),
            "l" | "listen" => Some(UserEvent::PlayRecording),
            "n" | "next" | "" => Some(UserEvent::Next),
            "b" | "back" => Some(UserEvent::Back),
            "s" | "status" => Some(UserEvent::Status),
            "q" | "quit" => Some(UserEvent::Quit),
            _ => None,
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    session: TestSession,
    player: PromptPlayer,
    speech: SpeechService,
}

impl App {
    /// 初始化应用
    ///
    /// 默认装配模拟采集与静默播放（真实 UI 通过
    /// [`App::with_collaborators`] 注入自己的实现）。
    pub async fn initialize(config: Config) -> Result<Self> {
        let bank = load_bank(&config).await?;
        Self::with_collaborators(
            config,
            bank,
            Arc::new(SimulatedMicrophone::new()),
            Arc::new(NullSink),
        )
    }

    /// 用外部注入的采集 / 播放实现装配应用
    pub fn with_collaborators(
        config: Config,
        bank: Arc<QuestionBank>,
        capture: Arc<dyn MicrophoneCapture>,
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self> {
        logging::init_report_file(&config.report_file)?;

        let speech = SpeechService::new(&config);
        logging::log_startup(bank.len(), speech.has_credential());

        let session = TestSession::new(bank, capture, ResponseScorer::with_thread_rng());
        let player = PromptPlayer::new(sink);

        Ok(Self {
            config,
            session,
            player,
            speech,
        })
    }

    /// 运行交互主循环
    pub async fn run(&mut self) -> Result<()> {
        print_help();
        self.present_question();

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await.context("读取输入失败")? {
            let Some(event) = UserEvent::parse(&line) else {
                warn!("⚠️ 无法识别的输入: {:?}（输入 s 查看帮助）", line.trim());
                continue;
            };

            match self.apply(event) {
                Loop::Continue => {}
                Loop::Finished => break,
            }
        }

        Ok(())
    }

    /// 应用单个用户事件
    ///
    /// 可恢复的失败（权限被拒绝等）只告警，不中断主循环。
    pub fn apply(&mut self, event: UserEvent) -> Loop {
        match event {
            UserEvent::PlayPrompt => self.play_prompt(),
            UserEvent::PausePrompt => self.player.stop(),
            UserEvent::ToggleRecording => self.toggle_recording(),
            UserEvent::ReRecord => {
                self.session.reset_recording();
            }
            UserEvent::PlayRecording => self.play_recording(),
            UserEvent::Next => return self.advance(),
            UserEvent::Back => {
                // 回退时停掉在途的朗读
                self.player.stop();
                match self.session.go_back() {
                    Ok(true) => self.present_question(),
                    Ok(false) => info!("已经是第一题"),
                    Err(e) => warn!("⚠️ {}", e),
                }
            }
            UserEvent::Status => self.print_status(),
            UserEvent::Quit => {
                info!("👋 测试中断退出");
                return Loop::Finished;
            }
        }
        Loop::Continue
    }

    /// 当前会话（测试注入用）
    pub fn session(&self) -> &TestSession {
        &self.session
    }

    // ========== 事件处理 ==========

    fn play_prompt(&mut self) {
        let text = self.session.current_question().text.clone();
        let speech = self.speech.clone();
        info!("🔊 播放题目: {}", logging::truncate_text(&text, 40));
        self.player
            .play(Box::pin(async move { speech.synthesize(&text).await }));
    }

    fn toggle_recording(&mut self) {
        let result = if self.session.is_recording() {
            self.session.stop_recording()
        } else {
            self.session.start_recording()
        };
        if let Err(e) = result {
            if e.is_permission_denied() {
                warn!("⚠️ 麦克风权限被拒绝，请检查设备后重试");
            } else {
                warn!("⚠️ 录音失败: {}", e);
            }
        }
    }

    fn play_recording(&mut self) {
        match self.session.pending_recording() {
            Some(recording) => {
                info!("🔊 回放录音（{:.1} 秒）", recording.duration);
                self.player.play_bytes(recording.artifact.data.clone());
            }
            None => warn!("⚠️ 本题还没有录音"),
        }
    }

    fn advance(&mut self) -> Loop {
        match self.session.advance() {
            Ok(AdvanceOutcome::Moved) => {
                self.player.stop();
                self.present_question();
                Loop::Continue
            }
            Ok(AdvanceOutcome::Completed(level)) => {
                self.player.stop();
                self.finish(level);
                Loop::Finished
            }
            Ok(AdvanceOutcome::NotRecorded) => {
                warn!("⚠️ 请先录制回答，再进入下一题");
                Loop::Continue
            }
            Err(e) => {
                warn!("⚠️ {}", e);
                Loop::Continue
            }
        }
    }

    fn finish(&self, level: crate::models::Level) {
        if let Err(e) = logging::write_final_report(
            &self.config.report_file,
            level,
            self.session.history(),
        ) {
            warn!("⚠️ 报告写入失败: {}", e);
        }
        logging::print_final_stats(level, self.session.history().len(), &self.config.report_file);
    }

    // ========== 展示 ==========

    fn present_question(&self) {
        let snapshot = self.session.snapshot();
        info!("\n{}", "─".repeat(60));
        info!(
            "📄 第 {}/{} 题 [{}] 进度 {:.0}%",
            snapshot.current_index + 1,
            snapshot.total_questions,
            snapshot.question_level,
            snapshot.progress * 100.0
        );
        info!("❓ {}", snapshot.question_text);
        info!("⏱️ 期望作答时长约 {:.0} 秒", snapshot.expected_length);
        info!("{}", "─".repeat(60));
    }

    fn print_status(&self) {
        let snapshot = self.session.snapshot();
        info!("📊 当前状态:");
        info!("  题目: {} ({})", snapshot.question_id, snapshot.question_level);
        info!("  已作答: {}", snapshot.answered);
        info!("  录音中: {}", snapshot.is_recording);
        info!("  已录音: {}", snapshot.has_recorded);
        print_help();
    }
}

/// 主循环控制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loop {
    Continue,
    Finished,
}

fn print_help() {
    info!("💡 p=播放题目 x=暂停 r=录音开/关 rr=重录 l=回放 回车/n=下一题 b=上一题 s=状态 q=退出");
}

/// 按配置加载题库：指定目录则加载 TOML，否则使用内置题库
async fn load_bank(config: &Config) -> Result<Arc<QuestionBank>> {
    let bank = match &config.bank_folder {
        Some(folder) => {
            info!("📁 从 {} 加载自定义题库", folder);
            load_bank_from_folder(folder).await?
        }
        None => QuestionBank::builtin().context("内置题库构建失败")?,
    };
    Ok(Arc::new(bank))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_parse() {
        assert_eq!(UserEvent::parse("r"), Some(UserEvent::ToggleRecording));
        assert_eq!(UserEvent::parse("  RECORD "), Some(UserEvent::ToggleRecording));
        assert_eq!(UserEvent::parse(""), Some(UserEvent::Next));
        assert_eq!(UserEvent::parse("next"), Some(UserEvent::Next));
        assert_eq!(UserEvent::parse("rr"), Some(UserEvent::ReRecord));
        assert_eq!(UserEvent::parse("q"), Some(UserEvent::Quit));
        assert_eq!(UserEvent::parse("abc"), None);
    }

    fn test_app() -> App {
        let config = Config {
            report_file: std::env::temp_dir()
                .join("placement_app_test.txt")
                .to_string_lossy()
                .into_owned(),
            ..Config::default()
        };
        let bank = Arc::new(QuestionBank::builtin().unwrap());
        App::with_collaborators(
            config,
            bank,
            Arc::new(SimulatedMicrophone::new()),
            Arc::new(NullSink),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_next_without_recording_does_not_advance() {
        let mut app = test_app();
        assert_eq!(app.apply(UserEvent::Next), Loop::Continue);
        assert_eq!(app.session().snapshot().current_index, 0);
    }

    #[tokio::test]
    async fn test_record_toggle_then_next_advances() {
        let mut app = test_app();
        app.apply(UserEvent::ToggleRecording);
        assert!(app.session().is_recording());
        app.apply(UserEvent::ToggleRecording);
        assert!(app.session().has_recorded());

        assert_eq!(app.apply(UserEvent::Next), Loop::Continue);
        assert_eq!(app.session().snapshot().current_index, 1);
    }

    #[tokio::test]
    async fn test_quit_finishes_loop() {
        let mut app = test_app();
        assert_eq!(app.apply(UserEvent::Quit), Loop::Finished);
    }
}
