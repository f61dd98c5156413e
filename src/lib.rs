//! # Langsy Placement
//!
//! 西班牙语口语自适应定级测试核心
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（麦克风、音频输出），只暴露能力
//! - `MicrophoneCapture` / `CaptureRecorder` - 录音设备能力
//! - `AudioSink` - 音频播放能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不编排流程
//! - `AdaptiveSelector` - 按作答历史推导题目序列
//! - `ResponseScorer` - 按录音时长评分
//! - `RecordingSession` - 一道题一次录音的状态机
//! - `SpeechService` - 题干语音合成
//! - `PromptPlayer` - 播放生命周期（单路播放、显式取消）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次测试"的完整流程
//! - `TestSession` - 出题 → 录音 → 评分 → 推进的状态转移
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 组件装配与交互主循环
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{AudioSink, MicrophoneCapture, NullSink, SimulatedMicrophone};
pub use models::{Level, Question, QuestionBank, UserResponse};
pub use orchestrator::{App, UserEvent};
pub use services::{AdaptiveSelector, ResponseScorer, SpeechService};
pub use workflow::{AdvanceOutcome, TestSession};
