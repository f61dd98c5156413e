//! 录音会话 - 业务能力层
//!
//! 管理"一道题一次录音"的完整生命周期：
//!
//! ```text
//! Idle -> Recording -> Stopped --(reset)--> Idle
//! ```
//!
//! 只依赖麦克风采集能力（基础设施层），不认识 Question / 历史记录。
//! 资源不变量：任何时刻最多占用一个录音设备；重新开始录音前
//! 必须先放弃并释放上一次占用。

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{AppError, AppResult, SessionError};
use crate::infrastructure::{AudioArtifact, CaptureRecorder, MicrophoneCapture};

/// 一次已完成录音的结果事件
///
/// 交给评分与确认环节消费。
#[derive(Debug, Clone)]
pub struct RecordingCompleted {
    /// 录音时长（秒，含小数）
    pub duration: f64,
    /// 可回放的录音产物
    pub artifact: AudioArtifact,
}

enum RecordingState {
    Idle,
    Recording {
        recorder: Box<dyn CaptureRecorder>,
        started_at: Instant,
    },
    Stopped {
        completed: RecordingCompleted,
    },
}

/// 录音会话状态机
pub struct RecordingSession {
    capture: Arc<dyn MicrophoneCapture>,
    state: RecordingState,
}

impl RecordingSession {
    pub fn new(capture: Arc<dyn MicrophoneCapture>) -> Self {
        Self {
            capture,
            state: RecordingState::Idle,
        }
    }

    /// 开始录音
    ///
    /// - 已在录音中：先放弃并释放上一次占用，再重新申请设备；
    /// - 已有未确认的录音产物：直接丢弃（隐式重录）；
    /// - 权限被拒绝：返回 `PermissionDenied`，状态保持 `Idle`。
    pub fn start(&mut self) -> AppResult<()> {
        self.discard_active();

        let stream = self.capture.request_access()?;
        let recorder = self.capture.start_capture(stream)?;
        self.state = RecordingState::Recording {
            recorder,
            started_at: Instant::now(),
        };
        Ok(())
    }

    /// 停止录音
    ///
    /// 仅在 `Recording` 状态下有效：合并音频块、计算时长、释放设备，
    /// 并返回 `RecordingCompleted` 事件。
    pub fn stop(&mut self) -> AppResult<RecordingCompleted> {
        match std::mem::replace(&mut self.state, RecordingState::Idle) {
            RecordingState::Recording {
                recorder,
                started_at,
            } => {
                let duration = started_at.elapsed().as_secs_f64();
                let artifact = recorder.stop()?;
                let completed = RecordingCompleted { duration, artifact };
                self.state = RecordingState::Stopped {
                    completed: completed.clone(),
                };
                debug!("录音完成，时长 {:.2} 秒", duration);
                Ok(completed)
            }
            other => {
                // 状态保持不变
                self.state = other;
                Err(AppError::Session(SessionError::NotRecording))
            }
        }
    }

    /// 丢弃当前录音产物，回到 `Idle`（重录入口）
    ///
    /// 丢弃的只是未确认的产物，不会产生任何作答记录。
    pub fn reset(&mut self) {
        if matches!(self.state, RecordingState::Stopped { .. }) {
            info!("🔁 丢弃本题录音，等待重录");
        }
        self.discard_active();
    }

    /// 是否正在录音
    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecordingState::Recording { .. })
    }

    /// 是否已有完成但未确认的录音
    pub fn has_audio(&self) -> bool {
        matches!(self.state, RecordingState::Stopped { .. })
    }

    /// 已完成录音的产物（未确认期间可回放）
    pub fn completed(&self) -> Option<&RecordingCompleted> {
        match &self.state {
            RecordingState::Stopped { completed } => Some(completed),
            _ => None,
        }
    }

    /// 放弃进行中的录音（若有），释放设备，状态回到 `Idle`
    fn discard_active(&mut self) {
        if let RecordingState::Recording { recorder, .. } =
            std::mem::replace(&mut self.state, RecordingState::Idle)
        {
            recorder.abort();
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        // 组件销毁时不允许泄漏设备占用
        self.discard_active();
    }
}
