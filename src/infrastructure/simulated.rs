//! 模拟采集 / 播放实现
//!
//! 命令行演示和测试用的协作方实现：没有真实设备，
//! 但完整遵守采集能力的资源纪律（单占用、必释放）。

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::future::BoxFuture;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::audio::AudioSink;
use crate::infrastructure::capture::{
    AudioArtifact, CaptureRecorder, CaptureStream, MicrophoneCapture,
};

/// 模拟采样率（Hz），只用于让产物大小与时长成比例
const SIM_SAMPLE_RATE: f64 = 8000.0;
/// 产物大小上限，防止长录音撑爆内存
const SIM_MAX_SAMPLES: usize = 160_000;

/// 模拟麦克风
///
/// - `deny_access` 打开时模拟用户拒绝授权；
/// - 内部用计数器强制"同一时刻最多一次占用"。
pub struct SimulatedMicrophone {
    deny_access: AtomicBool,
    active: Arc<AtomicUsize>,
}

impl SimulatedMicrophone {
    pub fn new() -> Self {
        Self {
            deny_access: AtomicBool::new(false),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 构建一个始终拒绝授权的麦克风（测试权限分支用）
    pub fn denying() -> Self {
        let mic = Self::new();
        mic.deny_access.store(true, Ordering::SeqCst);
        mic
    }

    /// 当前占用数（0 或 1）
    pub fn active_acquisitions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedMicrophone {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrophoneCapture for SimulatedMicrophone {
    fn request_access(&self) -> AppResult<CaptureStream> {
        if self.deny_access.load(Ordering::SeqCst) {
            return Err(AppError::permission_denied());
        }
        if self.active.load(Ordering::SeqCst) > 0 {
            // 上一次占用未释放就再次申请，属于上层的资源管理缺陷
            return Err(AppError::device_unavailable("设备仍被上一次录音占用"));
        }
        Ok(CaptureStream::new("simulated-microphone"))
    }

    fn start_capture(&self, stream: CaptureStream) -> AppResult<Box<dyn CaptureRecorder>> {
        self.active.fetch_add(1, Ordering::SeqCst);
        debug!("🎙️ 模拟设备开始采集: {}", stream.device_label);
        Ok(Box::new(SimulatedRecorder {
            started_at: Instant::now(),
            active: self.active.clone(),
            released: false,
        }))
    }
}

struct SimulatedRecorder {
    started_at: Instant,
    active: Arc<AtomicUsize>,
    released: bool,
}

impl SimulatedRecorder {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.active.fetch_sub(1, Ordering::SeqCst);
            debug!("🎙️ 模拟设备已释放");
        }
    }
}

impl CaptureRecorder for SimulatedRecorder {
    fn stop(mut self: Box<Self>) -> AppResult<AudioArtifact> {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        let samples = ((elapsed * SIM_SAMPLE_RATE) as usize).min(SIM_MAX_SAMPLES);
        self.release();
        // 用静音占位真实音频，长度与录音时长成比例
        Ok(AudioArtifact::new(
            Bytes::from(vec![0u8; samples.max(1)]),
            "audio/wav",
        ))
    }

    fn abort(mut self: Box<Self>) {
        self.release();
    }
}

impl Drop for SimulatedRecorder {
    fn drop(&mut self) {
        // 录音机被直接丢弃时也必须释放设备
        self.release();
    }
}

/// 空音频输出：立即"播放完成"
///
/// 命令行演示没有扬声器，播放只体现在日志里。
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&self, audio: Bytes) -> BoxFuture<'static, AppResult<()>> {
        Box::pin(async move {
            debug!("🔊 模拟播放 {} 字节音频", audio.len());
            Ok(())
        })
    }
}
