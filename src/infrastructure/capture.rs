//! 麦克风采集能力 - 基础设施层
//!
//! 持有稀缺的录音设备资源，只暴露"申请权限 → 开始采集 → 收尾/放弃"的能力。
//! 不认识 Question / TestSession，也不关心业务流程。
//!
//! 资源纪律（并发模型要求）：
//! - 同一时刻最多一次设备占用；
//! - `stop` / `abort` / 丢弃录音机都必须释放设备；
//! - 在上一次占用释放之前不得再次 `request_access`。

use bytes::Bytes;

use crate::error::AppResult;

/// 一段已收尾的录音产物
///
/// 由采集端把缓冲的音频块合并为单个可回放的音频得到。
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// 合并后的音频数据
    pub data: Bytes,
    /// MIME 类型（如 `audio/wav`）
    pub mime_type: String,
}

impl AudioArtifact {
    pub fn new(data: Bytes, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }
}

/// 已获得授权的采集流
///
/// `request_access` 成功后得到，交给 `start_capture` 换取录音机句柄。
#[derive(Debug)]
pub struct CaptureStream {
    /// 设备标签，仅用于日志
    pub device_label: String,
}

impl CaptureStream {
    pub fn new(device_label: impl Into<String>) -> Self {
        Self {
            device_label: device_label.into(),
        }
    }
}

/// 麦克风采集能力
///
/// 外层渲染环境（浏览器、桌面端）各自注入实现；
/// 测试和命令行演示使用 [`super::simulated::SimulatedMicrophone`]。
pub trait MicrophoneCapture: Send + Sync {
    /// 请求麦克风权限
    ///
    /// 用户拒绝或没有可用设备时返回 `PermissionDenied`。
    fn request_access(&self) -> AppResult<CaptureStream>;

    /// 在已授权的流上开始采集，返回录音机句柄
    fn start_capture(&self, stream: CaptureStream) -> AppResult<Box<dyn CaptureRecorder>>;
}

/// 进行中的一次录音
///
/// 实现负责缓冲音频块；`stop` 与 `abort` 都会释放设备。
pub trait CaptureRecorder: Send {
    /// 停止采集：合并缓冲块为完整音频并释放设备
    fn stop(self: Box<Self>) -> AppResult<AudioArtifact>;

    /// 放弃采集：直接释放设备，不产生音频
    fn abort(self: Box<Self>);
}
