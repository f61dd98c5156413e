//! 音频输出能力 - 基础设施层
//!
//! 只暴露"把一段音频放出来"的能力，解码和设备管理由实现负责。

use bytes::Bytes;
use futures::future::BoxFuture;

use crate::error::AppResult;

/// 音频输出
///
/// `play` 返回的 future 在播放自然结束时完成；
/// 解码或播放失败时返回 `Playback` 错误。
/// 上层通过丢弃 / abort 任务来打断播放，实现必须在
/// future 被取消时释放临时音频资源。
pub trait AudioSink: Send + Sync {
    fn play(&self, audio: Bytes) -> BoxFuture<'static, AppResult<()>>;
}
