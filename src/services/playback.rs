//! 提示音播放 - 业务能力层
//!
//! 管理"合成 + 播放"这一条异步链路的生命周期：
//! - 任何时刻最多一个播放任务在跑；
//! - 再次播放会先中止上一次（包括还在合成中的请求），
//!   迟到的音频直接作废，不会叠音；
//! - 暂停 / 离开界面中止任务并回到未播放状态。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::AppResult;
use crate::infrastructure::AudioSink;

/// 提示音播放器
pub struct PromptPlayer {
    sink: Arc<dyn AudioSink>,
    playing: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl PromptPlayer {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            sink,
            playing: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// 是否正在播放（含合成中）
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// 播放一段音频
    ///
    /// `audio` 是延迟求值的音频来源（通常是一次合成请求）；
    /// 上一个任务会先被中止再启动新任务，保证同一时刻只有一路播放。
    /// 合成或播放失败只记一条告警，状态回到未播放。
    pub fn play(&mut self, audio: BoxFuture<'static, AppResult<Bytes>>) {
        self.stop();

        self.playing.store(true, Ordering::SeqCst);
        let sink = self.sink.clone();
        let playing = self.playing.clone();

        self.task = Some(tokio::spawn(async move {
            let result = async {
                let bytes = audio.await?;
                sink.play(bytes).await
            }
            .await;

            if let Err(e) = result {
                warn!("⚠️ 提示音播放失败: {}", e);
            }
            playing.store(false, Ordering::SeqCst);
        }));
    }

    /// 立即播放一段已有的音频（例如回放自己的录音）
    pub fn play_bytes(&mut self, bytes: Bytes) {
        self.play(Box::pin(async move { Ok(bytes) }));
    }

    /// 停止播放：中止任务，状态回到未播放
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.playing.store(false, Ordering::SeqCst);
    }
}

impl Drop for PromptPlayer {
    fn drop(&mut self) {
        // 离开界面时必须取消在途的合成 / 播放
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// 统计并发播放路数的慢速假音频输出
    ///
    /// 用守卫在 Drop 时递减计数，任务被中止（取消）时同样会释放。
    struct CountingSink {
        active: Arc<AtomicUsize>,
        completed: Arc<AtomicUsize>,
    }

    struct ActiveGuard(Arc<AtomicUsize>);

    impl Drop for ActiveGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl AudioSink for CountingSink {
        fn play(&self, _audio: Bytes) -> BoxFuture<'static, AppResult<()>> {
            let active = self.active.clone();
            let completed = self.completed.clone();
            Box::pin(async move {
                active.fetch_add(1, Ordering::SeqCst);
                let _guard = ActiveGuard(active);
                tokio::time::sleep(Duration::from_millis(200)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    fn counting_player() -> (PromptPlayer, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let active = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(CountingSink {
            active: active.clone(),
            completed: completed.clone(),
        });
        (PromptPlayer::new(sink), active, completed)
    }

    #[tokio::test]
    async fn test_second_play_cancels_the_first() {
        let (mut player, active, completed) = counting_player();

        player.play_bytes(Bytes::from_static(b"first"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(player.is_playing());

        player.play_bytes(Bytes::from_static(b"second"));
        tokio::time::sleep(Duration::from_millis(400)).await;

        // 第一次播放被中止，只有第二次播到结尾；结束后没有残留占用
        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert_eq!(active.load(Ordering::SeqCst), 0);
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn test_stop_resets_to_not_playing() {
        let (mut player, active, completed) = counting_player();

        player.play_bytes(Bytes::from_static(b"audio"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(player.is_playing());

        player.stop();
        assert!(!player.is_playing());

        // 被中止的任务释放输出资源，也不会播到结尾
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(active.load(Ordering::SeqCst), 0);
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_synthesis_is_ignored() {
        // 第一次播放还卡在"合成"阶段就被第二次顶掉：迟到的音频作废
        let (mut player, _active, completed) = counting_player();

        player.play(Box::pin(async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(Bytes::from_static(b"slow"))
        }));
        tokio::time::sleep(Duration::from_millis(50)).await;

        player.play_bytes(Bytes::from_static(b"fast"));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn test_playback_failure_resets_state() {
        struct FailingSink;
        impl AudioSink for FailingSink {
            fn play(&self, _audio: Bytes) -> BoxFuture<'static, AppResult<()>> {
                Box::pin(async { Err(crate::error::AppError::playback_failed("解码失败")) })
            }
        }

        let mut player = PromptPlayer::new(Arc::new(FailingSink));
        player.play_bytes(Bytes::from_static(b"bad"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!player.is_playing());
    }
}
