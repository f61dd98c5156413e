//! 语音合成 - 业务能力层
//!
//! 只负责"把一句题干变成一段音频"的能力，不关心播放和流程。
//!
//! ## 技术栈
//! - 使用 `reqwest` 调用 ElevenLabs 文本转语音接口
//! - 响应为二进制音频流，按块收集为完整字节串
//! - 凭证由外层应用通过配置注入，本层不做持久化

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, SynthesisError};

/// 合成请求中的语音参数
#[derive(Debug, Clone, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

/// 语音合成服务
///
/// 职责：
/// - 调用语音合成 API，返回音频字节
/// - 只处理单条文本
/// - 不持有播放资源，不关心取消 / 暂停
#[derive(Clone)]
pub struct SpeechService {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    voice_id: String,
    model_id: String,
    settings: VoiceSettings,
}

impl SpeechService {
    /// 从配置创建语音合成服务
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.elevenlabs_api_base.clone(),
            api_key: config.elevenlabs_api_key.clone(),
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
            settings: VoiceSettings {
                stability: config.voice_stability,
                similarity_boost: config.voice_similarity_boost,
                style: config.voice_style,
                use_speaker_boost: config.voice_speaker_boost,
            },
        }
    }

    /// 是否已配置凭证
    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// 合成一段语音
    ///
    /// 失败分类：
    /// - 未配置凭证 -> `MissingCredential`
    /// - 网络失败 -> `RequestFailed`
    /// - 服务返回非 2xx（凭证无效、配额耗尽等）-> `Unavailable`
    ///
    /// 所有失败都不重试，由用户自行决定是否再按一次播放。
    pub async fn synthesize(&self, text: &str) -> AppResult<Bytes> {
        if !self.has_credential() {
            return Err(AppError::Synthesis(SynthesisError::MissingCredential));
        }

        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.api_base.trim_end_matches('/'),
            self.voice_id
        );

        debug!("调用语音合成 API，文本长度 {} 字符", text.chars().count());

        let request = SynthesisRequest {
            text,
            model_id: &self.model_id,
            voice_settings: &self.settings,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.ok().filter(|m| !m.is_empty());
            return Err(AppError::synthesis_unavailable(status.as_u16(), message));
        }

        // 按块收集音频流
        let mut audio = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            audio.extend_from_slice(&chunk?);
        }

        debug!("合成完成，共 {} 字节音频", audio.len());
        Ok(audio.freeze())
    }
}
