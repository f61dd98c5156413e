/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    // --- 语音合成（ElevenLabs）配置 ---
    /// API Key（出于安全考虑没有默认值，留空则语音播放不可用）
    pub elevenlabs_api_key: String,
    /// API 基础地址
    pub elevenlabs_api_base: String,
    /// 西班牙语语音 ID（Laura，适合西语朗读）
    pub voice_id: String,
    /// 合成模型 ID
    pub model_id: String,
    /// 语音稳定度
    pub voice_stability: f32,
    /// 相似度增强
    pub voice_similarity_boost: f32,
    /// 风格强度
    pub voice_style: f32,
    /// 是否开启扬声器增强
    pub voice_speaker_boost: bool,
    // --- 题库配置 ---
    /// 自定义题库 TOML 目录（不设置则使用内置题库）
    pub bank_folder: Option<String>,
    // --- 日志配置 ---
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 测试报告输出文件
    pub report_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: String::new(),
            elevenlabs_api_base: "https://api.elevenlabs.io".to_string(),
            voice_id: "FGY2WhTYpPnrIDTdsKH5".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            voice_stability: 0.5,
            voice_similarity_boost: 0.75,
            voice_style: 0.0,
            voice_speaker_boost: true,
            bank_folder: None,
            verbose_logging: false,
            report_file: "placement_report.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            elevenlabs_api_key: std::env::var("ELEVENLABS_API_KEY").unwrap_or(default.elevenlabs_api_key),
            elevenlabs_api_base: std::env::var("ELEVENLABS_API_BASE").unwrap_or(default.elevenlabs_api_base),
            voice_id: std::env::var("ELEVENLABS_VOICE_ID").unwrap_or(default.voice_id),
            model_id: std::env::var("ELEVENLABS_MODEL_ID").unwrap_or(default.model_id),
            voice_stability: std::env::var("VOICE_STABILITY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.voice_stability),
            voice_similarity_boost: std::env::var("VOICE_SIMILARITY_BOOST").ok().and_then(|v| v.parse().ok()).unwrap_or(default.voice_similarity_boost),
            voice_style: std::env::var("VOICE_STYLE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.voice_style),
            voice_speaker_boost: std::env::var("VOICE_SPEAKER_BOOST").ok().and_then(|v| v.parse().ok()).unwrap_or(default.voice_speaker_boost),
            bank_folder: std::env::var("BANK_FOLDER").ok(),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            report_file: std::env::var("REPORT_FILE").unwrap_or(default.report_file),
        }
    }
}
