use std::fmt;

use crate::models::Level;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 麦克风采集错误
    Capture(CaptureError),
    /// 语音合成 / 播放错误
    Synthesis(SynthesisError),
    /// 题库错误
    Catalog(CatalogError),
    /// 测试会话状态错误
    Session(SessionError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "采集错误: {}", e),
            AppError::Synthesis(e) => write!(f, "语音合成错误: {}", e),
            AppError::Catalog(e) => write!(f, "题库错误: {}", e),
            AppError::Session(e) => write!(f, "会话错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Capture(e) => Some(e),
            AppError::Synthesis(e) => Some(e),
            AppError::Catalog(e) => Some(e),
            AppError::Session(e) => Some(e),
        }
    }
}

/// 麦克风采集错误
///
/// 全部为"可在用户层面重试"的非致命错误：失败时录音状态机保持原状态。
#[derive(Debug)]
pub enum CaptureError {
    /// 用户拒绝麦克风权限，或设备不存在
    PermissionDenied,
    /// 设备暂时不可用
    DeviceUnavailable {
        reason: String,
    },
    /// 音频块合并 / 收尾失败
    FinalizeFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::PermissionDenied => {
                write!(f, "麦克风权限被拒绝（或没有可用的麦克风）")
            }
            CaptureError::DeviceUnavailable { reason } => {
                write!(f, "麦克风设备不可用: {}", reason)
            }
            CaptureError::FinalizeFailed { source } => {
                write!(f, "录音收尾失败: {}", source)
            }
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::FinalizeFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 语音合成 / 播放错误
#[derive(Debug)]
pub enum SynthesisError {
    /// 未配置 API 凭证
    MissingCredential,
    /// 网络请求失败
    RequestFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 服务返回错误响应（凭证无效、服务故障等）
    Unavailable {
        status: u16,
        message: Option<String>,
    },
    /// 音频解码 / 播放失败
    Playback {
        reason: String,
    },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::MissingCredential => {
                write!(f, "未配置语音合成 API Key")
            }
            SynthesisError::RequestFailed { source } => {
                write!(f, "语音合成请求失败: {}", source)
            }
            SynthesisError::Unavailable { status, message } => {
                write!(
                    f,
                    "语音合成服务不可用 (状态码: {}, 信息: {:?})",
                    status, message
                )
            }
            SynthesisError::Playback { reason } => {
                write!(f, "音频播放失败: {}", reason)
            }
        }
    }
}

impl std::error::Error for SynthesisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SynthesisError::RequestFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 题库错误
///
/// 只会在题库构建（内置题库或 TOML 加载）时出现，测试进行中题库只读。
#[derive(Debug)]
pub enum CatalogError {
    /// 某一难度没有任何题目
    EmptyLevel {
        level: Level,
    },
    /// 某一难度题目数量不足以支撑自适应分支
    InsufficientQuestions {
        level: Level,
        needed: usize,
        actual: usize,
    },
    /// 期望时长必须为正数
    NonPositiveExpectedLength {
        question_id: String,
    },
    /// 题目 ID 重复
    DuplicateId {
        question_id: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::EmptyLevel { level } => {
                write!(f, "难度 {} 没有任何题目", level)
            }
            CatalogError::InsufficientQuestions {
                level,
                needed,
                actual,
            } => {
                write!(
                    f,
                    "难度 {} 题目数量不足: 需要 {} 个，实际 {} 个",
                    level, needed, actual
                )
            }
            CatalogError::NonPositiveExpectedLength { question_id } => {
                write!(f, "题目 {} 的期望时长必须为正数", question_id)
            }
            CatalogError::DuplicateId { question_id } => {
                write!(f, "题目 ID 重复: {}", question_id)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// 测试会话状态错误
#[derive(Debug)]
pub enum SessionError {
    /// 当前没有进行中的录音
    NotRecording,
    /// 测试已结束，不能再执行任何操作
    AlreadyCompleted,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotRecording => {
                write!(f, "当前没有进行中的录音")
            }
            SessionError::AlreadyCompleted => {
                write!(f, "测试已结束")
            }
        }
    }
}

impl std::error::Error for SessionError {}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Synthesis(SynthesisError::RequestFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建麦克风权限错误
    pub fn permission_denied() -> Self {
        AppError::Capture(CaptureError::PermissionDenied)
    }

    /// 创建设备不可用错误
    pub fn device_unavailable(reason: impl Into<String>) -> Self {
        AppError::Capture(CaptureError::DeviceUnavailable {
            reason: reason.into(),
        })
    }

    /// 创建合成服务不可用错误
    pub fn synthesis_unavailable(status: u16, message: Option<String>) -> Self {
        AppError::Synthesis(SynthesisError::Unavailable { status, message })
    }

    /// 创建播放失败错误
    pub fn playback_failed(reason: impl Into<String>) -> Self {
        AppError::Synthesis(SynthesisError::Playback {
            reason: reason.into(),
        })
    }

    /// 是否为"权限被拒绝"错误
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AppError::Capture(CaptureError::PermissionDenied))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
