//! 全局错误处理模块
//!
//! 提供统一的应用错误类型和用户友好的错误消息
//!
//! # 功能
//!
//! - 统一的 `AppError` 类型，聚合所有模块错误
//! - 用户友好的错误消息（状态面板直接显示）
//! - 错误代码用于宿主界面处理
//! - 错误恢复建议
//!
//! 任何失败要么带着用户可见消息浮出，要么落入日志，
//! 不会被静默吞掉。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::error::ApiError;
use crate::device::error::DeviceError;
use crate::recording::error::RecordingError;
use crate::state::config::ConfigError;
use crate::state::StateError;
use crate::upload::error::UploadError;

/// 应用错误类型
///
/// 聚合所有模块的错误类型，提供统一的错误处理接口
#[derive(Error, Debug)]
pub enum AppError {
    /// 设备错误
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// 录制错误
    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),

    /// 上传错误
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// 后端 API 错误
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 状态错误
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 错误代码
///
/// 用于宿主界面识别和处理特定错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 设备错误 (1xxx)
    /// 摄像头/麦克风权限被拒绝
    DevicePermissionDenied,
    /// 找不到采集设备
    DeviceNotFound,
    /// 宿主不支持媒体采集
    DeviceUnsupported,
    /// 未分类的设备错误
    DeviceUnknown,

    // 录制错误 (2xxx)
    /// 无效的会话状态转换
    RecordingInvalidTransition,
    /// 没有进行中的录制
    RecordingNotActive,
    /// 录制格式未协商
    RecordingFormatMissing,
    /// 没有可用的采集流
    RecordingNoStream,

    // 上传错误 (3xxx)
    /// 必填字段校验失败
    UploadValidationFailed,
    /// 媒体类型不在允许列表中
    UploadUnsupportedMediaType,
    /// 负载超过大小上限
    UploadPayloadTooLarge,
    /// 网络传输失败
    UploadTransportFailed,
    /// 服务器返回错误状态
    UploadServerError,

    // API 错误 (4xxx)
    /// 请求传输失败
    ApiTransportFailed,
    /// 非成功状态码
    ApiStatusError,
    /// 响应解析失败
    ApiDecodeFailed,

    // 配置错误 (5xxx)
    /// 配置加载失败
    ConfigLoadFailed,
    /// 配置无效
    ConfigInvalid,

    // 状态错误 (6xxx)
    /// 无效的应用状态转换
    StateInvalidTransition,

    // 通用错误 (9xxx)
    /// 内部错误
    InternalError,
}

/// 错误上下文信息
///
/// 提供用户友好的错误信息和恢复建议
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// 错误代码
    pub code: ErrorCode,
    /// 用户友好的错误消息
    pub message: String,
    /// 详细错误信息（用于日志）
    pub detail: Option<String>,
    /// 恢复建议
    pub recovery_hint: Option<String>,
    /// 是否可恢复
    pub recoverable: bool,
}

impl ErrorContext {
    /// 创建新的错误上下文
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
            recovery_hint: None,
            recoverable: true,
        }
    }

    /// 设置详细信息
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// 设置恢复建议
    pub fn with_recovery_hint(mut self, hint: impl Into<String>) -> Self {
        self.recovery_hint = Some(hint.into());
        self
    }

    /// 标记为不可恢复
    pub fn not_recoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            // 设备错误
            AppError::Device(err) => Self::device_code(err),

            // 录制错误
            AppError::Recording(RecordingError::InvalidTransition { .. }) => {
                ErrorCode::RecordingInvalidTransition
            }
            AppError::Recording(RecordingError::NotRecording) => ErrorCode::RecordingNotActive,
            AppError::Recording(RecordingError::FormatNotNegotiated) => {
                ErrorCode::RecordingFormatMissing
            }
            AppError::Recording(RecordingError::NoActiveStream) => ErrorCode::RecordingNoStream,
            AppError::Recording(RecordingError::Device(err)) => Self::device_code(err),

            // 上传错误
            AppError::Upload(UploadError::Validation { .. }) => ErrorCode::UploadValidationFailed,
            AppError::Upload(UploadError::UnsupportedMediaType(_)) => {
                ErrorCode::UploadUnsupportedMediaType
            }
            AppError::Upload(UploadError::PayloadTooLarge { .. }) => {
                ErrorCode::UploadPayloadTooLarge
            }
            AppError::Upload(UploadError::Transport(_)) => ErrorCode::UploadTransportFailed,
            AppError::Upload(UploadError::Server(_)) => ErrorCode::UploadServerError,

            // API 错误
            AppError::Api(ApiError::Transport(_)) => ErrorCode::ApiTransportFailed,
            AppError::Api(ApiError::Status(_)) => ErrorCode::ApiStatusError,
            AppError::Api(ApiError::Decode(_)) => ErrorCode::ApiDecodeFailed,

            // 配置错误
            AppError::Config(ConfigError::Json(_)) => ErrorCode::ConfigInvalid,
            AppError::Config(_) => ErrorCode::ConfigLoadFailed,

            // 状态错误
            AppError::State(_) => ErrorCode::StateInvalidTransition,

            // 通用错误
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    fn device_code(err: &DeviceError) -> ErrorCode {
        match err {
            DeviceError::PermissionDenied => ErrorCode::DevicePermissionDenied,
            DeviceError::DeviceNotFound => ErrorCode::DeviceNotFound,
            DeviceError::Unsupported => ErrorCode::DeviceUnsupported,
            DeviceError::Unknown(_) => ErrorCode::DeviceUnknown,
        }
    }

    /// 获取用户友好的错误消息
    ///
    /// 返回适合直接显示在状态面板中的错误消息
    pub fn user_message(&self) -> String {
        match self.code() {
            ErrorCode::DevicePermissionDenied => {
                "Camera and microphone access was denied. Recording is disabled until \
                 permission is granted."
                    .to_string()
            }
            ErrorCode::DeviceNotFound => {
                "No camera was found. Check your device connections.".to_string()
            }
            ErrorCode::DeviceUnsupported => {
                "This browser does not support video recording.".to_string()
            }
            ErrorCode::DeviceUnknown => {
                "Something went wrong while accessing the camera. Please retry.".to_string()
            }

            ErrorCode::RecordingInvalidTransition => {
                "That recording action is not available right now.".to_string()
            }
            ErrorCode::RecordingNotActive => "No recording is in progress.".to_string(),
            ErrorCode::RecordingFormatMissing | ErrorCode::RecordingNoStream => {
                "Recording is not ready yet. Wait for the camera to initialize.".to_string()
            }

            ErrorCode::UploadValidationFailed => {
                "Please fill in all required fields before uploading.".to_string()
            }
            ErrorCode::UploadUnsupportedMediaType => {
                "Please select a valid video file (MP4, WebM, MOV, AVI).".to_string()
            }
            ErrorCode::UploadPayloadTooLarge => {
                "The video is too large. The limit is 500 MB.".to_string()
            }
            ErrorCode::UploadTransportFailed => {
                "Upload failed. Check your connection and try again.".to_string()
            }
            ErrorCode::UploadServerError => {
                "The server could not process the upload. Try again.".to_string()
            }

            ErrorCode::ApiTransportFailed => {
                "Could not reach the server. Check your connection.".to_string()
            }
            ErrorCode::ApiStatusError => "The server rejected the request.".to_string(),
            ErrorCode::ApiDecodeFailed => {
                "The server sent an unexpected response.".to_string()
            }

            ErrorCode::ConfigLoadFailed => "Could not read the configuration file.".to_string(),
            ErrorCode::ConfigInvalid => "The configuration file is malformed.".to_string(),

            ErrorCode::StateInvalidTransition => {
                "That action is not available right now.".to_string()
            }

            ErrorCode::InternalError => match self {
                AppError::Internal(msg) => format!("Internal error: {msg}"),
                _ => "Internal error".to_string(),
            },
        }
    }

    /// 获取恢复建议
    pub fn recovery_hint(&self) -> Option<String> {
        match self.code() {
            ErrorCode::DevicePermissionDenied => Some(
                "Grant camera and microphone permissions in your browser settings, \
                 then use the retry control."
                    .to_string(),
            ),
            ErrorCode::DeviceNotFound => {
                Some("Connect a camera and refresh the device list.".to_string())
            }
            ErrorCode::UploadPayloadTooLarge => {
                Some("Record a shorter clip or choose a smaller file.".to_string())
            }
            ErrorCode::UploadTransportFailed | ErrorCode::UploadServerError => Some(
                "Your title, description and video are kept; submit again when ready."
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// 获取完整的错误上下文
    pub fn context(&self) -> ErrorContext {
        let mut ctx = ErrorContext::new(self.code(), self.user_message())
            .with_detail(self.to_string());

        ctx.recovery_hint = self.recovery_hint();

        if !self.is_recoverable() {
            ctx = ctx.not_recoverable();
        }

        ctx
    }

    /// 检查错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Config(_) | AppError::Internal(_))
    }

    /// 检查是否是权限错误
    pub fn is_permission_error(&self) -> bool {
        matches!(self.code(), ErrorCode::DevicePermissionDenied)
    }

    /// 检查是否是上传前的本地校验错误（未发起任何网络请求）
    pub fn is_local_upload_error(&self) -> bool {
        matches!(self, AppError::Upload(err) if err.is_local())
    }
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 将任意错误转换为内部错误
impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
