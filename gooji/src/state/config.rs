//! 应用配置模块
//!
//! 提供应用程序配置的加载、保存和管理功能
//!
//! # 配置文件
//!
//! JSON 格式，按 api / capture / upload 分节，缺失字段使用默认值。
//! `GOOJI_API_URL` 环境变量优先于配置文件中的后端地址。
//!
//! # 使用示例
//!
//! ```no_run
//! use gooji_lib::state::config::ConfigManager;
//!
//! // 加载配置
//! let mut config = ConfigManager::load("config.json").unwrap();
//!
//! // 修改配置
//! config.api.base_url = "https://media.example.org".to_string();
//!
//! // 保存配置
//! ConfigManager::save("config.json", &config).unwrap();
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::device::constraints::{FacingMode, StreamConstraints};
use crate::device::acquire::RetryPolicy;
use crate::upload::job::{ALLOWED_MEDIA_TYPES, MAX_PAYLOAD_BYTES};

/// 后端地址环境变量
pub const API_URL_ENV: &str = "GOOJI_API_URL";

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 路径错误
    #[error("Path error: {0}")]
    Path(String),
}

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 应用配置
///
/// 包含采集上传客户端的所有设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 后端 API 配置
    pub api: ApiConfig,
    /// 采集配置
    pub capture: CaptureConfig,
    /// 上传配置
    pub upload: UploadConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            capture: CaptureConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

/// 后端 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 后端基础地址
    pub base_url: String,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    /// 请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// 采集配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// 理想采集宽度（像素）
    pub ideal_width: u32,
    /// 理想采集高度（像素）
    pub ideal_height: u32,
    /// 摄像头朝向
    pub facing_mode: FacingMode,
    /// 是否采集音频
    pub audio: bool,
    /// 设备协商自动重试次数
    pub retry_attempts: u32,
    /// 重试间隔（毫秒）
    pub retry_backoff_ms: u64,
}

impl CaptureConfig {
    /// 构造采集约束
    pub fn constraints(&self) -> StreamConstraints {
        StreamConstraints::new(self.ideal_width, self.ideal_height)
            .with_facing_mode(self.facing_mode)
            .with_audio(self.audio)
    }

    /// 构造重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing_mode: FacingMode::User,
            audio: true,
            retry_attempts: 3,
            retry_backoff_ms: 1000,
        }
    }
}

/// 上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// 负载大小上限（字节）
    pub max_payload_bytes: u64,
    /// 允许的媒体类型
    pub allowed_media_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            allowed_media_types: ALLOWED_MEDIA_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// 配置管理器
///
/// 提供配置的加载、保存和管理功能
pub struct ConfigManager;

impl ConfigManager {
    /// 加载配置
    ///
    /// 从配置文件加载配置，如果文件不存在则返回默认配置；
    /// 随后应用环境变量覆盖
    ///
    /// # Errors
    ///
    /// 文件存在但无法读取或解析时返回 [`ConfigError`]
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
        let path = path.as_ref();

        tracing::debug!(path = %path.display(), "Loading config");

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = serde_json::from_str(&content)?;
            tracing::info!(path = %path.display(), "Config loaded successfully");
            config
        } else {
            tracing::info!("Config file not found, using defaults");
            AppConfig::default()
        };

        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// 保存配置
    ///
    /// 将配置保存到配置文件，必要时创建父目录
    pub fn save(path: impl AsRef<Path>, config: &AppConfig) -> ConfigResult<()> {
        let path = path.as_ref();

        tracing::debug!(path = %path.display(), "Saving config");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(path, content)?;

        tracing::info!(path = %path.display(), "Config saved successfully");
        Ok(())
    }

    /// 检查配置文件是否存在
    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().exists()
    }

    /// 删除配置文件
    pub fn delete(path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if path.exists() {
            std::fs::remove_file(path)?;
            tracing::info!(path = %path.display(), "Config deleted");
        }
        Ok(())
    }

    /// 重置为默认配置并保存
    pub fn reset(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
        let config = AppConfig::default();
        Self::save(path, &config)?;
        tracing::info!("Config reset to defaults");
        Ok(config)
    }

    /// 默认配置文件路径（当前工作目录下的 config.json）
    pub fn default_path() -> PathBuf {
        PathBuf::from("config.json")
    }

    /// 应用环境变量覆盖
    fn apply_env_overrides(config: &mut AppConfig) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!(url = %url, "API base URL overridden from environment");
                config.api.base_url = url;
            }
        }
    }
}

/// 全局配置状态
///
/// 使用 ArcSwap 实现无锁读取
pub struct GlobalConfig {
    config: ArcSwap<AppConfig>,
}

impl GlobalConfig {
    /// 创建新的全局配置
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: ArcSwap::new(Arc::new(config)),
        }
    }

    /// 获取当前配置
    pub fn get(&self) -> Arc<AppConfig> {
        self.config.load_full()
    }

    /// 更新配置
    pub fn update(&self, config: AppConfig) {
        self.config.store(Arc::new(config));
    }

    /// 获取后端基础地址
    pub fn api_base_url(&self) -> String {
        self.config.load_full().api.base_url.clone()
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.request_timeout_secs, 30);

        assert_eq!(config.capture.ideal_width, 1280);
        assert_eq!(config.capture.ideal_height, 720);
        assert_eq!(config.capture.retry_attempts, 3);
        assert_eq!(config.capture.retry_backoff_ms, 1000);

        assert_eq!(config.upload.max_payload_bytes, 500 * 1024 * 1024);
        assert_eq!(config.upload.allowed_media_types.len(), 4);
    }

    #[test]
    fn test_capture_config_conversions() {
        let config = CaptureConfig::default();

        let constraints = config.constraints();
        assert_eq!(constraints.ideal_width, 1280);
        assert_eq!(constraints.ideal_height, 720);
        assert!(constraints.audio);

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_app_config_serialization() {
        let config = AppConfig::default();

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.api.base_url, deserialized.api.base_url);
        assert_eq!(config.capture.ideal_width, deserialized.capture.ideal_width);
        assert_eq!(
            config.upload.max_payload_bytes,
            deserialized.upload.max_payload_bytes
        );
    }

    #[test]
    fn test_config_partial_json() {
        // 测试部分 JSON 能够正确反序列化（使用默认值填充缺失字段）
        let json = r#"{
            "api": {
                "base_url": "https://media.example.org"
            }
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.api.base_url, "https://media.example.org");
        assert_eq!(config.api.request_timeout_secs, 30); // 默认值
        assert_eq!(config.capture.ideal_width, 1280); // 默认值
        assert_eq!(config.upload.max_payload_bytes, 500 * 1024 * 1024); // 默认值
    }

    #[test]
    fn test_global_config() {
        let global = GlobalConfig::default();
        assert_eq!(global.api_base_url(), "http://localhost:8080");

        let mut new_config = AppConfig::default();
        new_config.api.base_url = "https://media.example.org".to_string();
        global.update(new_config);

        assert_eq!(global.api_base_url(), "https://media.example.org");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let config = ConfigManager::load(&path).unwrap();
        assert_eq!(config.capture.retry_attempts, 3);
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.capture.ideal_width = 1920;
        config.capture.ideal_height = 1080;

        ConfigManager::save(&path, &config).unwrap();
        assert!(ConfigManager::exists(&path));

        let reloaded = ConfigManager::load(&path).unwrap();
        assert_eq!(reloaded.capture.ideal_width, 1920);
        assert_eq!(reloaded.capture.ideal_height, 1080);

        ConfigManager::delete(&path).unwrap();
        assert!(!ConfigManager::exists(&path));
    }
}
