//! # Config 模块
//!
//! 工具配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config/voice_prep.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Coze 对话接口默认地址
pub const DEFAULT_COZE_API_URL: &str = "https://api.coze.cn/v3/chat";
/// GPT-SoVITS 合成接口默认地址
pub const DEFAULT_TTS_API_URL: &str = "http://127.0.0.1:9880/tts";

/// 工具配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicePrepConfig {
    /// 角色台词导出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 参考音频根目录
    #[serde(default = "default_reference_audio_dir")]
    pub reference_audio_dir: PathBuf,

    /// 每批发送给语气分类服务的记录数（0 表示不分批）
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// 语气分类服务配置
    #[serde(default)]
    pub coze: CozeConfig,

    /// 语音合成服务配置
    #[serde(default)]
    pub tts: TtsConfig,
}

/// Coze 语气分类服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CozeConfig {
    /// 接口地址（为空时使用默认地址）
    #[serde(default)]
    pub api_url: String,

    /// Bearer token
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub bot_id: String,

    #[serde(default)]
    pub user_id: String,

    /// 是否流式返回
    #[serde(default = "default_stream")]
    pub stream: bool,

    /// 是否在服务端保存会话
    #[serde(default)]
    pub auto_save_history: bool,

    /// 请求超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// 响应体大小上限（字节）
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,
}

/// GPT-SoVITS 语音合成服务配置
///
/// 服务需要另行启动并加载好模型，这里只负责发请求。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// 接口地址（为空时使用默认地址）
    #[serde(default)]
    pub api_url: String,

    /// 参考音频路径（服务端可访问的路径）
    #[serde(default)]
    pub ref_audio_path: String,

    /// 参考音频对应的文本
    #[serde(default)]
    pub prompt_text: String,

    /// 参考音频文本的语言
    #[serde(default = "default_prompt_lang")]
    pub prompt_lang: String,

    /// 合成音频输出目录
    #[serde(default = "default_tts_output_dir")]
    pub output_dir: PathBuf,

    /// 请求超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// 响应体大小上限（字节）
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,
}

// 默认值函数
fn default_output_dir() -> PathBuf {
    PathBuf::from("figures_output")
}

fn default_reference_audio_dir() -> PathBuf {
    PathBuf::from("reference_audio")
}

fn default_batch_size() -> usize {
    20
}

fn default_prompt_lang() -> String {
    "zh".to_string()
}

fn default_tts_output_dir() -> PathBuf {
    PathBuf::from("tts_output")
}

fn default_stream() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    // 大量台词时服务端较慢
    120
}

fn default_max_response_bytes() -> u64 {
    10 << 20
}

impl Default for VoicePrepConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            reference_audio_dir: default_reference_audio_dir(),
            batch_size: default_batch_size(),
            coze: CozeConfig::default(),
            tts: TtsConfig::default(),
        }
    }
}

impl Default for CozeConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            token: String::new(),
            bot_id: String::new(),
            user_id: String::new(),
            stream: default_stream(),
            auto_save_history: false,
            request_timeout_secs: default_request_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            ref_audio_path: String::new(),
            prompt_text: String::new(),
            prompt_lang: default_prompt_lang(),
            output_dir: default_tts_output_dir(),
            request_timeout_secs: default_request_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl VoicePrepConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并打印警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }
}

impl CozeConfig {
    /// 验证语气分类服务配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError::ValidationFailed("token 不能为空".to_string()));
        }
        if self.bot_id.is_empty() {
            return Err(ConfigError::ValidationFailed("bot_id 不能为空".to_string()));
        }
        if self.user_id.is_empty() {
            return Err(ConfigError::ValidationFailed("user_id 不能为空".to_string()));
        }
        Ok(())
    }

    /// 实际使用的接口地址
    pub fn effective_api_url(&self) -> &str {
        if self.api_url.is_empty() {
            DEFAULT_COZE_API_URL
        } else {
            &self.api_url
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl TtsConfig {
    /// 验证语音合成服务配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ref_audio_path.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "ref_audio_path 不能为空".to_string(),
            ));
        }
        if self.prompt_lang.is_empty() {
            return Err(ConfigError::ValidationFailed("prompt_lang 不能为空".to_string()));
        }
        Ok(())
    }

    /// 实际使用的接口地址
    pub fn effective_api_url(&self) -> &str {
        if self.api_url.is_empty() {
            DEFAULT_TTS_API_URL
        } else {
            &self.api_url
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 配置错误
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
