//! # GPT-SoVITS 语音合成
//!
//! 把台词以 JSON 发给已启动的 GPT-SoVITS `/tts` 接口，取回音频字节。
//! 服务的启动与模型权重切换不在这里处理。
//!
//! ```text
//! POST /tts
//! {"text":"你好","text_lang":"zh","ref_audio_path":"...","prompt_lang":"zh",...}
//!
//! 200 → 音频字节
//! 400 → {"message":"...","Exception":"..."}
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use vn_dialogue::DialogueRecord;

use crate::config::TtsConfig;
use crate::lang::detect_language;

/// 语音合成错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TtsError {
    /// 必填字段为空
    #[error("{field} 不能为空")]
    MissingField { field: &'static str },

    /// 请求发送失败
    #[error("发送合成请求失败: {message}")]
    Request { message: String },

    /// 服务返回非成功状态码
    #[error("合成服务返回错误状态码 {status}: {message}")]
    Status { status: u16, message: String },
}

/// `/tts` 请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TtsRequest {
    pub text: String,
    pub text_lang: String,
    pub ref_audio_path: String,
    /// 多说话人音色融合用的辅助参考音频
    pub aux_ref_audio_paths: Vec<String>,
    pub prompt_text: String,
    pub prompt_lang: String,
    pub top_k: u32,
    pub top_p: f64,
    pub temperature: f64,
    pub text_split_method: String,
    pub batch_size: u32,
    pub batch_threshold: f64,
    pub split_bucket: bool,
    pub speed_factor: f64,
    pub fragment_interval: f64,
    /// -1 表示随机
    pub seed: i64,
    pub media_type: String,
    pub streaming_mode: bool,
    pub parallel_infer: bool,
    pub repetition_penalty: f64,
    /// 仅 V3 模型使用
    pub sample_steps: u32,
    /// 仅 V3 模型使用
    pub super_sampling: bool,
}

impl TtsRequest {
    /// 用四个必填字段创建，其余取服务推荐的默认值
    pub fn new(
        text: impl Into<String>,
        text_lang: impl Into<String>,
        ref_audio_path: impl Into<String>,
        prompt_lang: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            text_lang: text_lang.into(),
            ref_audio_path: ref_audio_path.into(),
            aux_ref_audio_paths: Vec::new(),
            prompt_text: String::new(),
            prompt_lang: prompt_lang.into(),
            top_k: 5,
            top_p: 1.0,
            temperature: 1.0,
            text_split_method: "cut5".to_string(),
            batch_size: 1,
            batch_threshold: 0.75,
            split_bucket: true,
            speed_factor: 1.0,
            fragment_interval: 0.3,
            seed: -1,
            media_type: "wav".to_string(),
            streaming_mode: false,
            parallel_infer: true,
            repetition_penalty: 1.35,
            sample_steps: 32,
            super_sampling: false,
        }
    }

    pub fn with_prompt_text(mut self, prompt_text: impl Into<String>) -> Self {
        self.prompt_text = prompt_text.into();
        self
    }

    /// 检查必填字段
    pub fn validate(&self) -> Result<(), TtsError> {
        let required = [
            ("text", &self.text),
            ("text_lang", &self.text_lang),
            ("ref_audio_path", &self.ref_audio_path),
            ("prompt_lang", &self.prompt_lang),
        ];
        match required.into_iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(TtsError::MissingField { field }),
            None => Ok(()),
        }
    }
}

/// 为一条台词构造请求，`text_lang` 按台词内容检测
pub fn request_for_record(config: &TtsConfig, record: &DialogueRecord) -> TtsRequest {
    let text_lang = detect_language(&record.text).tts_lang();
    TtsRequest::new(
        &record.text,
        text_lang,
        &config.ref_audio_path,
        &config.prompt_lang,
    )
    .with_prompt_text(&config.prompt_text)
}

/// 合成音频文件名：`<id>_<step>.<media_type>`
pub fn audio_file_name(record: &DialogueRecord, media_type: &str) -> String {
    format!("{}_{}.{}", record.id, record.step, media_type)
}

/// 语音合成服务
pub trait SpeechSynthesizer {
    fn synthesize(&self, request: &TtsRequest) -> Result<Vec<u8>, TtsError>;
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(rename = "Exception", default)]
    exception: String,
}

/// 错误响应的可读描述：能解析成 `{message, Exception}` 就用它，否则原样返回
fn describe_error_body(body: &[u8]) -> String {
    match serde_json::from_slice::<ApiError>(body) {
        Ok(err) if !err.message.is_empty() && !err.exception.is_empty() => {
            format!("{} ({})", err.message, err.exception)
        }
        Ok(err) if !err.message.is_empty() => err.message,
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

fn request_error(e: impl std::fmt::Display) -> TtsError {
    TtsError::Request {
        message: e.to_string(),
    }
}

/// 基于 GPT-SoVITS api_v2 的合成客户端
#[derive(Debug)]
pub struct GptSovitsClient {
    config: TtsConfig,
    client: reqwest::blocking::Client,
}

impl GptSovitsClient {
    /// 用已验证的配置创建
    pub fn new(config: TtsConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, client })
    }
}

impl SpeechSynthesizer for GptSovitsClient {
    fn synthesize(&self, request: &TtsRequest) -> Result<Vec<u8>, TtsError> {
        request.validate()?;
        debug!(
            text_lang = %request.text_lang,
            chars = request.text.chars().count(),
            "发送合成请求"
        );

        let response = self
            .client
            .post(self.config.effective_api_url())
            .json(request)
            .send()
            .map_err(request_error)?;

        let status = response.status();
        let mut body = Vec::new();
        response
            .take(self.config.max_response_bytes)
            .read_to_end(&mut body)
            .map_err(request_error)?;

        if !status.is_success() {
            return Err(TtsError::Status {
                status: status.as_u16(),
                message: describe_error_body(&body),
            });
        }
        Ok(body)
    }
}
