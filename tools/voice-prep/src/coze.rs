//! # Coze 语气分类
//!
//! 把一批台词以 JSON 发给 Coze 对话接口，从流式响应中取出带语气标签的 JSON 数组。
//!
//! ```text
//! event:conversation.message.delta
//! data:{"type":"answer","content":"[{\"ste"}
//! ...
//! event:conversation.message.completed
//! data:{"type":"answer","content":"[{\"step\":1,\"emotion\":\"开心\"}]"}
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vn_dialogue::{DialogueRecord, ToneClassifier, ToneError};

use crate::config::CozeConfig;

const ROLE_USER: &str = "user";
const TYPE_TOOL_OUTPUT: &str = "tool_output";
const CONTENT_TYPE_TEXT: &str = "text";
const EVENT_COMPLETED: &str = "conversation.message.completed";
const TYPE_ANSWER: &str = "answer";

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    content_type: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    bot_id: &'a str,
    stream: bool,
    auto_save_history: bool,
    additional_messages: Vec<Message<'a>>,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageData {
    #[serde(rename = "type")]
    kind: String,
    content: String,
}

/// 基于 Coze 对话接口的语气分类器
#[derive(Debug)]
pub struct CozeClassifier {
    config: CozeConfig,
    client: reqwest::blocking::Client,
}

impl CozeClassifier {
    /// 用已验证的配置创建
    pub fn new(config: CozeConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, client })
    }

    fn build_request<'a>(&'a self, content: String) -> ChatRequest<'a> {
        ChatRequest {
            bot_id: &self.config.bot_id,
            stream: self.config.stream,
            auto_save_history: self.config.auto_save_history,
            additional_messages: vec![Message {
                role: ROLE_USER,
                kind: TYPE_TOOL_OUTPUT,
                content_type: CONTENT_TYPE_TEXT,
                content,
            }],
            user_id: &self.config.user_id,
        }
    }

    /// 发送一段内容，返回原始响应体
    fn send(&self, content: String) -> Result<String, ToneError> {
        let request = self.build_request(content);
        let response = self
            .client
            .post(self.config.effective_api_url())
            .bearer_auth(&self.config.token)
            .json(&request)
            .send()
            .map_err(request_error)?;

        let status = response.status();
        let mut body = String::new();
        response
            .take(self.config.max_response_bytes)
            .read_to_string(&mut body)
            .map_err(request_error)?;

        if !status.is_success() {
            return Err(ToneError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl ToneClassifier for CozeClassifier {
    fn classify(&self, batch: &[DialogueRecord]) -> Result<Vec<DialogueRecord>, ToneError> {
        if batch.is_empty() {
            return Err(ToneError::EmptyBatch);
        }

        let content = serde_json::to_string(batch).map_err(|e| ToneError::Request {
            message: e.to_string(),
        })?;
        debug!(count = batch.len(), bytes = content.len(), "发送语气分析请求");

        let body = self.send(content)?;
        let answer = extract_final_content(&body)?;
        serde_json::from_str(&answer).map_err(|e| ToneError::InvalidAnswer {
            message: e.to_string(),
        })
    }
}

fn request_error(e: impl std::fmt::Display) -> ToneError {
    ToneError::Request {
        message: e.to_string(),
    }
}

/// 从流式响应中取出完成事件的答案内容
///
/// 找到 `event:conversation.message.completed` 行，其下一行必须是
/// `data:{...}` 且 `type` 为 `answer`。不满足的事件跳过，继续往后找。
pub fn extract_final_content(body: &str) -> Result<String, ToneError> {
    let lines: Vec<&str> = body.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let Some(event) = line.strip_prefix("event:") else {
            continue;
        };
        if event.trim() != EVENT_COMPLETED {
            continue;
        }

        let Some(data) = lines.get(i + 1).and_then(|next| next.strip_prefix("data:")) else {
            continue;
        };

        match serde_json::from_str::<MessageData>(data.trim()) {
            Ok(message) if message.kind == TYPE_ANSWER => return Ok(message.content),
            _ => continue,
        }
    }

    Err(ToneError::MissingAnswer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> CozeConfig {
        CozeConfig {
            token: "t".to_string(),
            bot_id: "bot".to_string(),
            user_id: "user".to_string(),
            ..CozeConfig::default()
        }
    }

    #[test]
    fn test_extract_final_content() {
        let body = "\
event:conversation.chat.created
data:{\"id\":\"1\"}

event:conversation.message.completed
data:{\"type\":\"verbose\",\"content\":\"ignored\"}

event:conversation.message.completed
data:{\"type\":\"answer\",\"content\":\"[{\\\"step\\\":1,\\\"emotion\\\":\\\"开心\\\"}]\"}

event:done
data:\"[DONE]\"
";
        let content = extract_final_content(body).unwrap();
        assert_eq!(content, r#"[{"step":1,"emotion":"开心"}]"#);

        let labeled: Vec<DialogueRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(labeled[0].step, 1);
        assert_eq!(labeled[0].emotion, "开心");
    }

    #[test]
    fn test_extract_without_answer() {
        let body = "event:conversation.message.completed\ndata:not json\n";
        assert_eq!(extract_final_content(body), Err(ToneError::MissingAnswer));

        // 完成事件在最后一行，没有 data
        assert_eq!(
            extract_final_content("event:conversation.message.completed"),
            Err(ToneError::MissingAnswer)
        );
    }

    #[test]
    fn test_new_requires_valid_config() {
        assert!(CozeClassifier::new(CozeConfig::default()).is_err());
        assert!(CozeClassifier::new(configured()).is_ok());
    }

    #[test]
    fn test_request_body_shape() {
        let classifier = CozeClassifier::new(configured()).unwrap();
        let request = classifier.build_request("[]".to_string());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["bot_id"], "bot");
        assert_eq!(json["user_id"], "user");
        assert_eq!(json["stream"], true);
        assert_eq!(json["additional_messages"][0]["type"], "tool_output");
        assert_eq!(json["additional_messages"][0]["content"], "[]");
    }

    #[test]
    fn test_classify_rejects_empty_batch() {
        let classifier = CozeClassifier::new(configured()).unwrap();
        assert_eq!(classifier.classify(&[]), Err(ToneError::EmptyBatch));
    }
}
