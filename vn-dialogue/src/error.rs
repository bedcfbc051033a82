//! # Error 模块
//!
//! 定义 vn-dialogue 中使用的错误类型。
//!
//! 解析器本身没有错误类型：格式不对的行一律静默跳过（见 [`crate::diagnostic`]）。
//! 这里的错误只属于导出和语气标注这些协作环节。

use thiserror::Error;

/// 导出错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// 序列化失败
    #[error("序列化角色对话失败: {message}")]
    SerializationFailed { message: String },

    /// 反序列化失败
    #[error("解析角色对话 JSON 失败: {message}")]
    DeserializationFailed { message: String },
}

/// 语气标注错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToneError {
    /// 没有可标注的对话
    #[error("对话列表不能为空")]
    EmptyBatch,

    /// 请求发送失败
    #[error("发送语气分析请求失败: {message}")]
    Request { message: String },

    /// 服务返回非成功状态码
    #[error("语气分析服务返回错误状态码 {status}: {body}")]
    Status { status: u16, body: String },

    /// 响应中找不到最终答案
    #[error("未找到有效的语气分析结果")]
    MissingAnswer,

    /// 答案内容无法解析
    #[error("解析语气分析结果失败: {message}")]
    InvalidAnswer { message: String },
}
