//! # Script 模块
//!
//! 脚本逐行解析：行分类与对话解析器。
//!
//! ## 模块结构
//!
//! - [`line`]：行类型、跳过原因、单行处理结果
//! - [`parser`]：逐行折叠的对话解析器

pub mod line;
pub mod parser;

pub use line::{LineKind, LineOutcome, SkipReason, SkippedLine, classify_line};
pub use parser::{DialogueParser, ParsePhase, ParsedScript};
