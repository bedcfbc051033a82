//! # VN Dialogue
//!
//! 从视觉小说脚本中提取按角色标注的台词序列。
//!
//! ## 架构概述
//!
//! `vn-dialogue` 是纯逻辑核心，不依赖任何 IO。
//! 脚本由调用方读取并按行切分，逐行交给解析器：
//!
//! ```text
//! 调用方                          DialogueParser
//!   │                                  │
//!   │──── feed(line, step) ──────────►│ classify → figure_change / dialogue
//!   │◄─── LineOutcome ─────────────────│
//!   │                                  │
//!   │──── finish() ──────────────────►│
//!   │◄─── ParsedScript ────────────────│ records + figures + skipped
//! ```
//!
//! 解析结果再交给导出（按角色分组成 JSON）和语气标注（按 step 合并标签）。
//!
//! ## 使用示例
//!
//! ```ignore
//! use vn_dialogue::{DialogueParser, group_by_figure, records_to_json};
//!
//! let parsed = DialogueParser::parse_text(&script_text);
//! for (id, records) in group_by_figure(&parsed.records) {
//!     let json = records_to_json(&records)?;
//!     // 写入 <id>.json
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`figure`]：对话记录与角色状态表
//! - [`script`]：行分类与解析器
//! - [`diagnostic`]：被跳过行的诊断
//! - [`export`]：按角色分组与 JSON 转换
//! - [`tone`]：语气标签合并
//! - [`error`]：错误类型定义

pub mod diagnostic;
pub mod error;
pub mod export;
pub mod figure;
pub mod script;
pub mod tone;

// 重导出核心类型
pub use diagnostic::{
    Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_script, get_silent_figures,
};
pub use error::{ExportError, ToneError};
pub use export::{export_file_name, group_by_figure, records_from_json, records_to_json};
pub use figure::{DialogueRecord, FigureTable};
pub use script::{
    DialogueParser, LineKind, LineOutcome, ParsePhase, ParsedScript, SkipReason, SkippedLine,
    classify_line,
};
pub use tone::{ToneClassifier, annotate_tones, merge_tone_labels};
