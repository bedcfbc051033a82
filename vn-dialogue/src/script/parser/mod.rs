//! # Parser 模块
//!
//! 逐行折叠的对话解析器（手写字符串切分，无 regex 依赖）。
//!
//! ## 架构
//!
//! ```text
//! (line, step) → [classify_line] → LineKind
//!                                    ├─ FigureChange → apply_figure_change → FigureTable
//!                                    ├─ Dialogue     → apply_dialogue      → FigureTable + Vec<DialogueRecord>
//!                                    └─ Ignorable    → 跳过
//! ```
//!
//! ## 设计原则
//!
//! - 单线程、单遍、不回溯：第 i 行只能看到 0..i-1 行写入的状态
//! - 容错解析：格式不对的行静默跳过，只记录跳过原因，从不返回错误
//! - 状态表与输出序列归单个解析器实例所有，没有全局状态
//!
//! ## 模块结构
//!
//! - `helpers`: 辅助切分函数
//! - `figure_change`: 立绘切换指令
//! - `dialogue`: 对话行

mod dialogue;
mod figure_change;
pub(crate) mod helpers;


use crate::figure::{DialogueRecord, FigureTable};
use crate::script::line::{LineKind, LineOutcome, SkipReason, SkippedLine, classify_line};

pub use dialogue::apply_dialogue;
pub use figure_change::apply_figure_change;
pub use helpers::{dialogue_payload, split_speaker, strip_terminator};

/// 解析器所处阶段
///
/// ```text
/// Start ──feed──► Streaming ──feed──► Streaming
///   │                 │
///   └─────finish──────┴──► ParsedScript（Done）
/// ```
///
/// `finish` 会消费解析器，Done 阶段由返回的 [`ParsedScript`] 表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    /// 尚未输入任何行
    Start,
    /// 已输入至少一行
    Streaming,
}

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedScript {
    /// 按出现顺序排列的对话记录（只追加，同一角色可有多条）
    pub records: Vec<DialogueRecord>,
    /// 每个角色的最终快照
    pub figures: FigureTable,
    /// 被跳过的非空行
    pub skipped: Vec<SkippedLine>,
}

impl ParsedScript {
    /// 是否没有产生任何对话记录
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 某个角色的全部对话记录
    pub fn records_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a DialogueRecord> {
        self.records.iter().filter(move |r| r.id == id)
    }
}

/// 对话解析器
///
/// 按顺序逐行调用 [`feed`](Self::feed)，最后调用 [`finish`](Self::finish) 取得结果。
#[derive(Debug, Clone)]
pub struct DialogueParser {
    figures: FigureTable,
    records: Vec<DialogueRecord>,
    skipped: Vec<SkippedLine>,
    phase: ParsePhase,
}

impl DialogueParser {
    /// 创建新的解析器
    pub fn new() -> Self {
        Self {
            figures: FigureTable::new(),
            records: Vec::new(),
            skipped: Vec::new(),
            phase: ParsePhase::Start,
        }
    }

    /// 解析整段脚本文本
    ///
    /// 按行切分，step 为行号（从 0 开始），空行同样占用 step。
    pub fn parse_text(text: &str) -> ParsedScript {
        Self::parse_lines(text.lines().enumerate())
    }

    /// 解析带 step 的行序列
    pub fn parse_lines<I, S>(lines: I) -> ParsedScript
    where
        I: IntoIterator<Item = (usize, S)>,
        S: AsRef<str>,
    {
        let mut parser = Self::new();
        for (step, line) in lines {
            parser.feed(line.as_ref(), step);
        }
        parser.finish()
    }

    /// 输入一行
    ///
    /// 不会失败：每一行要么更新状态表，要么追加记录（同时更新状态表），要么什么都不做。
    pub fn feed(&mut self, line: &str, step: usize) -> LineOutcome {
        self.phase = ParsePhase::Streaming;

        let result = match classify_line(line) {
            LineKind::FigureChange(content) => {
                apply_figure_change(&mut self.figures, content, step)
                    .map(|id| LineOutcome::FigureUpdated { id })
            }
            LineKind::Dialogue(content) => {
                apply_dialogue(&mut self.figures, &mut self.records, content, step)
                    .map(|index| LineOutcome::DialogueAppended { index })
            }
            LineKind::Ignorable if line.trim().is_empty() => return LineOutcome::Blank,
            LineKind::Ignorable => Err(SkipReason::Unrecognized),
        };

        result.unwrap_or_else(|reason| {
            self.skipped.push(SkippedLine {
                step,
                line: line.trim().to_string(),
                reason: reason.clone(),
            });
            LineOutcome::Skipped(reason)
        })
    }

    /// 当前阶段
    pub fn phase(&self) -> ParsePhase {
        self.phase
    }

    /// 当前状态表
    pub fn figures(&self) -> &FigureTable {
        &self.figures
    }

    /// 到目前为止的对话记录
    pub fn records(&self) -> &[DialogueRecord] {
        &self.records
    }

    /// 到目前为止被跳过的行
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// 结束解析，交出状态表与对话记录
    pub fn finish(self) -> ParsedScript {
        ParsedScript {
            records: self.records,
            figures: self.figures,
            skipped: self.skipped,
        }
    }
}

impl Default for DialogueParser {
    fn default() -> Self {
        Self::new()
    }
}
