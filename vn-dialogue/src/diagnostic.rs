//! # 诊断模块
//!
//! 把解析时被跳过的行整理成分级诊断，不依赖 IO。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Warn（格式疑似写错的立绘/对话行）、Info（其他舞台指令、没有台词的角色）
//! - 复用解析结果，不重复解析逻辑

use crate::script::{ParsedScript, SkipReason};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 脚本 ID / 文件路径
    pub script_id: String,
    /// 行号（如果可定位，从 1 开始）
    pub line: Option<usize>,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选，如原始行内容）
    pub detail: Option<String>,
}

impl Diagnostic {
    /// 创建警告诊断
    pub fn warn(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            script_id: script_id.into(),
            line: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建信息诊断
    pub fn info(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            script_id: script_id.into(),
            line: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 设置行号
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.script_id)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        self.warn_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }
}

//=============================================================================
// 脚本分析 API
//=============================================================================

/// 跳过原因对应的诊断级别
fn level_of(reason: &SkipReason) -> DiagnosticLevel {
    match reason {
        SkipReason::Unrecognized => DiagnosticLevel::Info,
        SkipReason::FigureChangeWithoutVisual
        | SkipReason::FigureChangeWithoutId
        | SkipReason::DialogueTooShort
        | SkipReason::DialogueWithoutFigureId
        | SkipReason::UnknownFigure { .. } => DiagnosticLevel::Warn,
    }
}

/// 分析解析结果，返回诊断结果
///
/// 执行以下检查：
/// - 每个被跳过的非空行（行号从 1 开始，详情为原始行）
/// - 登场过但一句台词都没有的角色
pub fn analyze_script(script_id: &str, parsed: &ParsedScript) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    for skipped in &parsed.skipped {
        let diag = match level_of(&skipped.reason) {
            DiagnosticLevel::Info => Diagnostic::info(script_id, skipped.reason.to_string()),
            DiagnosticLevel::Warn => Diagnostic::warn(script_id, skipped.reason.to_string()),
        };
        result.push(diag.with_line(skipped.step + 1).with_detail(&skipped.line));
    }

    for id in get_silent_figures(parsed) {
        result.push(Diagnostic::info(
            script_id,
            format!("角色 '{}' 登场后没有任何台词", id),
        ));
    }

    result
}

/// 登场过但没有台词的角色 id（按 id 排序）
pub fn get_silent_figures(parsed: &ParsedScript) -> Vec<&str> {
    parsed
        .figures
        .sorted()
        .into_iter()
        .map(|f| f.id.as_str())
        .filter(|id| parsed.records_for(id).next().is_none())
        .collect()
}
