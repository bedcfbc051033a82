//! # 行分类
//!
//! 每行只判定一次类型，之后按类型穷尽匹配分派。

use std::fmt;

use super::parser::helpers::{FIGURE_CHANGE_PREFIX, FIGURE_ID_PREFIX};

/// 行类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// 立绘切换指令（已去掉首尾空白）
    FigureChange(&'a str),
    /// 对话行（已去掉首尾空白）
    Dialogue(&'a str),
    /// 空行或其他指令
    Ignorable,
}

/// 判定一行的类型
///
/// 1. 去掉首尾空白后为空 → `Ignorable`
/// 2. 以 `changeFigure:` 开头 → `FigureChange`
/// 3. 包含 `-figureId=` → `Dialogue`
/// 4. 其他 → `Ignorable`
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Ignorable
    } else if trimmed.starts_with(FIGURE_CHANGE_PREFIX) {
        LineKind::FigureChange(trimmed)
    } else if trimmed.contains(FIGURE_ID_PREFIX) {
        LineKind::Dialogue(trimmed)
    } else {
        LineKind::Ignorable
    }
}

/// 非空行被跳过的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 既不是立绘切换也不是对话（其他舞台指令等）
    Unrecognized,
    /// 立绘切换既没有 `-motion=` 也没有 `-expression=`
    FigureChangeWithoutVisual,
    /// 立绘切换没有 `-id=`
    FigureChangeWithoutId,
    /// 对话行只有一个 token
    DialogueTooShort,
    /// 对话行没有 `-figureId=` 参数 token
    DialogueWithoutFigureId,
    /// 对话引用的角色此前没有出现过
    UnknownFigure { id: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized => write!(f, "未识别的行，已忽略"),
            Self::FigureChangeWithoutVisual => {
                write!(f, "立绘切换缺少 -motion= 或 -expression=，不记录")
            }
            Self::FigureChangeWithoutId => write!(f, "立绘切换缺少 -id=，不记录"),
            Self::DialogueTooShort => write!(f, "对话行缺少参数"),
            Self::DialogueWithoutFigureId => write!(f, "对话行缺少 -figureId= 参数"),
            Self::UnknownFigure { id } => write!(f, "角色 '{}' 尚未通过 changeFigure 登场", id),
        }
    }
}

/// 被跳过的行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 行在原始脚本中的位置（从 0 开始）
    pub step: usize,
    /// 去掉首尾空白后的内容
    pub line: String,
    /// 跳过原因
    pub reason: SkipReason,
}

/// 单行的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// 空行
    Blank,
    /// 更新了状态表中的某个角色
    FigureUpdated { id: String },
    /// 追加了一条对话记录（`index` 为其在输出序列中的位置）
    DialogueAppended { index: usize },
    /// 非空行被跳过
    Skipped(SkipReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_blank_lines() {
        assert_eq!(classify_line(""), LineKind::Ignorable);
        assert_eq!(classify_line("   \t  "), LineKind::Ignorable);
    }

    #[test]
    fn test_classify_trims_before_matching() {
        assert_eq!(
            classify_line("  changeFigure:a.json -id=A -motion=idle;  "),
            LineKind::FigureChange("changeFigure:a.json -id=A -motion=idle;")
        );
        assert_eq!(
            classify_line("\tAlice:Hi -figureId=A\r"),
            LineKind::Dialogue("Alice:Hi -figureId=A")
        );
    }

    #[test]
    fn test_figure_change_prefix_wins_over_figure_id() {
        assert!(matches!(
            classify_line("changeFigure:a.json -figureId=A"),
            LineKind::FigureChange(_)
        ));
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify_line("ChangeFigure:a.json -id=A"), LineKind::Ignorable);
        assert_eq!(classify_line("Alice:Hi -figureid=A"), LineKind::Ignorable);
    }

    #[test]
    fn test_other_directives_are_ignorable() {
        assert_eq!(classify_line("changeBg:room.png -next;"), LineKind::Ignorable);
        assert_eq!(classify_line("bgm:theme.mp3;"), LineKind::Ignorable);
    }
}
