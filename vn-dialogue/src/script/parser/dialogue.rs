//! # 对话行
//!
//! `<name>:<text> ... -figureId=<id> ...` 或 `<text> ... -figureId=<id> ...`
//!
//! 与状态表中该角色的最新快照合并，写回状态表并追加到输出序列。

use crate::figure::{DialogueRecord, FigureTable};
use crate::script::line::SkipReason;

use super::helpers::{FIGURE_ID_PREFIX, dialogue_payload, find_option, split_speaker, strip_terminator};

/// 解析对话行，合并角色状态后追加一条记录
///
/// 成功时返回新记录在 `records` 中的位置。同一角色的每句台词都会追加一条新记录，
/// 不会回头修改之前的记录。
pub fn apply_dialogue(
    table: &mut FigureTable,
    records: &mut Vec<DialogueRecord>,
    line: &str,
    step: usize,
) -> Result<usize, SkipReason> {
    let content = strip_terminator(line);
    let tokens: Vec<&str> = content.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(SkipReason::DialogueTooShort);
    }

    let id = find_option(&tokens, FIGURE_ID_PREFIX).ok_or(SkipReason::DialogueWithoutFigureId)?;
    let (name, text) = split_speaker(dialogue_payload(content));

    let Some(known) = table.get(id) else {
        return Err(SkipReason::UnknownFigure { id: id.to_string() });
    };

    let mut figure = known.clone();
    figure.text = text.to_string();
    figure.step = step;
    // 没写名字时沿用上一次的说话者名字
    if !name.is_empty() {
        figure.name = name.to_string();
    }

    table.insert(figure.clone());
    records.push(figure);
    Ok(records.len() - 1)
}
