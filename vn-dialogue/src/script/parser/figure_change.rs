//! # 立绘切换指令
//!
//! `changeFigure:<model> [-id=<id>] [-motion=<motion>] [-expression=<expression>]`
//!
//! 只改状态表，不产生输出记录。

use crate::figure::{DialogueRecord, FigureTable};
use crate::script::line::SkipReason;

use super::helpers::{
    EXPRESSION_PREFIX, FIGURE_CHANGE_PREFIX, ID_PREFIX, MOTION_PREFIX, has_option,
    strip_terminator,
};

/// 解析立绘切换指令并写入状态表
///
/// 成功时返回被更新的角色 id。新快照整体替换该 id 的旧快照，
/// 本行没有给出的字段保持为空。
pub fn apply_figure_change(
    table: &mut FigureTable,
    line: &str,
    step: usize,
) -> Result<String, SkipReason> {
    let tokens: Vec<&str> = strip_terminator(line).split_whitespace().collect();

    // 既不换动作也不换表情的切换不值得记录
    if !has_option(&tokens, MOTION_PREFIX) && !has_option(&tokens, EXPRESSION_PREFIX) {
        return Err(SkipReason::FigureChangeWithoutVisual);
    }

    let mut figure = DialogueRecord::default().with_step(step);
    for token in &tokens {
        if let Some(model) = token.strip_prefix(FIGURE_CHANGE_PREFIX) {
            figure.model = model.to_string();
        } else if let Some(id) = token.strip_prefix(ID_PREFIX) {
            figure.id = id.to_string();
        } else if let Some(motion) = token.strip_prefix(MOTION_PREFIX) {
            figure.motion = motion.to_string();
        } else if let Some(expression) = token.strip_prefix(EXPRESSION_PREFIX) {
            figure.expression = expression.to_string();
        }
        // 其他参数（-next、-transform= 等）忽略
    }

    if figure.id.is_empty() {
        return Err(SkipReason::FigureChangeWithoutId);
    }

    let id = figure.id.clone();
    table.insert(figure);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_directive() {
        let mut table = FigureTable::new();
        let id = apply_figure_change(
            &mut table,
            "changeFigure:anon/model.json -id=anon -motion=idle01 -expression=smile;",
            4,
        )
        .unwrap();

        assert_eq!(id, "anon");
        let figure = table.get("anon").unwrap();
        assert_eq!(figure.model, "anon/model.json");
        assert_eq!(figure.motion, "idle01");
        assert_eq!(figure.expression, "smile");
        assert_eq!(figure.step, 4);
        assert!(figure.name.is_empty());
        assert!(figure.text.is_empty());
    }

    #[test]
    fn test_requires_motion_or_expression() {
        let mut table = FigureTable::new();
        let result = apply_figure_change(&mut table, "changeFigure:m.json -id=A -left;", 0);
        assert_eq!(result, Err(SkipReason::FigureChangeWithoutVisual));
        assert!(table.is_empty());
    }

    #[test]
    fn test_motion_must_be_a_token_prefix() {
        // `-motion=` 出现在 token 中间不算
        let mut table = FigureTable::new();
        let result = apply_figure_change(&mut table, "changeFigure:x-motion=a.json -id=A", 0);
        assert_eq!(result, Err(SkipReason::FigureChangeWithoutVisual));
    }

    #[test]
    fn test_without_id_has_no_effect() {
        let mut table = FigureTable::new();
        let result = apply_figure_change(&mut table, "changeFigure:m.json -motion=idle", 0);
        assert_eq!(result, Err(SkipReason::FigureChangeWithoutId));

        let result = apply_figure_change(&mut table, "changeFigure:m.json -id= -motion=idle", 0);
        assert_eq!(result, Err(SkipReason::FigureChangeWithoutId));
        assert!(table.is_empty());
    }

    #[test]
    fn test_replaces_instead_of_merging() {
        let mut table = FigureTable::new();
        apply_figure_change(&mut table, "changeFigure:m.json -id=A -motion=idle -expression=smile", 0)
            .unwrap();
        apply_figure_change(&mut table, "changeFigure:m2.json -id=A -expression=angry", 1).unwrap();

        let figure = table.get("A").unwrap();
        assert_eq!(figure.model, "m2.json");
        assert_eq!(figure.expression, "angry");
        assert!(figure.motion.is_empty());
    }

    #[test]
    fn test_unknown_options_are_ignored() {
        let mut table = FigureTable::new();
        apply_figure_change(
            &mut table,
            "changeFigure:m.json -id=A -transform={\"x\":1} -motion=walk -zIndex=2 -next;",
            0,
        )
        .unwrap();
        assert_eq!(table.get("A").unwrap().motion, "walk");
    }
}
