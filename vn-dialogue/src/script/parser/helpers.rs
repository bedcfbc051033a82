//! # 辅助解析函数
//!
//! 手写的字符串切分辅助函数，无正则依赖。

/// 立绘切换指令前缀，后接模型名
pub const FIGURE_CHANGE_PREFIX: &str = "changeFigure:";
/// 对话行引用角色的参数前缀
pub const FIGURE_ID_PREFIX: &str = "-figureId=";
/// 立绘切换指令的 id 参数前缀
pub const ID_PREFIX: &str = "-id=";
/// 动作参数前缀
pub const MOTION_PREFIX: &str = "-motion=";
/// 表情参数前缀
pub const EXPRESSION_PREFIX: &str = "-expression=";

/// 去掉一个可选的行尾 `;`
///
/// 输入: `"changeFigure:a.json -id=A;"`
/// 输出: `"changeFigure:a.json -id=A"`
pub fn strip_terminator(line: &str) -> &str {
    line.strip_suffix(';').unwrap_or(line)
}

/// 在 token 列表中查找第一个带指定前缀的参数，返回前缀之后的值
///
/// 输入: `["Alice:Hi", "-figureId=A"]`, `"-figureId="`
/// 输出: `Some("A")`
pub fn find_option<'a>(tokens: &[&'a str], prefix: &str) -> Option<&'a str> {
    tokens.iter().find_map(|t| t.strip_prefix(prefix))
}

/// 是否存在以指定前缀开头的 token
pub fn has_option(tokens: &[&str], prefix: &str) -> bool {
    tokens.iter().any(|t| t.starts_with(prefix))
}

/// 截取对话行的台词部分：第一个参数 token 之前的全部文本
///
/// 参数 token 指以 `-` 开头的 token，带不带 `=` 都算。
/// 台词内部的空白保持原样。
///
/// 输入: `"Alice:Hi there -next -figureId=A"`
/// 输出: `"Alice:Hi there"`
pub fn dialogue_payload(line: &str) -> &str {
    let mut at_token_start = true;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            at_token_start = true;
            continue;
        }
        if at_token_start && c == '-' {
            return line[..i].trim();
        }
        at_token_start = false;
    }
    line.trim()
}

/// 拆分说话者与台词，只按第一个 `:` 拆分
///
/// - `"Alice:Hello"` → `("Alice", "Hello")`
/// - `"Alice:a:b"` → `("Alice", "a:b")`
/// - `"Hello"` → `("", "Hello")`
pub fn split_speaker(payload: &str) -> (&str, &str) {
    match payload.split_once(':') {
        Some((name, text)) => (name, text),
        None => ("", payload),
    }
}
