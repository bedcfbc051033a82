//! # 语言检测
//!
//! 按字符类别占比粗略判断台词语言，用于填写合成请求的 `text_lang`。
//!
//! - 汉字（含扩展区、兼容区）计为中文
//! - 平假名、片假名计为日文
//! - ASCII 字母计为英文
//! - 其余字符（空白、标点、数字）只计入总数
//!
//! 某一类占比超过 60% 即为该语言；否则至少两类各超过 20% 时为混合，其余为未知。
//! 汉字占多数的日文句子会被判为中文。

use std::fmt;

/// 主导占比阈值（百分比）
const DOMINANT_PERCENT: f64 = 60.0;
/// 混合语言中每种语言的最低占比（百分比）
const MIXED_PERCENT: f64 = 20.0;

/// 文本的主要语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextLanguage {
    Chinese,
    Japanese,
    English,
    Mixed,
    Unknown,
}

impl TextLanguage {
    /// 语言代码：`zh` / `ja` / `en` / `mixed` / `unknown`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chinese => "zh",
            Self::Japanese => "ja",
            Self::English => "en",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }

    /// 合成服务接受的 `text_lang`，无法确定时交给服务端自动识别
    pub fn tts_lang(self) -> &'static str {
        match self {
            Self::Chinese => "zh",
            Self::Japanese => "ja",
            Self::English => "en",
            Self::Mixed | Self::Unknown => "auto",
        }
    }
}

impl fmt::Display for TextLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 各语言字符占全部字符的百分比
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LanguageShares {
    pub chinese: f64,
    pub japanese: f64,
    pub english: f64,
}

fn is_han(c: char) -> bool {
    matches!(
        c as u32,
        0x2E80..=0x2FDF
            | 0x3005
            | 0x3007
            | 0x3021..=0x3029
            | 0x3038..=0x303B
            | 0x3300..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0x20000..=0x2A6DF
            | 0x2A700..=0x2EBEF
            | 0x2F800..=0x2FA1F
            | 0x30000..=0x3134F
    )
}

fn is_kana(c: char) -> bool {
    matches!(c as u32, 0x3040..=0x30FF)
}

/// 统计各语言字符占比，空文本全部为 0
pub fn language_shares(text: &str) -> LanguageShares {
    let (mut chinese, mut japanese, mut english, mut total) = (0usize, 0usize, 0usize, 0usize);

    for c in text.chars() {
        if is_han(c) {
            chinese += 1;
        } else if is_kana(c) {
            japanese += 1;
        } else if c.is_ascii_alphabetic() {
            english += 1;
        }
        total += 1;
    }

    if total == 0 {
        return LanguageShares::default();
    }

    let percent = |count: usize| count as f64 / total as f64 * 100.0;
    LanguageShares {
        chinese: percent(chinese),
        japanese: percent(japanese),
        english: percent(english),
    }
}

/// 检测文本的主要语言
pub fn detect_language(text: &str) -> TextLanguage {
    if text.is_empty() {
        return TextLanguage::Unknown;
    }

    let shares = language_shares(text);
    if shares.chinese > DOMINANT_PERCENT {
        return TextLanguage::Chinese;
    }
    if shares.japanese > DOMINANT_PERCENT {
        return TextLanguage::Japanese;
    }
    if shares.english > DOMINANT_PERCENT {
        return TextLanguage::English;
    }

    let present = [shares.chinese, shares.japanese, shares.english]
        .into_iter()
        .filter(|&p| p > MIXED_PERCENT)
        .count();
    if present >= 2 {
        TextLanguage::Mixed
    } else {
        TextLanguage::Unknown
    }
}
