//! # Tone 模块
//!
//! 语气（情绪）标签的合并。
//!
//! 语气标签由外部分类服务给出，本模块只负责：
//! - 定义分类服务的接口 [`ToneClassifier`]
//! - 按 step 把标签合并回原始记录
//! - 分批调用分类服务

use std::collections::HashMap;

use crate::error::ToneError;
use crate::figure::DialogueRecord;

/// 语气分类服务
///
/// 输入一批记录，返回带 `emotion` 的记录。返回的记录只需要 `step` 与 `emotion` 有效。
pub trait ToneClassifier {
    fn classify(&self, batch: &[DialogueRecord]) -> Result<Vec<DialogueRecord>, ToneError>;
}

/// 按 step 合并语气标签
///
/// - 只合并非空标签
/// - 同一 step 出现多次时后者覆盖前者
/// - 返回结果中没有出现的 step 保留原标签
///
/// 返回被更新的记录数。
pub fn merge_tone_labels(records: &mut [DialogueRecord], labeled: &[DialogueRecord]) -> usize {
    let step_to_emotion: HashMap<usize, &str> = labeled
        .iter()
        .filter(|r| r.has_emotion())
        .map(|r| (r.step, r.emotion.as_str()))
        .collect();

    let mut updated = 0;
    for record in records.iter_mut() {
        if let Some(emotion) = step_to_emotion.get(&record.step) {
            record.emotion = emotion.to_string();
            updated += 1;
        }
    }
    updated
}

/// 分批调用分类服务并合并结果
///
/// `batch_size` 为 0 时整体作为一批。没有记录时不调用分类服务，直接返回 0。
/// 任意一批失败即返回错误，之前批次已合并的标签保留在 `records` 中。
pub fn annotate_tones<C>(
    classifier: &C,
    records: &mut [DialogueRecord],
    batch_size: usize,
) -> Result<usize, ToneError>
where
    C: ToneClassifier + ?Sized,
{
    if records.is_empty() {
        return Ok(0);
    }

    let batch_size = if batch_size == 0 { records.len() } else { batch_size };

    let mut updated = 0;
    for batch in records.chunks_mut(batch_size) {
        let labeled = classifier.classify(batch)?;
        updated += merge_tone_labels(batch, &labeled);
    }
    Ok(updated)
}
