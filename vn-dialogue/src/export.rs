//! # Export 模块
//!
//! 按角色分组对话记录，并在记录与 JSON 数组之间转换。
//!
//! 文件读写由调用方负责，这里只处理内存中的数据。

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::ExportError;
use crate::figure::DialogueRecord;

/// 导出文件的扩展名
pub const EXPORT_EXTENSION: &str = "json";

/// 按角色 id 分组
///
/// 组内保持原有顺序，组按 id 排序。
pub fn group_by_figure(records: &[DialogueRecord]) -> BTreeMap<String, Vec<DialogueRecord>> {
    let mut groups: BTreeMap<String, Vec<DialogueRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.id.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// 序列化为四空格缩进的 JSON 数组
pub fn records_to_json(records: &[DialogueRecord]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records
        .serialize(&mut serializer)
        .map_err(|e| ExportError::SerializationFailed {
            message: e.to_string(),
        })?;

    String::from_utf8(buf).map_err(|e| ExportError::SerializationFailed {
        message: e.to_string(),
    })
}

/// 从 JSON 数组解析
pub fn records_from_json(json: &str) -> Result<Vec<DialogueRecord>, ExportError> {
    serde_json::from_str(json).map_err(|e| ExportError::DeserializationFailed {
        message: e.to_string(),
    })
}

/// 角色 id 对应的导出文件名
pub fn export_file_name(id: &str) -> String {
    format!("{}.{}", id, EXPORT_EXTENSION)
}
