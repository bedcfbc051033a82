//! 脚本读取与角色台词文件的读写。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::{debug, info};
use vn_dialogue::{
    DialogueParser, DialogueRecord, ParsedScript, export::EXPORT_EXTENSION, export_file_name,
    group_by_figure, records_from_json, records_to_json,
};

/// 读取脚本文件并解析
pub fn parse_script_file(path: &Path) -> anyhow::Result<ParsedScript> {
    let content =
        fs::read_to_string(path).with_context(|| format!("读取脚本失败: {}", path.display()))?;

    let parsed = DialogueParser::parse_text(&content);
    info!(
        script = %path.display(),
        records = parsed.records.len(),
        figures = parsed.figures.len(),
        skipped = parsed.skipped.len(),
        "脚本解析完成"
    );
    Ok(parsed)
}

/// 按角色导出到 `<out_dir>/<id>.json`，返回写入的文件列表
pub fn export_figures(records: &[DialogueRecord], out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("创建输出目录失败: {}", out_dir.display()))?;

    let mut written = Vec::new();
    for (id, group) in group_by_figure(records) {
        let path = out_dir.join(export_file_name(&id));
        write_figure_file(&path, &group)?;
        debug!(figure = %id, count = group.len(), "导出角色台词");
        written.push(path);
    }
    Ok(written)
}

/// 列出目录下的角色台词文件（不含扩展名，按名字排序）
pub fn list_figure_files(dir: &Path) -> anyhow::Result<Vec<String>> {
    if !dir.is_dir() {
        bail!("目录不存在: {}", dir.display());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("读取目录失败: {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXPORT_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// 读取一个角色台词文件
pub fn read_figure_file(path: &Path) -> anyhow::Result<Vec<DialogueRecord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("读取文件失败: {}", path.display()))?;
    records_from_json(&content).with_context(|| format!("解析失败: {}", path.display()))
}

/// 写入一个角色台词文件
pub fn write_figure_file(path: &Path, records: &[DialogueRecord]) -> anyhow::Result<()> {
    let json = records_to_json(records)?;
    fs::write(path, json).with_context(|| format!("写入文件失败: {}", path.display()))
}
