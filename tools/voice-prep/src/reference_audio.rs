//! # 参考音频清单
//!
//! 扫描参考音频目录，生成按模型 / 声线 / 语气组织的清单。
//!
//! 目录约定（唯一支持的布局）：
//!
//! ```text
//! reference_audio/
//! └── <model>/
//!     └── <voice>/
//!         └── <tone>/
//!             ├── 01.wav
//!             └── 02.mp3
//! ```
//!
//! 不在第四层的文件、非音频文件一律忽略；没有任何音频的模型、声线、语气不出现在清单中。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

/// 支持的音频扩展名（小写）
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac"];

/// 单个音频文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRefPath {
    /// 绝对路径，使用 `/` 分隔
    pub path: String,
}

/// 某个语气下的音频
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRefTone {
    pub tone: String,
    pub paths: Vec<AudioRefPath>,
}

/// 某个声线下的语气列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRefVoice {
    #[serde(rename = "audioid")]
    pub audio_id: String,
    pub tones: Vec<AudioRefTone>,
}

/// 某个模型下的声线列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRefModel {
    pub model: String,
    #[serde(rename = "subdirs")]
    pub voices: Vec<AudioRefVoice>,
}

/// 全部模型的参考音频清单
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRefList {
    pub models: Vec<AudioRefModel>,
}

type ToneMap = BTreeMap<String, Vec<AudioRefPath>>;
type VoiceMap = BTreeMap<String, ToneMap>;

/// 是否是支持的音频文件（扩展名大小写不敏感）
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// 转为 `/` 分隔的绝对路径
fn normalize_path(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute.to_string_lossy().replace('\\', "/")
}

/// 扫描参考音频目录
pub fn build_reference_audio_list(root: &Path) -> anyhow::Result<AudioRefList> {
    if !root.is_dir() {
        bail!("参考音频目录不存在: {}", root.display());
    }

    let mut models: BTreeMap<String, VoiceMap> = BTreeMap::new();

    for entry in WalkDir::new(root)
        .min_depth(4)
        .max_depth(4)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_audio_file(path) {
            continue;
        }

        let relative = path.strip_prefix(root)?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let [model, voice, tone, _clip] = parts.as_slice() else {
            continue;
        };

        debug!(model = %model, voice = %voice, tone = %tone, path = %path.display(), "参考音频");
        models
            .entry(model.clone())
            .or_default()
            .entry(voice.clone())
            .or_default()
            .entry(tone.clone())
            .or_default()
            .push(AudioRefPath {
                path: normalize_path(path),
            });
    }

    let models = models
        .into_iter()
        .map(|(model, voices)| AudioRefModel {
            model,
            voices: voices
                .into_iter()
                .map(|(audio_id, tones)| AudioRefVoice {
                    audio_id,
                    tones: tones
                        .into_iter()
                        .map(|(tone, paths)| AudioRefTone { tone, paths })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(AudioRefList { models })
}

/// 扫描并保存清单，返回清单本身
pub fn save_reference_audio_list(root: &Path, output: &Path) -> anyhow::Result<AudioRefList> {
    let list = build_reference_audio_list(root)?;
    let json = serde_json::to_string_pretty(&list).context("参考音频清单序列化失败")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建输出目录失败: {}", parent.display()))?;
    }
    fs::write(output, json).with_context(|| format!("写入文件失败: {}", output.display()))?;

    Ok(list)
}

/// 清单中所有音频文件的数量
pub fn count_clips(list: &AudioRefList) -> usize {
    list.models
        .iter()
        .flat_map(|m| &m.voices)
        .flat_map(|v| &v.tones)
        .map(|t| t.paths.len())
        .sum()
}

/// 默认的清单输出位置
pub fn default_output_path() -> PathBuf {
    PathBuf::from("reference_audio_storage").join("reference_audio.json")
}
