//! # Figure 模块
//!
//! 立绘角色（figure）的状态快照与按 id 索引的状态表。
//!
//! ## 设计原则
//!
//! - 状态表只属于一次解析过程，随解析器创建、随解析器丢弃
//! - 同一 id 后写覆盖先写
//! - 未出现过的 id 没有默认状态

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 对话记录
///
/// 既是状态表中某个角色的最新快照，也是解析输出序列中的一条记录，
/// 两者结构完全相同。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueRecord {
    /// 说话者名字（对话行未写名字时沿用上一次的名字）
    pub name: String,
    /// 角色 id
    pub id: String,
    /// 台词
    pub text: String,
    /// 所在行在原始脚本中的位置（从 0 开始）
    pub step: usize,
    /// 动作
    pub motion: String,
    /// 表情
    pub expression: String,
    /// 模型
    pub model: String,
    /// 语气标签，由外部分类服务给出
    #[serde(skip_serializing_if = "String::is_empty")]
    pub emotion: String,
}

impl DialogueRecord {
    /// 创建只带 id 的空记录
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// 设置模型
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// 设置动作
    pub fn with_motion(mut self, motion: impl Into<String>) -> Self {
        self.motion = motion.into();
        self
    }

    /// 设置表情
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    /// 设置 step
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    /// 是否已有语气标签
    pub fn has_emotion(&self) -> bool {
        !self.emotion.is_empty()
    }
}

/// 角色状态表
///
/// id → 最新快照。插入顺序无意义。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FigureTable {
    figures: HashMap<String, DialogueRecord>,
}

impl FigureTable {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 id 查找
    pub fn get(&self, id: &str) -> Option<&DialogueRecord> {
        self.figures.get(id)
    }

    /// 写入快照，覆盖同 id 的旧值
    pub fn insert(&mut self, record: DialogueRecord) -> Option<DialogueRecord> {
        self.figures.insert(record.id.clone(), record)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.figures.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    /// 按 id 排序后的快照列表
    pub fn sorted(&self) -> Vec<&DialogueRecord> {
        let mut figures: Vec<_> = self.figures.values().collect();
        figures.sort_by(|a, b| a.id.cmp(&b.id));
        figures
    }
}
