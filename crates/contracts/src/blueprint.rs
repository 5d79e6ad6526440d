//! PublicationBlueprint - Config Loader 输出
//!
//! 描述发布侧的完整配置：流水线命名空间 + 各类别的通道接线。

use serde::{Deserialize, Serialize};

use crate::Category;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的发布配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 流水线设置
    pub pipeline: PipelineConfig,

    /// 通道接线列表 (未列出的类别在 flush 时静默跳过)
    pub channels: Vec<ChannelConfig>,
}

/// 流水线设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 流水线名称，仅用于通道命名空间 (e.g., "front_cam")
    pub name: String,
}

/// 单个类别的通道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// 结果类别
    pub category: Category,

    /// 主题覆盖 (默认 `/<pipeline>/<suffix>`)
    #[serde(default)]
    pub topic: Option<String>,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    16
}

impl PublicationBlueprint {
    /// Resolve the topic name for one channel entry
    pub fn topic_for(&self, channel: &ChannelConfig) -> String {
        match &channel.topic {
            Some(topic) => topic.clone(),
            None => format!("/{}/{}", self.pipeline.name, channel.category.topic_suffix()),
        }
    }
}
