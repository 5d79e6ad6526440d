//! # Publication
//!
//! 发布模块。
//!
//! 负责：
//! - 按类别暂存当前帧的推理结果
//! - 转换为外发消息结构 (header + 有序条目列表)
//! - Flush 时 fan-out 到各类别通道，不阻塞推理主链路

pub mod channel;
pub mod convert;
pub mod metrics;
pub mod sinks;

pub use channel::{ChannelHandle, ChannelSet};
pub use contracts::{ChannelMessage, FlushMeta, OutputSink};
pub use metrics::{ChannelMetrics, MetricsSnapshot};
pub use sinks::{LogOutputSink, TopicPublicationSink};
