//! 发布指标收集模块
//!
//! 基于 FlushMeta 收集和统计发布侧的运行指标。

use contracts::FlushMeta;
use metrics::{counter, gauge, histogram};

/// 从 FlushMeta 记录指标
///
/// 每次 `handle_output` 之后调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::record_flush_metrics;
///
/// sink.handle_output()?;
/// record_flush_metrics(sink.last_flush());
/// ```
pub fn record_flush_metrics(meta: &FlushMeta) {
    // 周期计数器
    counter!("vision_relay_cycles_total").increment(1);

    // 帧 ID (用于检测跳帧)
    gauge!("vision_relay_last_frame_id").set(meta.frame_id as f64);

    // 发布消息数 / 条目数
    counter!("vision_relay_messages_published_total").increment(meta.published as u64);
    histogram!("vision_relay_items_per_cycle").record(meta.items as f64);

    // 队列满丢弃
    if meta.queue_dropped > 0 {
        counter!("vision_relay_messages_queue_dropped_total").increment(meta.queue_dropped as u64);
    }

    // 转换丢弃 (畸形记录)
    if meta.conversion_dropped > 0 {
        counter!("vision_relay_records_malformed_total").increment(meta.conversion_dropped as u64);
    }

    // 未接线类别
    gauge!("vision_relay_unwired_categories").set(meta.unwired as f64);

    // 各类别计数
    for category in &meta.categories {
        counter!(
            "vision_relay_category_staged_total",
            "category" => category.as_str()
        )
        .increment(1);
    }
}

/// 记录通道队列深度
pub fn record_channel_queue_depth(topic: &str, depth: usize) {
    gauge!(
        "vision_relay_channel_queue_depth",
        "topic" => topic.to_string()
    )
    .set(depth as f64);
}

/// 发布指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct PublicationAggregator {
    /// 总周期数
    pub total_cycles: u64,

    /// 发布消息总数
    pub total_messages: u64,

    /// 发布条目总数
    pub total_items: u64,

    /// 队列满丢弃总数
    pub total_queue_dropped: u64,

    /// 转换丢弃总数
    pub total_malformed: u64,

    /// 含未接线类别的周期数
    pub cycles_with_unwired: u64,

    /// 每周期条目数统计
    pub items_stats: RunningStats,

    /// 各类别暂存次数
    pub category_counts: std::collections::HashMap<&'static str, u64>,
}

impl PublicationAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, meta: &FlushMeta) {
        self.total_cycles += 1;
        self.total_messages += meta.published as u64;
        self.total_items += meta.items as u64;
        self.total_queue_dropped += meta.queue_dropped as u64;
        self.total_malformed += meta.conversion_dropped as u64;

        if meta.unwired > 0 {
            self.cycles_with_unwired += 1;
        }

        self.items_stats.push(meta.items as f64);

        for category in &meta.categories {
            *self.category_counts.entry(category.as_str()).or_insert(0) += 1;
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let rate = |count: u64| {
            if self.total_cycles > 0 {
                count as f64 / self.total_cycles as f64 * 100.0
            } else {
                0.0
            }
        };

        MetricsSummary {
            total_cycles: self.total_cycles,
            total_messages: self.total_messages,
            total_items: self.total_items,
            total_queue_dropped: self.total_queue_dropped,
            total_malformed: self.total_malformed,
            unwired_rate: rate(self.cycles_with_unwired),
            items_per_cycle: StatsSummary::from(&self.items_stats),
            category_counts: self.category_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_cycles: u64,
    pub total_messages: u64,
    pub total_items: u64,
    pub total_queue_dropped: u64,
    pub total_malformed: u64,
    pub unwired_rate: f64,
    pub items_per_cycle: StatsSummary,
    pub category_counts: std::collections::HashMap<&'static str, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Publication Metrics Summary ===")?;
        writeln!(f, "Total cycles: {}", self.total_cycles)?;
        writeln!(f, "Messages published: {}", self.total_messages)?;
        writeln!(f, "Items published: {}", self.total_items)?;
        writeln!(f, "Queue-dropped messages: {}", self.total_queue_dropped)?;
        writeln!(f, "Malformed records dropped: {}", self.total_malformed)?;
        writeln!(
            f,
            "Cycles with unwired categories: {:.2}%",
            self.unwired_rate
        )?;
        writeln!(f, "Items per cycle: {}", self.items_per_cycle)?;

        if !self.category_counts.is_empty() {
            writeln!(f, "Category staged counts:")?;
            let mut entries: Vec<_> = self.category_counts.iter().collect();
            entries.sort();
            for (category, count) in entries {
                writeln!(f, "  {}: {}", category, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Category;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = PublicationAggregator::new();

        let meta = FlushMeta {
            frame_id: 10,
            stamp_secs: 0.4,
            published: 3,
            queue_dropped: 1,
            unwired: 1,
            items: 7,
            conversion_dropped: 2,
            categories: vec![Category::Objects, Category::Faces, Category::Landmarks],
        };

        aggregator.update(&meta);

        assert_eq!(aggregator.total_cycles, 1);
        assert_eq!(aggregator.total_messages, 3);
        assert_eq!(aggregator.total_items, 7);
        assert_eq!(aggregator.total_queue_dropped, 1);
        assert_eq!(aggregator.total_malformed, 2);
        assert_eq!(aggregator.cycles_with_unwired, 1);
        assert_eq!(aggregator.category_counts.get("objects"), Some(&1));
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = PublicationAggregator::new();
        aggregator.update(&FlushMeta {
            frame_id: 1,
            published: 2,
            items: 4,
            ..FlushMeta::default()
        });

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Total cycles: 1"));
        assert!(output.contains("Messages published: 2"));
    }
}
