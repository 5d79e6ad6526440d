//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> 通道 -> sink 的 e2e 测试
//! - 发布协议属性验证

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(contracts::Category::ALL.len(), 12);
    }
}

#[cfg(test)]
mod e2e_tests {
    use bytes::Bytes;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        BoundingBox, Category, ChannelMessage, ContractError, FrameContext, LandmarksResult,
        ObjectDetection, OutputSink, Point2D, ResultBatch,
    };
    use observability::PublicationAggregator;
    use publication::{ChannelSet, LogOutputSink, TopicPublicationSink};
    use tokio::sync::mpsc;

    const PIPELINE_TOML: &str = r#"
[pipeline]
name = "front_cam"

[[channels]]
category = "objects"
queue_capacity = 64

[[channels]]
category = "faces"
queue_capacity = 64

[[channels]]
category = "landmarks"
queue_capacity = 64
"#;

    fn frame(frame_id: u64) -> FrameContext {
        FrameContext {
            frame_id,
            stamp_secs: frame_id as f64 / 25.0,
            width: 640,
            height: 480,
            data: Bytes::from(vec![0u8; 640 * 480 * 3]),
        }
    }

    fn objects(count: usize) -> ResultBatch {
        ResultBatch::Objects(
            (0..count)
                .map(|i| ObjectDetection {
                    bbox: BoundingBox::new(10 * i as i32, 10, 40, 40),
                    label: format!("object_{i}"),
                    confidence: 0.8,
                })
                .collect(),
        )
    }

    fn landmarks() -> ResultBatch {
        ResultBatch::Landmarks(vec![LandmarksResult {
            points: vec![
                Point2D { x: 12.0, y: 20.0 },
                Point2D { x: 30.0, y: 20.0 },
                Point2D { x: 21.0, y: 34.0 },
            ],
        }])
    }

    /// End-to-end test: config string -> channels -> sink -> receivers
    ///
    /// 验证完整的数据流：
    /// 1. ConfigLoader 解析接线配置
    /// 2. ChannelSet 按蓝图建立通道
    /// 3. TopicPublicationSink 按帧聚合并发布
    #[tokio::test]
    async fn test_e2e_config_to_channels() {
        let blueprint = ConfigLoader::load_from_str(PIPELINE_TOML, ConfigFormat::Toml).unwrap();
        let (channels, mut receivers) = ChannelSet::from_blueprint(&blueprint);
        let mut sink = TopicPublicationSink::new(channels);

        // Collect messages in the background, like a messaging substrate would
        let mut objects_rx = receivers.remove(&Category::Objects).unwrap();
        let collector = tokio::spawn(async move {
            let mut messages: Vec<ChannelMessage> = Vec::new();
            while let Some(message) = objects_rx.recv().await {
                messages.push(message);
            }
            messages
        });

        let total_frames = 10u64;
        for frame_id in 0..total_frames {
            sink.feed_frame(frame(frame_id)).unwrap();
            sink.accept(objects(2)).unwrap();
            // Landmarks only every other frame; faces never
            if frame_id % 2 == 0 {
                sink.accept(landmarks()).unwrap();
            }
            sink.handle_output().unwrap();
        }

        // Drop the sink so the channel closes and the collector finishes
        drop(sink);

        let result =
            tokio::time::timeout(std::time::Duration::from_secs(2), collector).await;
        assert!(result.is_ok(), "Collector timed out");
        let messages = result.unwrap().unwrap();

        assert_eq!(messages.len(), total_frames as usize);
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(message.header.frame_id, i as u64);
            assert_eq!(message.body.len(), 2);
        }

        // Landmarks channel saw only even frames
        let landmarks_rx = receivers.get_mut(&Category::Landmarks).unwrap();
        let mut landmark_frames = Vec::new();
        while let Ok(message) = landmarks_rx.try_recv() {
            landmark_frames.push(message.header.frame_id);
        }
        assert_eq!(landmark_frames, vec![0, 2, 4, 6, 8]);

        // Faces channel never fired
        let faces_rx = receivers.get_mut(&Category::Faces).unwrap();
        assert!(faces_rx.try_recv().is_err());
    }

    /// Headers of all categories within one cycle are identical
    #[tokio::test]
    async fn test_e2e_header_correlation() {
        let blueprint = ConfigLoader::load_from_str(PIPELINE_TOML, ConfigFormat::Toml).unwrap();
        let (channels, mut receivers) = ChannelSet::from_blueprint(&blueprint);
        let mut sink = TopicPublicationSink::new(channels);

        sink.feed_frame(frame(7)).unwrap();
        sink.accept(objects(1)).unwrap();
        sink.accept(landmarks()).unwrap();
        sink.accept(ResultBatch::Faces(vec![])).unwrap();
        sink.handle_output().unwrap();

        let mut headers = Vec::new();
        for category in [Category::Objects, Category::Landmarks, Category::Faces] {
            let rx = receivers.get_mut(&category).unwrap();
            headers.push(rx.try_recv().unwrap().header);
        }

        assert!(headers.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(headers[0].frame_id, 7);
    }

    /// Driver bug: accept before feed_frame must fail fast without publishing
    #[tokio::test]
    async fn test_e2e_precall_violation_publishes_nothing() {
        let blueprint = ConfigLoader::load_from_str(PIPELINE_TOML, ConfigFormat::Toml).unwrap();
        let (channels, mut receivers) = ChannelSet::from_blueprint(&blueprint);
        let mut sink = TopicPublicationSink::new(channels);

        let err = sink.accept(objects(1)).unwrap_err();
        assert!(matches!(err, ContractError::PrecallViolation { .. }));

        sink.handle_output().unwrap();
        let rx = receivers.get_mut(&Category::Objects).unwrap();
        assert!(rx.try_recv().is_err());
    }

    /// FlushMeta flows into the aggregator across a live stream
    #[tokio::test]
    async fn test_e2e_aggregator_summary() {
        let blueprint = ConfigLoader::load_from_str(PIPELINE_TOML, ConfigFormat::Toml).unwrap();
        let (channels, _receivers) = ChannelSet::from_blueprint(&blueprint);
        let mut sink = TopicPublicationSink::new(channels);
        let mut aggregator = PublicationAggregator::new();

        for frame_id in 0..5 {
            sink.feed_frame(frame(frame_id)).unwrap();
            sink.accept(objects(3)).unwrap();
            // Unwired category: staged, skipped at flush
            sink.accept(ResultBatch::Emotions(vec![])).unwrap();
            sink.handle_output().unwrap();
            aggregator.update(sink.last_flush());
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_cycles, 5);
        assert_eq!(summary.total_messages, 5);
        assert_eq!(summary.total_items, 15);
        assert!((summary.unwired_rate - 100.0).abs() < 1e-9);
        assert_eq!(summary.category_counts.get("objects"), Some(&5));
        assert!((summary.items_per_cycle.mean - 3.0).abs() < 1e-9);
    }

    /// Both sinks driven through the same cycle by one driver
    #[tokio::test]
    async fn test_e2e_sink_fanout() {
        let mut channels = ChannelSet::new("front_cam");
        let mut objects_rx = channels.wire(Category::Objects, 8);
        let mut topic_sink = TopicPublicationSink::new(channels);
        let mut log_sink = LogOutputSink::new("debug_log");

        let sinks: &mut [&mut dyn OutputSink] = &mut [&mut topic_sink, &mut log_sink];
        for sink in sinks.iter_mut() {
            sink.feed_frame(frame(1)).unwrap();
            sink.accept(objects(1)).unwrap();
            sink.handle_output().unwrap();
        }

        assert_eq!(objects_rx.try_recv().unwrap().header.frame_id, 1);
    }

    /// Subset sink: unsupported categories error instead of dropping silently
    #[tokio::test]
    async fn test_e2e_subset_sink_rejects_unsupported() {
        /// Sink that only understands object boxes
        struct ObjectsOnlySink {
            loaded: bool,
        }

        impl OutputSink for ObjectsOnlySink {
            fn name(&self) -> &str {
                "objects_only"
            }

            fn supports(&self, category: Category) -> bool {
                category == Category::Objects
            }

            fn feed_frame(&mut self, _frame: FrameContext) -> Result<(), ContractError> {
                self.loaded = true;
                Ok(())
            }

            fn accept(&mut self, results: ResultBatch) -> Result<(), ContractError> {
                let category = results.category();
                if !self.loaded {
                    return Err(ContractError::PrecallViolation { category });
                }
                if !self.supports(category) {
                    return Err(ContractError::unsupported_category(self.name(), category));
                }
                Ok(())
            }

            fn handle_output(&mut self) -> Result<(), ContractError> {
                self.loaded = false;
                Ok(())
            }
        }

        let mut sink = ObjectsOnlySink { loaded: false };
        sink.feed_frame(frame(1)).unwrap();
        sink.accept(objects(1)).unwrap();

        let err = sink.accept(landmarks()).unwrap_err();
        assert!(matches!(
            err,
            ContractError::UnsupportedCategory {
                category: Category::Landmarks,
                ..
            }
        ));

        sink.handle_output().unwrap();
    }

    /// Slow consumer: fire-and-forget publication never blocks the driver
    #[tokio::test]
    async fn test_e2e_full_queue_does_not_block() {
        let mut channels = ChannelSet::new("front_cam");
        // Keep the receiver alive but never drain it
        let _objects_rx: mpsc::Receiver<ChannelMessage> = channels.wire(Category::Objects, 2);
        let mut sink = TopicPublicationSink::new(channels);

        let mut dropped_total = 0u32;
        for frame_id in 0..10 {
            sink.feed_frame(frame(frame_id)).unwrap();
            sink.accept(objects(1)).unwrap();
            sink.handle_output().unwrap();
            dropped_total += sink.last_flush().queue_dropped;
        }

        // Queue holds 2; everything past that was dropped, not waited on
        assert_eq!(dropped_total, 8);
        let metrics = sink.channels().metrics();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].1.dropped_count, 8);
    }
}
