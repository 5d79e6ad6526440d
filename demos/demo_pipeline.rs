//! Publication Pipeline Demo
//!
//! Demonstrates reading a single configuration file, wiring category
//! channels, and driving the publication sink through a synthetic stream of
//! per-frame inference results.
//!
//! Run with: cargo run --bin demo_pipeline [config_path]

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use config_loader::{ConfigFormat, ConfigLoader};
use contracts::{
    AgeGenderResult, BoundingBox, FrameContext, LandmarksResult, ObjectDetection, OutputSink,
    Point2D, PublicationBlueprint, ResultBatch,
};
use observability::PublicationAggregator;
use publication::{ChannelSet, TopicPublicationSink};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_CONFIG: &str = r#"
[pipeline]
name = "front_cam"

[[channels]]
category = "objects"
queue_capacity = 64

[[channels]]
category = "faces"
queue_capacity = 64

[[channels]]
category = "age_gender"
queue_capacity = 64

[[channels]]
category = "landmarks"
queue_capacity = 64
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Publication Pipeline Demo");

    let blueprint = load_blueprint()?;
    info!(
        pipeline = %blueprint.pipeline.name,
        channels = blueprint.channels.len(),
        "Blueprint loaded"
    );

    // ==== Stage 1: Wire channels from config ====
    let (channels, receivers) = ChannelSet::from_blueprint(&blueprint);
    for (category, topic) in blueprint
        .channels
        .iter()
        .map(|c| (c.category, blueprint.topic_for(c)))
    {
        info!(category = %category, topic = %topic, "Channel wired");
    }

    // ==== Stage 2: Attach consumers (stand-in for the messaging substrate) ====
    let mut consumer_handles = Vec::new();
    for (category, mut rx) in receivers {
        consumer_handles.push(tokio::spawn(async move {
            let mut received = 0u64;
            while let Some(message) = rx.recv().await {
                received += 1;
                info!(
                    category = %category,
                    frame_id = message.header.frame_id,
                    items = message.body.len(),
                    "Message received"
                );
            }
            (category, received)
        }));
    }

    // ==== Stage 3: Drive the sink, one cycle per frame ====
    let mut sink = TopicPublicationSink::new(channels);
    let mut aggregator = PublicationAggregator::new();
    let total_frames = 20u64;

    info!(total_frames, "Driving publication cycles");

    for frame_id in 0..total_frames {
        sink.feed_frame(synthetic_frame(frame_id))?;

        // Object detector runs every frame
        sink.accept(synthetic_objects(frame_id))?;

        // Face-derived models run on every other frame
        if frame_id % 2 == 0 {
            sink.accept(synthetic_faces(frame_id))?;
            sink.accept(synthetic_age_gender(frame_id))?;
            sink.accept(synthetic_landmarks())?;
        }

        sink.handle_output()?;

        // Record metrics from FlushMeta
        observability::record_flush_metrics(sink.last_flush());
        aggregator.update(sink.last_flush());
    }

    // ==== Stage 4: Graceful Shutdown ====
    info!("Shutting down...");

    for (topic, snapshot) in sink.channels().metrics() {
        observability::record_channel_queue_depth(&topic, snapshot.queue_len);
        info!(
            topic = %topic,
            published = snapshot.published_count,
            dropped = snapshot.dropped_count,
            "Channel totals"
        );
    }

    drop(sink);

    for handle in consumer_handles {
        match tokio::time::timeout(Duration::from_secs(2), handle).await {
            Ok(Ok((category, received))) => {
                info!(category = %category, received, "Consumer finished");
            }
            Ok(Err(e)) => info!("Consumer task error: {:?}", e),
            Err(_) => info!("Consumer timed out"),
        }
    }

    println!("{}", aggregator.summary());
    info!("Publication Pipeline Demo finished");
    Ok(())
}

fn load_blueprint() -> Result<PublicationBlueprint, Box<dyn std::error::Error>> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!(path = %path.display(), "Loading config file");
            Ok(ConfigLoader::load_from_path(path.as_path())?)
        }
        None => {
            info!("No config path given, using built-in default");
            Ok(ConfigLoader::load_from_str(
                DEFAULT_CONFIG,
                ConfigFormat::Toml,
            )?)
        }
    }
}

fn synthetic_frame(frame_id: u64) -> FrameContext {
    FrameContext {
        frame_id,
        stamp_secs: frame_id as f64 / 25.0,
        width: 640,
        height: 480,
        data: Bytes::from(vec![0u8; 640 * 480 * 3]),
    }
}

fn synthetic_objects(frame_id: u64) -> ResultBatch {
    // Deterministic drift so boxes move across frames
    let offset = (frame_id as i32 * 7) % 200;
    ResultBatch::Objects(vec![
        ObjectDetection {
            bbox: BoundingBox::new(40 + offset, 60, 120, 260),
            label: "person".into(),
            confidence: 0.93,
        },
        ObjectDetection {
            bbox: BoundingBox::new(300 - offset, 200, 180, 120),
            label: "bicycle".into(),
            confidence: 0.71,
        },
    ])
}

fn synthetic_faces(frame_id: u64) -> ResultBatch {
    let offset = (frame_id as i32 * 3) % 60;
    ResultBatch::Faces(vec![ObjectDetection {
        bbox: BoundingBox::new(80 + offset, 90, 56, 56),
        label: "face".into(),
        confidence: 0.88,
    }])
}

fn synthetic_age_gender(frame_id: u64) -> ResultBatch {
    ResultBatch::AgeGender(vec![AgeGenderResult {
        bbox: BoundingBox::new(80, 90, 56, 56),
        age: 30.0 + (frame_id % 5) as f32,
        male_prob: if frame_id % 4 == 0 { 0.8 } else { 0.2 },
    }])
}

fn synthetic_landmarks() -> ResultBatch {
    ResultBatch::Landmarks(vec![LandmarksResult {
        points: vec![
            Point2D { x: 96.0, y: 110.0 },
            Point2D { x: 120.0, y: 110.0 },
            Point2D { x: 108.0, y: 124.0 },
            Point2D { x: 100.0, y: 136.0 },
            Point2D { x: 116.0, y: 136.0 },
        ],
    }])
}
