//! ResultBatch - Inference pipeline output
//!
//! Internal result records as produced by the upstream models, one record
//! type per category. A batch is scoped to exactly one frame and is
//! immutable once handed to a sink.

use serde::{Deserialize, Serialize};

use crate::Category;

/// Axis-aligned detection box in pixel coordinates.
///
/// Model output may stick out of the frame (negative offsets, overshooting
/// extents); conversion clamps it to frame bounds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// 2D point in pixel coordinates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

/// Object detection result (also used for face detection boxes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDetection {
    pub bbox: BoundingBox,
    pub label: String,
    pub confidence: f32,
}

/// Emotion classification result for one face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionResult {
    pub bbox: BoundingBox,
    pub emotion: String,
}

/// Age / gender estimation result for one face
///
/// Gender is carried as the raw male probability; the label is decided at
/// conversion time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgeGenderResult {
    pub bbox: BoundingBox,
    pub age: f32,
    pub male_prob: f32,
}

/// Head pose angles (degrees) for one face
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeadPoseResult {
    pub bbox: BoundingBox,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Per-instance probability mask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskPatch {
    pub width: u32,
    pub height: u32,
    /// Row-major probabilities, `width * height` values
    pub probabilities: Vec<f32>,
}

/// Instance segmentation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationResult {
    pub bbox: BoundingBox,
    pub label: String,
    pub confidence: f32,
    pub mask: MaskPatch,
}

/// Re-identification result (person or face)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReidResult {
    pub bbox: BoundingBox,
    /// Raw descriptor vector for downstream matching
    pub embedding: Vec<f32>,
}

/// Person attribute tags for one detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonAttributesResult {
    pub bbox: BoundingBox,
    pub attributes: Vec<String>,
}

/// Facial landmark set for one face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarksResult {
    /// Ordered keypoints (model-defined order)
    pub points: Vec<Point2D>,
}

/// License plate recognition result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicensePlateResult {
    pub bbox: BoundingBox,
    pub license: String,
}

/// Vehicle attribute classification result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleAttribsResult {
    pub bbox: BoundingBox,
    pub color: String,
    pub vehicle_type: String,
}

/// One inference category's result batch for the current frame
///
/// Tagged-variant replacement for per-category entry points: every category
/// flows through the single `OutputSink::accept`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResultBatch {
    Faces(Vec<ObjectDetection>),
    Emotions(Vec<EmotionResult>),
    AgeGender(Vec<AgeGenderResult>),
    HeadPose(Vec<HeadPoseResult>),
    Objects(Vec<ObjectDetection>),
    Segmentation(Vec<SegmentationResult>),
    PersonReid(Vec<ReidResult>),
    FaceReid(Vec<ReidResult>),
    PersonAttributes(Vec<PersonAttributesResult>),
    Landmarks(Vec<LandmarksResult>),
    LicensePlates(Vec<LicensePlateResult>),
    VehicleAttributes(Vec<VehicleAttribsResult>),
}

impl ResultBatch {
    /// Category this batch belongs to
    pub fn category(&self) -> Category {
        match self {
            ResultBatch::Faces(_) => Category::Faces,
            ResultBatch::Emotions(_) => Category::Emotions,
            ResultBatch::AgeGender(_) => Category::AgeGender,
            ResultBatch::HeadPose(_) => Category::HeadPose,
            ResultBatch::Objects(_) => Category::Objects,
            ResultBatch::Segmentation(_) => Category::Segmentation,
            ResultBatch::PersonReid(_) => Category::PersonReid,
            ResultBatch::FaceReid(_) => Category::FaceReid,
            ResultBatch::PersonAttributes(_) => Category::PersonAttributes,
            ResultBatch::Landmarks(_) => Category::Landmarks,
            ResultBatch::LicensePlates(_) => Category::LicensePlates,
            ResultBatch::VehicleAttributes(_) => Category::VehicleAttributes,
        }
    }

    /// Number of records in the batch
    pub fn len(&self) -> usize {
        match self {
            ResultBatch::Faces(v) => v.len(),
            ResultBatch::Emotions(v) => v.len(),
            ResultBatch::AgeGender(v) => v.len(),
            ResultBatch::HeadPose(v) => v.len(),
            ResultBatch::Objects(v) => v.len(),
            ResultBatch::Segmentation(v) => v.len(),
            ResultBatch::PersonReid(v) => v.len(),
            ResultBatch::FaceReid(v) => v.len(),
            ResultBatch::PersonAttributes(v) => v.len(),
            ResultBatch::Landmarks(v) => v.len(),
            ResultBatch::LicensePlates(v) => v.len(),
            ResultBatch::VehicleAttributes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
