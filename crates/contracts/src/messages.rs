//! ChannelMessage - Publication sink output
//!
//! External message field layouts, one item shape per category. Every
//! message is one header plus one ordered item list.

use serde::{Deserialize, Serialize};

use crate::{Category, FrameHeader};

/// Region of interest inside the frame, clamped to frame bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub x_offset: u32,
    pub y_offset: u32,
    pub width: u32,
    pub height: u32,
}

/// Detected object in a box (objects and faces channels)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInBox {
    pub roi: RegionOfInterest,
    pub label: String,
    pub probability: f32,
}

/// Emotion label for one face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionItem {
    pub roi: RegionOfInterest,
    pub emotion: String,
}

/// Age / gender estimate for one face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeGenderItem {
    pub roi: RegionOfInterest,
    pub age: f32,
    pub gender: String,
    pub gender_confidence: f32,
}

/// Head pose angles (degrees) for one face
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeadPoseItem {
    pub roi: RegionOfInterest,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Segmented instance with probability mask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskItem {
    pub roi: RegionOfInterest,
    pub label: String,
    pub probability: f32,
    pub mask_width: u32,
    pub mask_height: u32,
    /// Row-major mask probabilities
    pub mask: Vec<f32>,
}

/// Re-identification descriptor (person or face)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReidItem {
    pub roi: RegionOfInterest,
    /// Raw float sequence for downstream matching
    pub embedding: Vec<f32>,
}

/// Attribute tags for one person detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributesItem {
    pub roi: RegionOfInterest,
    pub attributes: Vec<String>,
}

/// Keypoint in pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
}

/// Ordered landmark keypoints for one face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkItem {
    pub points: Vec<Keypoint>,
}

/// Recognized license plate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateItem {
    pub roi: RegionOfInterest,
    pub license: String,
}

/// Vehicle attribute classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleItem {
    pub roi: RegionOfInterest,
    pub color: String,
    pub vehicle_type: String,
}

/// Ordered item list of one category's message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessageBody {
    Faces(Vec<ObjectInBox>),
    Emotions(Vec<EmotionItem>),
    AgeGender(Vec<AgeGenderItem>),
    HeadPose(Vec<HeadPoseItem>),
    Objects(Vec<ObjectInBox>),
    Segmentation(Vec<MaskItem>),
    PersonReid(Vec<ReidItem>),
    FaceReid(Vec<ReidItem>),
    PersonAttributes(Vec<AttributesItem>),
    Landmarks(Vec<LandmarkItem>),
    LicensePlates(Vec<PlateItem>),
    VehicleAttributes(Vec<VehicleItem>),
}

impl MessageBody {
    /// Empty body for a category
    ///
    /// Used when an empty batch is accepted: the staging record stays
    /// populated-but-empty so category presence is still signaled downstream.
    pub fn empty(category: Category) -> Self {
        match category {
            Category::Faces => MessageBody::Faces(Vec::new()),
            Category::Emotions => MessageBody::Emotions(Vec::new()),
            Category::AgeGender => MessageBody::AgeGender(Vec::new()),
            Category::HeadPose => MessageBody::HeadPose(Vec::new()),
            Category::Objects => MessageBody::Objects(Vec::new()),
            Category::Segmentation => MessageBody::Segmentation(Vec::new()),
            Category::PersonReid => MessageBody::PersonReid(Vec::new()),
            Category::FaceReid => MessageBody::FaceReid(Vec::new()),
            Category::PersonAttributes => MessageBody::PersonAttributes(Vec::new()),
            Category::Landmarks => MessageBody::Landmarks(Vec::new()),
            Category::LicensePlates => MessageBody::LicensePlates(Vec::new()),
            Category::VehicleAttributes => MessageBody::VehicleAttributes(Vec::new()),
        }
    }

    /// Category this body belongs to
    pub fn category(&self) -> Category {
        match self {
            MessageBody::Faces(_) => Category::Faces,
            MessageBody::Emotions(_) => Category::Emotions,
            MessageBody::AgeGender(_) => Category::AgeGender,
            MessageBody::HeadPose(_) => Category::HeadPose,
            MessageBody::Objects(_) => Category::Objects,
            MessageBody::Segmentation(_) => Category::Segmentation,
            MessageBody::PersonReid(_) => Category::PersonReid,
            MessageBody::FaceReid(_) => Category::FaceReid,
            MessageBody::PersonAttributes(_) => Category::PersonAttributes,
            MessageBody::Landmarks(_) => Category::Landmarks,
            MessageBody::LicensePlates(_) => Category::LicensePlates,
            MessageBody::VehicleAttributes(_) => Category::VehicleAttributes,
        }
    }

    /// Number of items in the body
    pub fn len(&self) -> usize {
        match self {
            MessageBody::Faces(v) => v.len(),
            MessageBody::Emotions(v) => v.len(),
            MessageBody::AgeGender(v) => v.len(),
            MessageBody::HeadPose(v) => v.len(),
            MessageBody::Objects(v) => v.len(),
            MessageBody::Segmentation(v) => v.len(),
            MessageBody::PersonReid(v) => v.len(),
            MessageBody::FaceReid(v) => v.len(),
            MessageBody::PersonAttributes(v) => v.len(),
            MessageBody::Landmarks(v) => v.len(),
            MessageBody::LicensePlates(v) => v.len(),
            MessageBody::VehicleAttributes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append another body of the same category, preserving item order.
    ///
    /// Returns `false` (leaving `self` untouched) on category mismatch.
    pub fn extend_from(&mut self, other: MessageBody) -> bool {
        match (self, other) {
            (MessageBody::Faces(a), MessageBody::Faces(b)) => a.extend(b),
            (MessageBody::Emotions(a), MessageBody::Emotions(b)) => a.extend(b),
            (MessageBody::AgeGender(a), MessageBody::AgeGender(b)) => a.extend(b),
            (MessageBody::HeadPose(a), MessageBody::HeadPose(b)) => a.extend(b),
            (MessageBody::Objects(a), MessageBody::Objects(b)) => a.extend(b),
            (MessageBody::Segmentation(a), MessageBody::Segmentation(b)) => a.extend(b),
            (MessageBody::PersonReid(a), MessageBody::PersonReid(b)) => a.extend(b),
            (MessageBody::FaceReid(a), MessageBody::FaceReid(b)) => a.extend(b),
            (MessageBody::PersonAttributes(a), MessageBody::PersonAttributes(b)) => a.extend(b),
            (MessageBody::Landmarks(a), MessageBody::Landmarks(b)) => a.extend(b),
            (MessageBody::LicensePlates(a), MessageBody::LicensePlates(b)) => a.extend(b),
            (MessageBody::VehicleAttributes(a), MessageBody::VehicleAttributes(b)) => a.extend(b),
            _ => return false,
        }
        true
    }
}

/// Composite outbound message: one header + one ordered item list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub header: FrameHeader,
    pub body: MessageBody,
}

impl ChannelMessage {
    pub fn category(&self) -> Category {
        self.body.category()
    }
}

/// Per-cycle flush diagnostics
///
/// Produced by the sink at every `handle_output` for metrics collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlushMeta {
    /// Frame the cycle belonged to
    pub frame_id: u64,

    /// Header timestamp of the cycle
    pub stamp_secs: f64,

    /// Messages handed to channels
    pub published: u32,

    /// Messages rejected because a channel queue was full
    pub queue_dropped: u32,

    /// Staged categories with no channel wired (expected, not an error)
    pub unwired: u32,

    /// Total items across published messages
    pub items: u32,

    /// Malformed records dropped during conversion this cycle
    pub conversion_dropped: u32,

    /// Categories that were staged this cycle
    pub categories: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_matches_category() {
        for category in Category::ALL {
            let body = MessageBody::empty(category);
            assert_eq!(body.category(), category);
            assert!(body.is_empty());
        }
    }

    #[test]
    fn test_extend_preserves_order() {
        let mut body = MessageBody::Objects(vec![ObjectInBox {
            roi: RegionOfInterest::default(),
            label: "a".into(),
            probability: 0.1,
        }]);
        let more = MessageBody::Objects(vec![ObjectInBox {
            roi: RegionOfInterest::default(),
            label: "b".into(),
            probability: 0.2,
        }]);

        assert!(body.extend_from(more));
        match body {
            MessageBody::Objects(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].label, "a");
                assert_eq!(items[1].label, "b");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_extend_rejects_category_mismatch() {
        let mut body = MessageBody::empty(Category::Faces);
        let other = MessageBody::empty(Category::Landmarks);
        assert!(!body.extend_from(other));
        assert_eq!(body.category(), Category::Faces);
    }

    #[test]
    fn test_message_serde_round_trip() {
        let message = ChannelMessage {
            header: FrameHeader {
                frame_id: 7,
                stamp_secs: 0.35,
            },
            body: MessageBody::LicensePlates(vec![PlateItem {
                roi: RegionOfInterest {
                    x_offset: 4,
                    y_offset: 8,
                    width: 60,
                    height: 20,
                },
                license: "B 1234 XYZ".into(),
            }]),
        };

        let json = serde_json::to_string(&message).unwrap();
        let parsed: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.header.frame_id, 7);
        assert_eq!(parsed.body.len(), 1);
    }
}
