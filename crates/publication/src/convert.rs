//! Conversion from internal result records to outbound message items
//!
//! Malformed records (non-finite numeric fields, boxes empty after clamping
//! to the frame) are dropped individually; the rest of the batch proceeds.

use tracing::warn;

use contracts::{
    AgeGenderItem, AgeGenderResult, AttributesItem, BoundingBox, EmotionItem, EmotionResult,
    FrameContext, HeadPoseItem, HeadPoseResult, Keypoint, LandmarkItem, LandmarksResult,
    LicensePlateResult, MaskItem, MessageBody, ObjectDetection, ObjectInBox,
    PersonAttributesResult, PlateItem, RegionOfInterest, ReidItem, ReidResult, ResultBatch,
    SegmentationResult, VehicleAttribsResult, VehicleItem,
};

/// Convert one batch into its staged message body.
///
/// Returns the body and the number of records dropped as malformed.
pub fn convert_batch(batch: ResultBatch, frame: &FrameContext) -> (MessageBody, u32) {
    let category = batch.category();
    let (w, h) = (frame.width, frame.height);

    let (body, dropped) = match batch {
        ResultBatch::Faces(v) => wrap(boxes_to_items(v, w, h), MessageBody::Faces),
        ResultBatch::Objects(v) => wrap(boxes_to_items(v, w, h), MessageBody::Objects),
        ResultBatch::Emotions(v) => wrap(emotions_to_items(v, w, h), MessageBody::Emotions),
        ResultBatch::AgeGender(v) => wrap(age_gender_to_items(v, w, h), MessageBody::AgeGender),
        ResultBatch::HeadPose(v) => wrap(head_pose_to_items(v, w, h), MessageBody::HeadPose),
        ResultBatch::Segmentation(v) => wrap(masks_to_items(v, w, h), MessageBody::Segmentation),
        ResultBatch::PersonReid(v) => wrap(reid_to_items(v, w, h), MessageBody::PersonReid),
        ResultBatch::FaceReid(v) => wrap(reid_to_items(v, w, h), MessageBody::FaceReid),
        ResultBatch::PersonAttributes(v) => {
            wrap(attributes_to_items(v, w, h), MessageBody::PersonAttributes)
        }
        ResultBatch::Landmarks(v) => wrap(landmarks_to_items(v), MessageBody::Landmarks),
        ResultBatch::LicensePlates(v) => wrap(plates_to_items(v, w, h), MessageBody::LicensePlates),
        ResultBatch::VehicleAttributes(v) => {
            wrap(vehicles_to_items(v, w, h), MessageBody::VehicleAttributes)
        }
    };

    if dropped > 0 {
        warn!(category = %category, dropped, "malformed records dropped during conversion");
    }

    (body, dropped)
}

fn wrap<T>(
    (items, dropped): (Vec<T>, u32),
    variant: impl FnOnce(Vec<T>) -> MessageBody,
) -> (MessageBody, u32) {
    (variant(items), dropped)
}

/// Clamp a detection box to frame bounds.
///
/// Returns None if the box has nothing left inside the frame.
fn clamp_roi(bbox: &BoundingBox, frame_w: u32, frame_h: u32) -> Option<RegionOfInterest> {
    if bbox.width <= 0 || bbox.height <= 0 {
        return None;
    }

    let x0 = bbox.x.max(0) as u32;
    let y0 = bbox.y.max(0) as u32;
    let x1 = bbox.x.saturating_add(bbox.width).max(0) as u32;
    let y1 = bbox.y.saturating_add(bbox.height).max(0) as u32;

    let x1 = x1.min(frame_w);
    let y1 = y1.min(frame_h);

    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    Some(RegionOfInterest {
        x_offset: x0,
        y_offset: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

fn boxes_to_items(results: Vec<ObjectDetection>, w: u32, h: u32) -> (Vec<ObjectInBox>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| {
            if !r.confidence.is_finite() {
                dropped += 1;
                return None;
            }
            let roi = match clamp_roi(&r.bbox, w, h) {
                Some(roi) => roi,
                None => {
                    dropped += 1;
                    return None;
                }
            };
            Some(ObjectInBox {
                roi,
                label: r.label,
                probability: r.confidence,
            })
        })
        .collect();
    (items, dropped)
}

fn emotions_to_items(results: Vec<EmotionResult>, w: u32, h: u32) -> (Vec<EmotionItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| match clamp_roi(&r.bbox, w, h) {
            Some(roi) => Some(EmotionItem {
                roi,
                emotion: r.emotion,
            }),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();
    (items, dropped)
}

fn age_gender_to_items(results: Vec<AgeGenderResult>, w: u32, h: u32) -> (Vec<AgeGenderItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| {
            if !r.age.is_finite() || !r.male_prob.is_finite() {
                dropped += 1;
                return None;
            }
            let roi = match clamp_roi(&r.bbox, w, h) {
                Some(roi) => roi,
                None => {
                    dropped += 1;
                    return None;
                }
            };
            let (gender, gender_confidence) = if r.male_prob > 0.5 {
                ("male", r.male_prob)
            } else {
                ("female", 1.0 - r.male_prob)
            };
            Some(AgeGenderItem {
                roi,
                age: r.age,
                gender: gender.to_string(),
                gender_confidence,
            })
        })
        .collect();
    (items, dropped)
}

fn head_pose_to_items(results: Vec<HeadPoseResult>, w: u32, h: u32) -> (Vec<HeadPoseItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| {
            if ![r.yaw, r.pitch, r.roll].iter().all(|a| a.is_finite()) {
                dropped += 1;
                return None;
            }
            let roi = match clamp_roi(&r.bbox, w, h) {
                Some(roi) => roi,
                None => {
                    dropped += 1;
                    return None;
                }
            };
            Some(HeadPoseItem {
                roi,
                yaw: r.yaw,
                pitch: r.pitch,
                roll: r.roll,
            })
        })
        .collect();
    (items, dropped)
}

fn masks_to_items(results: Vec<SegmentationResult>, w: u32, h: u32) -> (Vec<MaskItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| {
            let expected = (r.mask.width as usize) * (r.mask.height as usize);
            if !r.confidence.is_finite() || r.mask.probabilities.len() != expected {
                dropped += 1;
                return None;
            }
            let roi = match clamp_roi(&r.bbox, w, h) {
                Some(roi) => roi,
                None => {
                    dropped += 1;
                    return None;
                }
            };
            Some(MaskItem {
                roi,
                label: r.label,
                probability: r.confidence,
                mask_width: r.mask.width,
                mask_height: r.mask.height,
                mask: r.mask.probabilities,
            })
        })
        .collect();
    (items, dropped)
}

fn reid_to_items(results: Vec<ReidResult>, w: u32, h: u32) -> (Vec<ReidItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| match clamp_roi(&r.bbox, w, h) {
            Some(roi) => Some(ReidItem {
                roi,
                embedding: r.embedding,
            }),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();
    (items, dropped)
}

fn attributes_to_items(
    results: Vec<PersonAttributesResult>,
    w: u32,
    h: u32,
) -> (Vec<AttributesItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| match clamp_roi(&r.bbox, w, h) {
            Some(roi) => Some(AttributesItem {
                roi,
                attributes: r.attributes,
            }),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();
    (items, dropped)
}

fn landmarks_to_items(results: Vec<LandmarksResult>) -> (Vec<LandmarkItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| {
            // Keypoint order is model-defined; one bad point invalidates the set
            if r.points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                dropped += 1;
                return None;
            }
            Some(LandmarkItem {
                points: r
                    .points
                    .into_iter()
                    .map(|p| Keypoint { x: p.x, y: p.y })
                    .collect(),
            })
        })
        .collect();
    (items, dropped)
}

fn plates_to_items(results: Vec<LicensePlateResult>, w: u32, h: u32) -> (Vec<PlateItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| match clamp_roi(&r.bbox, w, h) {
            Some(roi) => Some(PlateItem {
                roi,
                license: r.license,
            }),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();
    (items, dropped)
}

fn vehicles_to_items(results: Vec<VehicleAttribsResult>, w: u32, h: u32) -> (Vec<VehicleItem>, u32) {
    let mut dropped = 0u32;
    let items = results
        .into_iter()
        .filter_map(|r| match clamp_roi(&r.bbox, w, h) {
            Some(roi) => Some(VehicleItem {
                roi,
                color: r.color,
                vehicle_type: r.vehicle_type,
            }),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();
    (items, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::MaskPatch;

    fn frame(width: u32, height: u32) -> FrameContext {
        FrameContext {
            frame_id: 1,
            stamp_secs: 0.0,
            width,
            height,
            data: Bytes::new(),
        }
    }

    fn detection(x: i32, y: i32, w: i32, h: i32, confidence: f32) -> ObjectDetection {
        ObjectDetection {
            bbox: BoundingBox::new(x, y, w, h),
            label: "person".into(),
            confidence,
        }
    }

    #[test]
    fn test_clamp_roi_negative_origin() {
        let roi = clamp_roi(&BoundingBox::new(-10, -5, 50, 40), 640, 480).unwrap();
        assert_eq!(roi.x_offset, 0);
        assert_eq!(roi.y_offset, 0);
        assert_eq!(roi.width, 40);
        assert_eq!(roi.height, 35);
    }

    #[test]
    fn test_clamp_roi_overshoot() {
        let roi = clamp_roi(&BoundingBox::new(600, 460, 100, 100), 640, 480).unwrap();
        assert_eq!(roi.width, 40);
        assert_eq!(roi.height, 20);
    }

    #[test]
    fn test_clamp_roi_fully_outside() {
        assert!(clamp_roi(&BoundingBox::new(700, 0, 10, 10), 640, 480).is_none());
        assert!(clamp_roi(&BoundingBox::new(0, 0, 0, 10), 640, 480).is_none());
        assert!(clamp_roi(&BoundingBox::new(0, 0, -5, 10), 640, 480).is_none());
    }

    #[test]
    fn test_malformed_confidence_dropped_rest_kept() {
        let batch = ResultBatch::Objects(vec![
            detection(10, 10, 50, 50, 0.91),
            detection(20, 20, 30, 30, f32::NAN),
            detection(0, 0, 5, 5, 0.5),
        ]);

        let (body, dropped) = convert_batch(batch, &frame(640, 480));
        assert_eq!(dropped, 1);
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_gender_from_male_prob() {
        let batch = ResultBatch::AgeGender(vec![
            AgeGenderResult {
                bbox: BoundingBox::new(0, 0, 10, 10),
                age: 31.0,
                male_prob: 0.8,
            },
            AgeGenderResult {
                bbox: BoundingBox::new(0, 0, 10, 10),
                age: 24.0,
                male_prob: 0.1,
            },
        ]);

        let (body, dropped) = convert_batch(batch, &frame(640, 480));
        assert_eq!(dropped, 0);
        match body {
            MessageBody::AgeGender(items) => {
                assert_eq!(items[0].gender, "male");
                assert!((items[0].gender_confidence - 0.8).abs() < 1e-6);
                assert_eq!(items[1].gender, "female");
                assert!((items[1].gender_confidence - 0.9).abs() < 1e-6);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_mask_size_mismatch_dropped() {
        let batch = ResultBatch::Segmentation(vec![SegmentationResult {
            bbox: BoundingBox::new(0, 0, 10, 10),
            label: "car".into(),
            confidence: 0.7,
            mask: MaskPatch {
                width: 4,
                height: 4,
                probabilities: vec![0.5; 15], // one short
            },
        }]);

        let (body, dropped) = convert_batch(batch, &frame(640, 480));
        assert_eq!(dropped, 1);
        assert!(body.is_empty());
    }

    #[test]
    fn test_landmark_set_with_bad_point_dropped() {
        let good = LandmarksResult {
            points: vec![
                contracts::Point2D { x: 1.0, y: 2.0 },
                contracts::Point2D { x: 3.0, y: 4.0 },
            ],
        };
        let bad = LandmarksResult {
            points: vec![contracts::Point2D {
                x: f32::INFINITY,
                y: 0.0,
            }],
        };

        let (body, dropped) = convert_batch(ResultBatch::Landmarks(vec![good, bad]), &frame(64, 64));
        assert_eq!(dropped, 1);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_embedding_passthrough() {
        let batch = ResultBatch::PersonReid(vec![ReidResult {
            bbox: BoundingBox::new(5, 5, 20, 40),
            embedding: vec![0.25, -0.5, 0.75],
        }]);

        let (body, dropped) = convert_batch(batch, &frame(640, 480));
        assert_eq!(dropped, 0);
        match body {
            MessageBody::PersonReid(items) => {
                assert_eq!(items[0].embedding, vec![0.25, -0.5, 0.75]);
            }
            _ => unreachable!(),
        }
    }
}
