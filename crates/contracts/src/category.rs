//! Category - Inference result categories
//!
//! One category per upstream model output, each with its own channel and
//! message shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inference result category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Face detection boxes
    Faces,
    /// Emotion classification per face
    Emotions,
    /// Age / gender estimation per face
    AgeGender,
    /// Head pose angles per face
    HeadPose,
    /// Generic object detection boxes
    Objects,
    /// Instance segmentation masks
    Segmentation,
    /// Person re-identification embeddings
    PersonReid,
    /// Face re-identification embeddings
    FaceReid,
    /// Person attribute tags
    PersonAttributes,
    /// Facial landmark keypoints
    Landmarks,
    /// License plate recognition
    LicensePlates,
    /// Vehicle attribute classification
    VehicleAttributes,
}

impl Category {
    /// All categories, in no significant order
    pub const ALL: [Category; 12] = [
        Category::Faces,
        Category::Emotions,
        Category::AgeGender,
        Category::HeadPose,
        Category::Objects,
        Category::Segmentation,
        Category::PersonReid,
        Category::FaceReid,
        Category::PersonAttributes,
        Category::Landmarks,
        Category::LicensePlates,
        Category::VehicleAttributes,
    ];

    /// Stable snake_case name, used for config values and metric labels
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Faces => "faces",
            Category::Emotions => "emotions",
            Category::AgeGender => "age_gender",
            Category::HeadPose => "head_pose",
            Category::Objects => "objects",
            Category::Segmentation => "segmentation",
            Category::PersonReid => "person_reid",
            Category::FaceReid => "face_reid",
            Category::PersonAttributes => "person_attributes",
            Category::Landmarks => "landmarks",
            Category::LicensePlates => "license_plates",
            Category::VehicleAttributes => "vehicle_attributes",
        }
    }

    /// Default topic suffix under the pipeline namespace
    pub fn topic_suffix(self) -> &'static str {
        match self {
            Category::Faces => "faces",
            Category::Emotions => "emotions",
            Category::AgeGender => "age_genders",
            Category::HeadPose => "headposes",
            Category::Objects => "detected_objects",
            Category::Segmentation => "segmented_objects",
            Category::PersonReid => "reidentified_persons",
            Category::FaceReid => "reidentified_faces",
            Category::PersonAttributes => "person_attributes",
            Category::Landmarks => "detected_landmarks",
            Category::LicensePlates => "detected_license_plates",
            Category::VehicleAttributes => "detected_vehicles_attribs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Category::AgeGender).unwrap();
        assert_eq!(json, "\"age_gender\"");

        let parsed: Category = serde_json::from_str("\"license_plates\"").unwrap();
        assert_eq!(parsed, Category::LicensePlates);
    }

    #[test]
    fn test_all_unique_suffixes() {
        let mut seen = std::collections::HashSet::new();
        for category in Category::ALL {
            assert!(
                seen.insert(category.topic_suffix()),
                "duplicate suffix for {category}"
            );
        }
    }
}
