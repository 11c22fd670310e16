//! COCO keypoints format data structures
//!
//! This module holds the serializable COCO document produced from CVAT
//! annotations, restricted to the keypoints subset of the format.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::types::ImageRecord;

/// `area` written on every annotation; never computed from the box
pub const ANNOTATION_AREA: f64 = 0.0;

/// `iscrowd` written on every annotation
pub const ANNOTATION_ISCROWD: u32 = 0;

/// COCO dataset information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub description: String,
    pub url: String,
    pub version: String,
    pub year: String,
    pub contributor: String,
    pub date_created: String,
}

impl Default for Info {
    fn default() -> Self {
        let now = Local::now();
        Self {
            description: "COCO 2017 Dataset".to_string(),
            url: String::new(),
            version: "1.0".to_string(),
            year: now.format("%Y").to_string(),
            contributor: "COCO Consortium".to_string(),
            date_created: now.format("%m/%d/%Y").to_string(),
        }
    }
}

/// COCO license information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: u32,
    pub name: String,
    pub url: String,
}

/// The `licenses` field: an empty string by default, or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Licenses {
    Text(String),
    List(Vec<License>),
}

impl Licenses {
    pub fn empty_text() -> Self {
        Licenses::Text(String::new())
    }

    pub fn empty_list() -> Self {
        Licenses::List(Vec::new())
    }
}

impl Default for Licenses {
    fn default() -> Self {
        Self::empty_text()
    }
}

/// COCO keypoint category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub supercategory: String,
    pub keypoints: Vec<String>,
    pub skeleton: Vec<[u32; 2]>,
}

/// COCO image information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub file_name: String,
    pub height: String,
    pub width: String,
    pub id: u32,
}

impl From<&ImageRecord> for Image {
    fn from(record: &ImageRecord) -> Self {
        Self {
            file_name: record.name.clone(),
            height: record.height.clone(),
            width: record.width.clone(),
            id: record.id,
        }
    }
}

/// COCO keypoint annotation, one per CVAT box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub segmentation: Vec<Vec<f64>>,
    pub num_keypoints: u32,
    pub area: f64,
    pub iscrowd: u32,
    pub keypoints: Vec<f64>, // [x1, y1, v1, x2, y2, v2, ...]
    pub image_id: u32,
    pub bbox: [f64; 4], // [x, y, width, height]
    pub category_id: u32,
    pub id: u64,
}

/// Complete COCO keypoints document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoFile {
    pub info: Info,
    pub categories: Vec<Category>,
    pub licenses: Licenses,
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
}

impl Default for CocoFile {
    fn default() -> Self {
        Self {
            info: Info::default(),
            categories: Vec::new(),
            licenses: Licenses::default(),
            images: Vec::new(),
            annotations: Vec::new(),
        }
    }
}
