use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// Image metadata from an <image> element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: u32,
    pub name: String,
    // Kept exactly as written in the XML attribute
    pub width: String,
    pub height: String,
}

// A <box> element, corners in top-left / bottom-right convention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    pub label: String,
    pub occluded: bool,
    pub xtl: f64,
    pub ytl: f64,
    pub xbr: f64,
    pub ybr: f64,
}

impl BoxRecord {
    /// Inclusive containment on all four edges
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.xtl <= x && x <= self.xbr && self.ytl <= y && y <= self.ybr
    }

    /// COCO style `[x, y, width, height]`
    pub fn to_coco_bbox(&self) -> [f64; 4] {
        [self.xtl, self.ytl, self.xbr - self.xtl, self.ybr - self.ytl]
    }
}

// A single-point <points> element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointRecord {
    pub label: String,
    pub occluded: bool,
    pub x: f64,
    pub y: f64,
}

impl KeypointRecord {
    pub fn visibility(&self) -> Visibility {
        if self.occluded {
            Visibility::Occluded
        } else {
            Visibility::Visible
        }
    }
}

/// COCO keypoint visibility code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    NotInImage = 0,
    Occluded = 1,
    Visible = 2,
}

impl Visibility {
    pub fn code(self) -> f64 {
        self as u8 as f64
    }
}

// Boxes and keypoints of one image, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotations {
    pub boxes: Vec<BoxRecord>,
    pub keypoints: Vec<KeypointRecord>,
}

/// Everything extracted from a CVAT XML export.
///
/// `images` and `annotations` are keyed by image id and share the same key
/// set; both keep document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CvatAnnotations {
    pub labels: Vec<String>,
    pub images: IndexMap<u32, ImageRecord>,
    pub annotations: IndexMap<u32, ImageAnnotations>,
}

impl CvatAnnotations {
    pub fn box_count(&self) -> usize {
        self.annotations.values().map(|a| a.boxes.len()).sum()
    }

    pub fn keypoint_count(&self) -> usize {
        self.annotations.values().map(|a| a.keypoints.len()).sum()
    }
}

// Struct to hold conversion statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    pub images: usize,
    pub boxes: usize,
    pub keypoints: usize,
    pub keypoints_assigned: usize,
    pub keypoints_dropped: usize,
    pub keypoints_shared: usize,
    pub annotations: usize,
}

impl ConversionStats {
    pub fn print_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("Images: {}", self.images);
        log::info!("Boxes: {}", self.boxes);
        log::info!("Keypoints: {}", self.keypoints);
        log::info!("Keypoints assigned to a box: {}", self.keypoints_assigned);
        log::info!("Annotations written: {}", self.annotations);

        if self.keypoints_dropped > 0 {
            log::warn!(
                "Dropped keypoints outside every box: {}",
                self.keypoints_dropped
            );
        }
        if self.keypoints_shared > 0 {
            log::warn!(
                "Keypoints contained by more than one box: {}",
                self.keypoints_shared
            );
        }
    }
}
