//! CVAT XML to COCO keypoints converter
//!
//! This library converts CVAT XML annotation exports (boxes plus single-point
//! keypoint records) into a COCO keypoints JSON document for pose-estimation
//! training.

pub mod coco;
pub mod config;
pub mod conversion;
pub mod cvat;
pub mod error;
pub mod io;
pub mod types;
pub mod xml_tree;

// Re-export commonly used types and functions
pub use config::{Args, KeypointSchema, OutputOptions};
pub use conversion::{construct_coco_keypoints, convert_file, CocoBuilder};
pub use cvat::{parse_cvat_file, parse_cvat_reader, parse_cvat_str};
pub use error::{ConvertError, Result};
pub use io::write_coco_file;
pub use types::{
    BoxRecord, ConversionStats, CvatAnnotations, ImageAnnotations, ImageRecord, KeypointRecord,
    Visibility,
};

// COCO-specific exports
pub use coco::{Annotation, Category, CocoFile, Image, Info, Licenses};
