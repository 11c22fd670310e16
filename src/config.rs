use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{ConvertError, Result};

/// Class name recognized by the default schema
pub const DEFAULT_CLASS_NAME: &str = "Forklift";

/// Keypoint names of the default schema, in slot order
pub const DEFAULT_KEYPOINT_NAMES: [&str; 10] = [
    "LFrontWheel",
    "RFrontWheel",
    "LBackWheel",
    "RBackWheel",
    "LForkTip",
    "RForkTip",
    "LForkBase",
    "RForkBase",
    "LMastTop",
    "RMastTop",
];

/// Category id stamped on every annotation by the default schema
pub const DEFAULT_CATEGORY_ID: u32 = 1;

pub const DEFAULT_DATASET_NAME: &str = "COCO Keypoints Dataset";

/// Command-line arguments parser for converting CVAT XML to COCO keypoints.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Input path to the CVAT XML file to parse
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output path for the COCO keypoints JSON file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Name of the dataset
    #[arg(long = "dataset", default_value = DEFAULT_DATASET_NAME)]
    pub dataset: String,

    /// The single object class to convert
    #[arg(long = "class_name", default_value = DEFAULT_CLASS_NAME)]
    pub class_name: String,

    /// Ordered keypoint names, one slot each in the keypoints array
    #[arg(long = "keypoints", use_value_delimiter = true, default_values_t = DEFAULT_KEYPOINT_NAMES.map(String::from))]
    pub keypoints: Vec<String>,

    /// Category id written to every annotation
    #[arg(long = "category_id", default_value_t = DEFAULT_CATEGORY_ID)]
    pub category_id: u32,

    /// Pretty-print the output JSON
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Write 'licenses' as an empty list instead of an empty string
    #[arg(long = "license_list")]
    pub license_list: bool,
}

impl Args {
    /// Validate the schema-related options and build the keypoint schema
    pub fn to_schema(&self) -> Result<KeypointSchema> {
        KeypointSchema::new(
            self.class_name.clone(),
            self.keypoints.clone(),
            self.category_id,
        )
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            pretty: self.pretty,
            license_list: self.license_list,
        }
    }
}

/// The object class being converted and the layout of its keypoint array.
///
/// Keypoint slot `i` occupies `keypoints[3 * i..3 * i + 3]` in every
/// emitted annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointSchema {
    class_name: String,
    keypoint_names: Vec<String>,
    category_id: u32,
}

impl KeypointSchema {
    pub fn new(class_name: String, keypoint_names: Vec<String>, category_id: u32) -> Result<Self> {
        if class_name.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "class name must not be empty".to_string(),
            ));
        }
        if keypoint_names.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "at least one keypoint name is required".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(keypoint_names.len());
        for name in &keypoint_names {
            if name.trim().is_empty() {
                return Err(ConvertError::InvalidConfig(
                    "keypoint names must not be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConvertError::InvalidConfig(format!(
                    "duplicate keypoint name '{}'",
                    name
                )));
            }
        }

        Ok(Self {
            class_name,
            keypoint_names,
            category_id,
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn keypoint_names(&self) -> &[String] {
        &self.keypoint_names
    }

    pub fn category_id(&self) -> u32 {
        self.category_id
    }

    /// Number of keypoint slots
    pub fn num_keypoints(&self) -> usize {
        self.keypoint_names.len()
    }

    /// Slot index of a keypoint label, if it is one of the schema's names
    pub fn slot_of(&self, label: &str) -> Option<usize> {
        self.keypoint_names.iter().position(|name| name == label)
    }
}

impl Default for KeypointSchema {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            keypoint_names: DEFAULT_KEYPOINT_NAMES.iter().map(|s| s.to_string()).collect(),
            category_id: DEFAULT_CATEGORY_ID,
        }
    }
}

/// How the finished document is serialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub pretty: bool,
    pub license_list: bool,
}
