use std::io::Error as IoError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a conversion. None of these are recoverable;
/// the run halts and no output is written.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No file found at {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("Failed to parse XML: {0}")]
    Xml(#[from] xml::reader::Error),
    #[error("Missing <{0}> element")]
    MissingElement(&'static str),
    #[error("Missing attribute '{attribute}' on <{element}>{}", image_suffix(.image_id))]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        image_id: Option<u32>,
    },
    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>{}", image_suffix(.image_id))]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
        image_id: Option<u32>,
    },
    #[error("Duplicate image id {0}")]
    DuplicateImageId(u32),
    #[error("Unknown keypoint label '{label}' in image {image_id}")]
    UnknownKeypointLabel { image_id: u32, label: String },
    #[error("Malformed point string '{value}' for keypoint '{label}' in image {image_id}")]
    MalformedPoint {
        image_id: u32,
        label: String,
        value: String,
    },
    #[error("Failed to serialize COCO data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn image_suffix(image_id: &Option<u32>) -> String {
    match image_id {
        Some(id) => format!(" in image {}", id),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
