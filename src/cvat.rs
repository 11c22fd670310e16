//! CVAT XML annotation extraction
//!
//! Reads a CVAT "for images" export and splits it into the label vocabulary,
//! per-image metadata and per-image box / keypoint lists.

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::types::{BoxRecord, CvatAnnotations, ImageAnnotations, ImageRecord, KeypointRecord};
use crate::xml_tree::{parse_document, Element};

/// Read and parse a CVAT XML file
pub fn parse_cvat_file(path: &Path) -> Result<CvatAnnotations> {
    if !path.is_file() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Parsing CVAT annotations from {}", path.display());
    parse_cvat_reader(BufReader::new(file))
}

pub fn parse_cvat_str(xml: &str) -> Result<CvatAnnotations> {
    parse_cvat_reader(xml.as_bytes())
}

pub fn parse_cvat_reader<R: Read>(reader: R) -> Result<CvatAnnotations> {
    let root = parse_document(reader)?;

    let labels = extract_labels(&root)?;
    debug!("Labels: {:?}", labels);

    let mut images = IndexMap::new();
    let mut annotations = IndexMap::new();

    for xml_image in root.find_all("image") {
        let image = parse_image(xml_image)?;
        let image_id = image.id;

        let mut image_annotations = ImageAnnotations::default();
        for child in &xml_image.children {
            match child.name.as_str() {
                "box" => image_annotations.boxes.push(parse_box(child, image_id)?),
                "points" => image_annotations
                    .keypoints
                    .push(parse_keypoint(child, image_id)?),
                _ => {}
            }
        }

        match images.entry(image_id) {
            Entry::Occupied(_) => return Err(ConvertError::DuplicateImageId(image_id)),
            Entry::Vacant(slot) => {
                slot.insert(image);
            }
        }
        annotations.insert(image_id, image_annotations);
    }

    let cvat = CvatAnnotations {
        labels,
        images,
        annotations,
    };
    info!(
        "Found {} labels, {} images, {} boxes, {} keypoints",
        cvat.labels.len(),
        cvat.images.len(),
        cvat.box_count(),
        cvat.keypoint_count()
    );
    Ok(cvat)
}

/// Label names from the first <labels> container, in document order.
/// Entries without a <name> are skipped.
fn extract_labels(root: &Element) -> Result<Vec<String>> {
    let xml_labels = root
        .find("labels")
        .ok_or(ConvertError::MissingElement("labels"))?;

    Ok(xml_labels
        .children
        .iter()
        .filter_map(|label| label.find("name"))
        .map(|name| name.text.trim().to_string())
        .collect())
}

fn parse_image(element: &Element) -> Result<ImageRecord> {
    let raw_id = required_attr(element, "image", "id", None)?;
    let id = raw_id
        .trim()
        .parse::<u32>()
        .map_err(|_| ConvertError::InvalidAttribute {
            element: "image",
            attribute: "id",
            value: raw_id.to_string(),
            image_id: None,
        })?;

    Ok(ImageRecord {
        id,
        name: required_attr(element, "image", "name", Some(id))?.to_string(),
        width: required_attr(element, "image", "width", Some(id))?.to_string(),
        height: required_attr(element, "image", "height", Some(id))?.to_string(),
    })
}

fn parse_box(element: &Element, image_id: u32) -> Result<BoxRecord> {
    let coord = |attribute: &'static str| -> Result<f64> {
        let raw = required_attr(element, "box", attribute, Some(image_id))?;
        parse_number(raw).ok_or_else(|| ConvertError::InvalidAttribute {
            element: "box",
            attribute,
            value: raw.to_string(),
            image_id: Some(image_id),
        })
    };

    Ok(BoxRecord {
        label: required_attr(element, "box", "label", Some(image_id))?.to_string(),
        occluded: parse_flag(element, "box", image_id)?,
        xtl: coord("xtl")?,
        ytl: coord("ytl")?,
        xbr: coord("xbr")?,
        ybr: coord("ybr")?,
    })
}

fn parse_keypoint(element: &Element, image_id: u32) -> Result<KeypointRecord> {
    let label = required_attr(element, "points", "label", Some(image_id))?;
    let occluded = parse_flag(element, "points", image_id)?;
    let raw_points = required_attr(element, "points", "points", Some(image_id))?;

    let (x, y) = parse_point(raw_points).ok_or_else(|| ConvertError::MalformedPoint {
        image_id,
        label: label.to_string(),
        value: raw_points.to_string(),
    })?;

    Ok(KeypointRecord {
        label: label.to_string(),
        occluded,
        x,
        y,
    })
}

/// Parse a single `x,y` pair. Anything else, including several
/// `;`-separated pairs, is rejected.
pub fn parse_point(raw: &str) -> Option<(f64, f64)> {
    let mut parts = raw.split(',');
    let x = parse_number(parts.next()?)?;
    let y = parse_number(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

// CVAT writes the occluded flag as "0" or "1"
fn parse_flag(element: &Element, element_name: &'static str, image_id: u32) -> Result<bool> {
    let raw = required_attr(element, element_name, "occluded", Some(image_id))?;
    match raw.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ConvertError::InvalidAttribute {
            element: element_name,
            attribute: "occluded",
            value: raw.to_string(),
            image_id: Some(image_id),
        }),
    }
}

fn required_attr<'a>(
    element: &'a Element,
    element_name: &'static str,
    attribute: &'static str,
    image_id: Option<u32>,
) -> Result<&'a str> {
    element
        .attr(attribute)
        .ok_or(ConvertError::MissingAttribute {
            element: element_name,
            attribute,
            image_id,
        })
}
