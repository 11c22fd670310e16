//! CVAT to COCO keypoints conversion
//!
//! Boxes become COCO annotations. Keypoints are loose records in CVAT, so each
//! one is attached to every box in its image whose rectangle contains it.

use log::{debug, info, warn};
use std::path::Path;

use crate::coco::{
    Annotation, Category, CocoFile, Image, Info, Licenses, ANNOTATION_AREA, ANNOTATION_ISCROWD,
};
use crate::config::{KeypointSchema, OutputOptions};
use crate::cvat::parse_cvat_file;
use crate::error::{ConvertError, Result};
use crate::io::write_coco_file;
use crate::types::{
    BoxRecord, ConversionStats, CvatAnnotations, ImageAnnotations, KeypointRecord, Visibility,
};

/// Builder for a COCO keypoints document
pub struct CocoBuilder<'a> {
    schema: &'a KeypointSchema,
    next_annotation_id: u64,
    stats: ConversionStats,
}

impl<'a> CocoBuilder<'a> {
    pub fn new(schema: &'a KeypointSchema) -> Self {
        Self {
            schema,
            next_annotation_id: 1,
            stats: ConversionStats::default(),
        }
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// One category per label equal to the class name. The id is the label's
    /// position in the vocabulary, not a dense reindex.
    pub fn build_categories(&self, labels: &[String]) -> Vec<Category> {
        let categories: Vec<Category> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.as_str() == self.schema.class_name())
            .map(|(position, label)| Category {
                id: position as u32,
                name: label.clone(),
                supercategory: label.clone(),
                keypoints: self.schema.keypoint_names().to_vec(),
                skeleton: Vec::new(),
            })
            .collect();

        if categories.is_empty() {
            warn!(
                "Class '{}' not found among labels {:?}; no categories emitted",
                self.schema.class_name(),
                labels
            );
        }
        categories
    }

    pub fn build_images(&mut self, cvat: &CvatAnnotations) -> Vec<Image> {
        self.stats.images += cvat.images.len();
        cvat.images.values().map(Image::from).collect()
    }

    /// Annotations for every box, in image order then box order
    pub fn build_annotations(&mut self, cvat: &CvatAnnotations) -> Result<Vec<Annotation>> {
        let mut annotations = Vec::with_capacity(cvat.box_count());
        for image_id in cvat.images.keys() {
            if let Some(image_annotations) = cvat.annotations.get(image_id) {
                annotations.extend(self.annotate_image(*image_id, image_annotations)?);
            }
        }
        Ok(annotations)
    }

    /// Convert the boxes of a single image
    pub fn annotate_image(
        &mut self,
        image_id: u32,
        image_annotations: &ImageAnnotations,
    ) -> Result<Vec<Annotation>> {
        let keypoints = self.resolve_slots(image_id, &image_annotations.keypoints)?;
        let boxes = &image_annotations.boxes;

        self.stats.boxes += boxes.len();
        self.stats.keypoints += keypoints.len();
        for (_, keypoint) in &keypoints {
            match boxes.iter().filter(|b| b.contains(keypoint.x, keypoint.y)).count() {
                0 => {
                    debug!(
                        "Image {}: keypoint '{}' at ({}, {}) is outside every box, dropped",
                        image_id, keypoint.label, keypoint.x, keypoint.y
                    );
                    self.stats.keypoints_dropped += 1;
                }
                1 => self.stats.keypoints_assigned += 1,
                n => {
                    debug!(
                        "Image {}: keypoint '{}' at ({}, {}) is inside {} boxes",
                        image_id, keypoint.label, keypoint.x, keypoint.y, n
                    );
                    self.stats.keypoints_assigned += 1;
                    self.stats.keypoints_shared += 1;
                }
            }
        }

        Ok(boxes
            .iter()
            .map(|bbox| self.annotate_box(image_id, bbox, &keypoints))
            .collect())
    }

    fn annotate_box(
        &mut self,
        image_id: u32,
        bbox: &BoxRecord,
        keypoints: &[(usize, &KeypointRecord)],
    ) -> Annotation {
        let id = self.next_annotation_id;
        self.next_annotation_id += 1;
        self.stats.annotations += 1;

        Annotation {
            segmentation: Vec::new(),
            num_keypoints: self.schema.num_keypoints() as u32,
            area: ANNOTATION_AREA,
            iscrowd: ANNOTATION_ISCROWD,
            keypoints: fill_keypoint_slots(self.schema.num_keypoints(), bbox, keypoints),
            image_id,
            bbox: bbox.to_coco_bbox(),
            category_id: self.schema.category_id(),
            id,
        }
    }

    /// Pair each keypoint with its slot index, failing on unknown labels
    fn resolve_slots<'k>(
        &self,
        image_id: u32,
        keypoints: &'k [KeypointRecord],
    ) -> Result<Vec<(usize, &'k KeypointRecord)>> {
        keypoints
            .iter()
            .map(|keypoint| {
                self.schema
                    .slot_of(&keypoint.label)
                    .map(|slot| (slot, keypoint))
                    .ok_or_else(|| ConvertError::UnknownKeypointLabel {
                        image_id,
                        label: keypoint.label.clone(),
                    })
            })
            .collect()
    }

    /// Build the complete document
    pub fn build(&mut self, cvat: &CvatAnnotations, licenses: Licenses) -> Result<CocoFile> {
        let categories = self.build_categories(&cvat.labels);
        let images = self.build_images(cvat);
        let annotations = self.build_annotations(cvat)?;

        Ok(CocoFile {
            info: Info::default(),
            categories,
            licenses,
            images,
            annotations,
        })
    }
}

/// Flattened `[x, y, v]` triples for every slot. Slots without a contained
/// keypoint stay `(0, 0, 0)`; a later keypoint with the same label overwrites
/// an earlier one.
pub fn fill_keypoint_slots(
    num_keypoints: usize,
    bbox: &BoxRecord,
    keypoints: &[(usize, &KeypointRecord)],
) -> Vec<f64> {
    let mut slots = vec![Visibility::NotInImage.code(); num_keypoints * 3];
    for (slot, keypoint) in keypoints {
        if bbox.contains(keypoint.x, keypoint.y) {
            let offset = slot * 3;
            slots[offset] = keypoint.x;
            slots[offset + 1] = keypoint.y;
            slots[offset + 2] = keypoint.visibility().code();
        }
    }
    slots
}

/// Build a COCO keypoints document from extracted CVAT annotations
pub fn construct_coco_keypoints(
    schema: &KeypointSchema,
    cvat: &CvatAnnotations,
    licenses: Licenses,
) -> Result<CocoFile> {
    CocoBuilder::new(schema).build(cvat, licenses)
}

/// Full pipeline: parse `input`, convert, and write `output`.
///
/// Nothing is written unless every step before the write succeeds.
pub fn convert_file(
    input: &Path,
    output: &Path,
    schema: &KeypointSchema,
    options: OutputOptions,
) -> Result<ConversionStats> {
    let cvat = parse_cvat_file(input)?;

    let licenses = if options.license_list {
        Licenses::empty_list()
    } else {
        Licenses::empty_text()
    };

    info!("Building COCO keypoints for class '{}'", schema.class_name());
    let mut builder = CocoBuilder::new(schema);
    let coco = builder.build(&cvat, licenses)?;

    write_coco_file(&coco, output, options.pretty)?;
    Ok(builder.stats().clone())
}
