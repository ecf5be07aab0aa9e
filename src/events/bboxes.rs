//! Per-frame bounding boxes of event tracks, for gallery cutouts.

use std::collections::BTreeMap;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use super::record::{Events, TrackKey};
use crate::graph::Graph;
use crate::node_id::{FrameIndex, ObjectLabel};
use crate::sample::{BoundingBox, Sample};
use crate::{Error, NodeId, Result};

/// Window options for [`track_bboxes`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBoxOptions {
    /// Fixed window size `(width, height)`; `None` sizes the window to the
    /// largest object extent of the track.
    pub size: Option<(f64, f64)>,

    /// Margin added on every side of the window.
    pub border: f64,

    /// Image size `(width, height)` the windows are clipped to.
    pub image_size: (f64, f64),
}

impl BBoxOptions {
    pub fn new(image_size: (f64, f64)) -> Self {
        Self {
            size: None,
            border: 0.0,
            image_size,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.border.is_finite() && self.border >= 0.0) {
            return Err(Error::InvalidConfig(format!("border must be non-negative, got {}", self.border)));
        }
        if let Some((w, h)) = self.size {
            if !(w > 0.0 && h > 0.0) {
                return Err(Error::InvalidConfig(format!("window size must be positive, got ({}, {})", w, h)));
            }
        }
        Ok(())
    }
}

/// Window around the objects of one track at one time step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackFrameBox {
    pub frame: FrameIndex,
    pub rect: BoundingBox,
    /// Labels of the objects covered by `rect`.
    pub objects: Vec<ObjectLabel>,
}

struct Step {
    frame: FrameIndex,
    union: BoundingBox,
    center: Point2<f64>,
    objects: Vec<ObjectLabel>,
}

/// Compute a window per time step for every event record.
///
/// All nodes of a record at the same step and frame are merged into one
/// box; the window is centered on their mean centroid and clipped to the
/// image.
pub(crate) fn track_bboxes<S: Sample, E>(
    graph: &Graph<S, E>,
    events: &Events,
    options: &BBoxOptions,
) -> Result<BTreeMap<TrackKey, Vec<TrackFrameBox>>> {
    options.validate()?;
    let (image_width, image_height) = options.image_size;

    let mut result = BTreeMap::new();
    for (key, record) in &events.records {
        let mut steps = Vec::with_capacity(record.max_length);

        for index in 0..record.max_length {
            let mut ids: Vec<NodeId> = record.tracks.iter().filter_map(|track| track.get(index).copied()).collect();
            ids.sort();
            ids.dedup();

            let Some(frame) = ids.first().map(|id| id.frame) else {
                continue;
            };
            // Padded tracks may repeat a frame; only the earliest is boxed
            if steps.last().map_or(false, |step: &Step| step.frame == frame) {
                continue;
            }
            ids.retain(|id| id.frame == frame);

            let mut union: Option<BoundingBox> = None;
            let mut center_sum = Vector2::zeros();
            for id in &ids {
                let sample = graph.node_data(id)?;
                let bbox = sample.bbox();
                union = Some(union.map_or(bbox, |u| u.union(&bbox)));
                center_sum += sample.centroid().coords;
            }
            let Some(union) = union else {
                continue;
            };

            steps.push(Step {
                frame,
                union,
                center: Point2::from(center_sum / ids.len() as f64),
                objects: ids.iter().map(|id| id.object_label).collect(),
            });
        }

        let window = match options.size {
            Some((width, height)) => Vector2::new(width, height),
            None => steps.iter().fold(Vector2::zeros(), |extent: Vector2<f64>, step| {
                extent.sup(&step.union.size())
            }),
        } + Vector2::repeat(2.0 * options.border);

        let boxes = steps
            .into_iter()
            .map(|step| TrackFrameBox {
                frame: step.frame,
                rect: BoundingBox::centered(step.center, window).clip(image_width, image_height),
                objects: step.objects,
            })
            .collect();

        result.insert(*key, boxes);
    }

    Ok(result)
}
