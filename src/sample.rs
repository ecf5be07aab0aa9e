//! Per-object payloads stored on graph nodes.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Axis-aligned bounding box in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Upper-left corner (minimum x and y).
    pub upper_left: Point2<f64>,
    /// Lower-right corner (maximum x and y).
    pub lower_right: Point2<f64>,
}

impl BoundingBox {
    /// Create a bounding box from its two corners.
    ///
    /// Corners are normalized so that `upper_left` holds the minimum of
    /// each axis.
    pub fn new(upper_left: Point2<f64>, lower_right: Point2<f64>) -> Self {
        Self {
            upper_left: Point2::new(upper_left.x.min(lower_right.x), upper_left.y.min(lower_right.y)),
            lower_right: Point2::new(upper_left.x.max(lower_right.x), upper_left.y.max(lower_right.y)),
        }
    }

    /// Box of the given size centered on `center`.
    pub fn centered(center: Point2<f64>, size: Vector2<f64>) -> Self {
        let half = size / 2.0;
        Self::new(center - half, center + half)
    }

    pub fn width(&self) -> f64 {
        self.lower_right.x - self.upper_left.x
    }

    pub fn height(&self) -> f64 {
        self.lower_right.y - self.upper_left.y
    }

    pub fn size(&self) -> Vector2<f64> {
        self.lower_right - self.upper_left
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            upper_left: Point2::new(
                self.upper_left.x.min(other.upper_left.x),
                self.upper_left.y.min(other.upper_left.y),
            ),
            lower_right: Point2::new(
                self.lower_right.x.max(other.lower_right.x),
                self.lower_right.y.max(other.lower_right.y),
            ),
        }
    }

    /// Clip to the image rectangle `[0, width] x [0, height]`.
    pub fn clip(&self, width: f64, height: f64) -> BoundingBox {
        BoundingBox {
            upper_left: Point2::new(self.upper_left.x.clamp(0.0, width), self.upper_left.y.clamp(0.0, height)),
            lower_right: Point2::new(self.lower_right.x.clamp(0.0, width), self.lower_right.y.clamp(0.0, height)),
        }
    }
}

/// Payload of a tracked object.
///
/// Produced by segmentation and feature extraction; the class label is
/// filled in later by a classifier. Tracking only reads the centroid,
/// event selection only reads the label.
pub trait Sample {
    /// Object centroid in image coordinates.
    fn centroid(&self) -> Point2<f64>;

    /// Object bounding box.
    fn bbox(&self) -> BoundingBox;

    /// Class label assigned by the classifier, if any.
    fn label(&self) -> Option<i32>;

    /// Squared euclidean distance between the centroids of two samples.
    fn squared_distance<S: Sample + ?Sized>(&self, other: &S) -> f64 {
        nalgebra::distance_squared(&self.centroid(), &other.centroid())
    }
}

/// A segmented object with its centroid, bounding box and optional class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSample {
    /// Object centroid.
    pub centroid: Point2<f64>,

    /// Object bounding box.
    pub bbox: BoundingBox,

    /// Optional class label (set by the classifier).
    #[serde(default)]
    pub label: Option<i32>,
}

impl ObjectSample {
    /// Create a sample from a centroid and bounding box.
    pub fn new(centroid: Point2<f64>, bbox: BoundingBox) -> Self {
        Self {
            centroid,
            bbox,
            label: None,
        }
    }

    /// Create a sample from a centroid and a square half-extent.
    ///
    /// Convenience for callers that only know object positions.
    pub fn at(x: f64, y: f64, radius: f64) -> Result<Self> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(Error::InvalidSample(format!("radius must be non-negative, got {}", radius)));
        }
        if !(x.is_finite() && y.is_finite()) {
            return Err(Error::InvalidSample(format!("centroid ({}, {}) is not finite", x, y)));
        }

        let centroid = Point2::new(x, y);
        let half = Vector2::new(radius, radius);
        Ok(Self::new(centroid, BoundingBox::new(centroid - half, centroid + half)))
    }

    /// Builder-style setter for the class label.
    pub fn with_label(mut self, label: i32) -> Self {
        self.label = Some(label);
        self
    }
}

impl Sample for ObjectSample {
    fn centroid(&self) -> Point2<f64> {
        self.centroid
    }

    fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    fn label(&self) -> Option<i32> {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_at() {
        let sample = ObjectSample::at(10.0, 20.0, 5.0).unwrap();

        assert_relative_eq!(sample.centroid.x, 10.0);
        assert_relative_eq!(sample.bbox.upper_left.x, 5.0);
        assert_relative_eq!(sample.bbox.lower_right.y, 25.0);
        assert!(sample.label.is_none());
    }

    #[test]
    fn test_sample_at_invalid() {
        assert!(ObjectSample::at(0.0, 0.0, -1.0).is_err());
        assert!(ObjectSample::at(f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_squared_distance() {
        let a = ObjectSample::at(0.0, 0.0, 1.0).unwrap();
        let b = ObjectSample::at(3.0, 4.0, 1.0).unwrap();

        assert_relative_eq!(a.squared_distance(&b), 25.0, epsilon = 1e-10);
        assert_relative_eq!(b.squared_distance(&a), 25.0, epsilon = 1e-10);
    }

    #[test]
    fn test_with_label() {
        let sample = ObjectSample::at(1.0, 1.0, 1.0).unwrap().with_label(3);
        assert_eq!(Sample::label(&sample), Some(3));
    }

    #[test]
    fn test_bbox_normalizes_corners() {
        let bbox = BoundingBox::new(Point2::new(10.0, 2.0), Point2::new(4.0, 8.0));

        assert_eq!(bbox.upper_left, Point2::new(4.0, 2.0));
        assert_eq!(bbox.lower_right, Point2::new(10.0, 8.0));
        assert_relative_eq!(bbox.width(), 6.0);
        assert_relative_eq!(bbox.height(), 6.0);
    }

    #[test]
    fn test_bbox_union_and_clip() {
        let a = BoundingBox::new(Point2::new(-5.0, 0.0), Point2::new(5.0, 5.0));
        let b = BoundingBox::new(Point2::new(2.0, 3.0), Point2::new(12.0, 9.0));

        let union = a.union(&b);
        assert_eq!(union.upper_left, Point2::new(-5.0, 0.0));
        assert_eq!(union.lower_right, Point2::new(12.0, 9.0));

        let clipped = union.clip(10.0, 8.0);
        assert_eq!(clipped.upper_left, Point2::new(0.0, 0.0));
        assert_eq!(clipped.lower_right, Point2::new(10.0, 8.0));
    }

    #[test]
    fn test_bbox_centered() {
        let bbox = BoundingBox::centered(Point2::new(10.0, 10.0), Vector2::new(4.0, 6.0));

        assert_eq!(bbox.upper_left, Point2::new(8.0, 7.0));
        assert_eq!(bbox.lower_right, Point2::new(12.0, 13.0));
    }
}
