//! Node identifiers for the tracking graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Frame index within a position's time-lapse.
pub type FrameIndex = i32;

/// Label of a segmented object within a single frame.
pub type ObjectLabel = i32;

/// Identifier of a graph node.
///
/// Built from `(frame, object_label, branch)`. The string form is
/// `"{frame}_{object_label}_{branch}"` and parses back losslessly.
/// Ordering is by frame first, which gives chronological iteration when
/// ids are used as `BTreeMap` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Frame the object was observed in.
    pub frame: FrameIndex,
    /// Object label within the frame.
    pub object_label: ObjectLabel,
    /// Branch number (1 unless the object was duplicated).
    pub branch: i32,
}

impl NodeId {
    /// Create an id on the default branch.
    pub fn new(frame: FrameIndex, object_label: ObjectLabel) -> Self {
        Self::with_branch(frame, object_label, 1)
    }

    /// Create an id with an explicit branch number.
    pub fn with_branch(frame: FrameIndex, object_label: ObjectLabel, branch: i32) -> Self {
        Self {
            frame,
            object_label,
            branch,
        }
    }

    /// Decompose into the `(frame, object_label, branch)` triple.
    pub fn parts(&self) -> (FrameIndex, ObjectLabel, i32) {
        (self.frame, self.object_label, self.branch)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.frame, self.object_label, self.branch)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidNodeId(s.to_string());

        // Split from the right: the frame may be negative, but the label and
        // branch never contain '_' either way.
        let mut parts = s.rsplitn(3, '_');
        let branch = parts.next().ok_or_else(invalid)?;
        let label = parts.next().ok_or_else(invalid)?;
        let frame = parts.next().ok_or_else(invalid)?;

        Ok(Self {
            frame: frame.parse().map_err(|_| invalid())?,
            object_label: label.parse().map_err(|_| invalid())?,
            branch: branch.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
