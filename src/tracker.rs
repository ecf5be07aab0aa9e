//! Frame-by-frame lineage tracker.
//!
//! Objects of each frame are linked to the objects of the closest preceding
//! non-empty frame by nearest-neighbor matching. Ambiguous matches are
//! resolved locally: links that are unambiguous from the predecessor's side
//! win, and only if none exist does the closest predecessor get the link.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::graph::Graph;
use crate::node_id::{FrameIndex, NodeId, ObjectLabel};
use crate::sample::Sample;
use crate::{Error, Result};

/// Configuration for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum centroid distance (in pixels) between linked objects.
    pub max_object_distance: f64,

    /// Number of nearest candidates considered per object.
    pub max_node_degree: usize,

    /// Maximum number of frames bridged when linking across empty or missing frames.
    pub max_frame_gap: i32,
}

impl TrackerConfig {
    /// Create a new tracker configuration.
    ///
    /// # Arguments
    /// * `max_object_distance` - Maximum link distance in pixels
    /// * `max_node_degree` - Candidates considered per object
    /// * `max_frame_gap` - Largest frame gap that is still linked
    pub fn new(max_object_distance: f64, max_node_degree: usize, max_frame_gap: i32) -> Self {
        Self {
            max_object_distance,
            max_node_degree,
            max_frame_gap,
        }
    }

    /// Check the configuration for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_gap < 1 {
            return Err(Error::InvalidConfig(format!(
                "max_frame_gap must be positive, got {}",
                self.max_frame_gap
            )));
        }

        if self.max_node_degree < 1 {
            return Err(Error::InvalidConfig(
                "max_node_degree must be at least 1".to_string(),
            ));
        }

        if !(self.max_object_distance.is_finite() && self.max_object_distance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "max_object_distance must be a positive number, got {}",
                self.max_object_distance
            )));
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(30.0, 3, 3)
    }
}

/// Lineage tracker.
///
/// Builds a [`Graph`] from per-frame object detections. Frames must be
/// ingested in non-decreasing order.
#[derive(Debug)]
pub struct Tracker<S> {
    /// Tracker configuration.
    config: TrackerConfig,

    /// Object labels per ingested frame, in insertion order.
    frame_to_labels: BTreeMap<FrameIndex, Vec<ObjectLabel>>,

    /// The tracking graph.
    graph: Graph<S>,
}

impl<S: Sample> Tracker<S> {
    /// Create a new tracker with the given configuration.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            frame_to_labels: BTreeMap::new(),
            graph: Graph::new(),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph<S> {
        &self.graph
    }

    /// Mutable graph access, e.g. to attach class labels after tracking.
    pub fn graph_mut(&mut self) -> &mut Graph<S> {
        &mut self.graph
    }

    /// Consume the tracker and hand over the graph.
    pub fn into_graph(self) -> Graph<S> {
        self.graph
    }

    /// Ingested frame indices in ascending order.
    pub fn frames(&self) -> Vec<FrameIndex> {
        self.frame_to_labels.keys().copied().collect()
    }

    /// Object labels recorded for a frame, in insertion order.
    pub fn labels_in_frame(&self, frame: FrameIndex) -> Option<&[ObjectLabel]> {
        self.frame_to_labels.get(&frame).map(Vec::as_slice)
    }

    /// Add the objects of one frame and link them to the closest preceding frame.
    ///
    /// A frame may be passed more than once; only the newly added objects
    /// are linked. If any object is already tracked, nothing is added.
    ///
    /// # Arguments
    /// * `frame` - Frame index (must not decrease between calls)
    /// * `samples` - Objects of the frame, keyed by object label
    pub fn track_next_frame(&mut self, frame: FrameIndex, samples: BTreeMap<ObjectLabel, S>) -> Result<()> {
        if let Some(&label) = samples
            .keys()
            .find(|&&label| self.graph.contains_node(&NodeId::new(frame, label)))
        {
            return Err(Error::DuplicateNode(NodeId::new(frame, label)));
        }

        let labels = self.frame_to_labels.entry(frame).or_default();
        let mut added = Vec::with_capacity(samples.len());

        for (label, sample) in samples {
            self.graph.add_node(NodeId::new(frame, label), sample)?;
            labels.push(label);
            added.push(label);
        }

        if !added.is_empty() {
            self.connect_nodes(frame, &added)?;
        }

        Ok(())
    }

    /// The nearest preceding frame with objects, if it lies within `max_frame_gap`.
    pub fn closest_preceding_frame(&self, frame: FrameIndex) -> Option<FrameIndex> {
        let (&preceding, _) = self
            .frame_to_labels
            .range(..frame)
            .rev()
            .find(|(_, labels)| !labels.is_empty())?;

        if frame - preceding <= self.config.max_frame_gap {
            Some(preceding)
        } else {
            None
        }
    }

    // Internal: link `current_labels` of `frame` to the closest preceding frame
    fn connect_nodes(&mut self, frame: FrameIndex, current_labels: &[ObjectLabel]) -> Result<()> {
        let Some(preceding) = self.closest_preceding_frame(frame) else {
            trace!(frame, "no preceding frame within gap, all objects start new tracks");
            return Ok(());
        };

        let Some(previous_labels) = self.frame_to_labels.get(&preceding) else {
            return Ok(());
        };

        let max_distance2 = self.config.max_object_distance * self.config.max_object_distance;

        // Candidate successors per predecessor and candidate predecessors per successor
        let mut splits: BTreeMap<NodeId, Vec<(f64, NodeId)>> = BTreeMap::new();
        let mut merges: BTreeMap<NodeId, Vec<(f64, NodeId)>> = BTreeMap::new();
        // Successors in the order they first became a candidate
        let mut merge_order: Vec<NodeId> = Vec::new();

        for &previous_label in previous_labels {
            let previous_id = NodeId::new(preceding, previous_label);
            let previous_sample = self.graph.node_data(&previous_id)?;

            let mut candidates: Vec<(f64, NodeId)> = Vec::new();
            for &current_label in current_labels {
                let current_id = NodeId::new(frame, current_label);
                let dist = previous_sample.squared_distance(self.graph.node_data(&current_id)?);
                if dist < max_distance2 {
                    candidates.push((dist, current_id));
                }
            }

            if candidates.is_empty() {
                continue;
            }

            // Stable sort keeps label order for equal distances
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
            candidates.truncate(self.config.max_node_degree);

            for &(dist, current_id) in &candidates {
                let entry = merges.entry(current_id).or_insert_with(|| {
                    merge_order.push(current_id);
                    Vec::new()
                });
                entry.push((dist, previous_id));
            }
            splits.insert(previous_id, candidates);
        }

        let mut links: Vec<(NodeId, NodeId)> = Vec::new();
        for current_id in merge_order {
            let Some(predecessors) = merges.get(&current_id) else {
                continue;
            };

            if predecessors.len() == 1 {
                links.push((predecessors[0].1, current_id));
                continue;
            }

            // Ambiguous: keep predecessors for which this is the only candidate
            let mut connected = false;
            for &(_, previous_id) in predecessors {
                if splits.get(&previous_id).map_or(false, |s| s.len() == 1) {
                    links.push((previous_id, current_id));
                    connected = true;
                }
            }

            if !connected {
                if let Some(&(_, closest)) = predecessors.iter().min_by(|a, b| a.0.total_cmp(&b.0)) {
                    links.push((closest, current_id));
                }
            }
        }

        for &(head, tail) in &links {
            self.graph.add_edge(head, tail, None)?;
        }

        debug!(
            frame,
            preceding,
            links = links.len(),
            merges = merges.values().filter(|p| p.len() > 1).count(),
            splits = splits.values().filter(|c| c.len() > 1).count(),
            "connected frame"
        );

        Ok(())
    }
}
