//! Trajectory event selection.
//!
//! Searches a completed tracking graph for trajectories around a label
//! transition (e.g. interphase to prophase at mitosis onset):
//!
//! - `EventSelectionConfig` - transitions, label sets, ranges and degree bounds
//! - `EventSelection` - the search, plus bounding boxes of the found tracks
//! - `Events` - matched `EventRecord`s and the full trajectory tree per root

mod bboxes;
mod config;
mod record;
mod trajectory;
mod walk;

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace, warn};

pub use bboxes::{BBoxOptions, TrackFrameBox};
pub use config::{EventSelectionConfig, UNBOUNDED_RANGE};
pub use record::{EventRecord, Events, FullTrajectory, TrackKey};

use crate::graph::Graph;
use crate::sample::Sample;
use crate::{NodeId, Result};
use walk::{backward_walk, forward_walk};

/// Finds label-transition events in a tracking graph.
#[derive(Debug, Clone)]
pub struct EventSelection {
    config: EventSelectionConfig,
}

impl EventSelection {
    /// Create an event selection with a validated configuration.
    pub fn new(config: EventSelectionConfig) -> Result<Self> {
        config.validate()?;

        if config.transitions.is_empty() {
            warn!("no transitions configured, no events will be found");
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &EventSelectionConfig {
        &self.config
    }

    /// Search the graph for events and linearize every root's trajectory tree.
    ///
    /// Roots are visited in chronological order. A graph without matches
    /// yields empty `records`, never an error.
    pub fn find_events<S: Sample, E>(&self, graph: &Graph<S, E>) -> Result<Events> {
        let mut events = Events::default();
        let mut checked: HashSet<NodeId> = HashSet::new();

        for root in graph.roots() {
            let walk = trajectory::walk_trajectory(graph, root)?;

            for &node_id in &walk.visited {
                // Nodes below a merge are reachable from several roots
                if !checked.insert(node_id) {
                    continue;
                }
                if graph.in_degree(&node_id)? != 1 || graph.out_degree(&node_id)? != 1 {
                    continue;
                }

                let Some(&next_id) = graph.successors(&node_id)?.first() else {
                    continue;
                };
                if !self.is_event(graph.node_data(&node_id)?, graph.node_data(&next_id)?) {
                    continue;
                }

                trace!(event = %node_id, "transition found");
                for (key, record) in self.extract_tracks(graph, node_id, next_id)? {
                    if events.records.contains_key(&key) {
                        trace!(key = %key, event = %node_id, "track start already taken");
                        continue;
                    }
                    events.records.insert(key, record);
                }
            }

            events.trajectories.insert(root, walk.branches);
        }

        debug!(
            roots = events.trajectories.len(),
            events = events.records.len(),
            "event selection finished"
        );

        Ok(events)
    }

    /// Bounding boxes of every event track, per time step.
    pub fn bboxes<S: Sample, E>(
        &self,
        graph: &Graph<S, E>,
        events: &Events,
        options: &BBoxOptions,
    ) -> Result<BTreeMap<TrackKey, Vec<TrackFrameBox>>> {
        bboxes::track_bboxes(graph, events, options)
    }

    fn is_event<S: Sample>(&self, sample: &S, next: &S) -> bool {
        match (sample.label(), next.label()) {
            (Some(before), Some(after)) => self.config.is_transition(before, after),
            _ => false,
        }
    }

    // Internal: backward and forward checks around one transition
    fn extract_tracks<S: Sample, E>(
        &self,
        graph: &Graph<S, E>,
        event_id: NodeId,
        next_id: NodeId,
    ) -> Result<Vec<(TrackKey, EventRecord)>> {
        let Some(backward) = backward_walk(graph, &self.config, event_id)? else {
            trace!(event = %event_id, "backward check failed");
            return Ok(Vec::new());
        };
        let Some(forward) = forward_walk(graph, &self.config, next_id)? else {
            trace!(event = %event_id, "forward check failed");
            return Ok(Vec::new());
        };

        let mut prefix: Vec<NodeId> = backward.into_iter().rev().collect();
        prefix.extend(forward.nodes);
        let start = prefix[0];

        let (split_id, candidates) = match forward.split {
            None => (None, vec![(TrackKey::new(start), prefix)]),
            Some(split) => {
                let candidates: Vec<(TrackKey, Vec<NodeId>)> = split
                    .daughters
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, daughter)| {
                        let mut track = prefix.clone();
                        track.extend(daughter?);
                        Some((TrackKey::daughter(start, index + 1), track))
                    })
                    .collect();
                (Some(split.node), candidates)
            }
        };

        let max_length = self
            .config
            .nominal_length()
            .or_else(|| candidates.iter().map(|(_, track)| track.len()).max())
            .unwrap_or(0);

        Ok(candidates
            .into_iter()
            .map(|(key, track)| {
                let record = EventRecord {
                    event_id,
                    split_id,
                    max_length,
                    tracks: vec![fit_length(track, max_length)],
                };
                (key, record)
            })
            .collect())
    }
}

/// Truncate a track, or pad it by repeating its last node, to `length`.
fn fit_length(mut track: Vec<NodeId>, length: usize) -> Vec<NodeId> {
    if let Some(&last) = track.last() {
        track.resize(length, last);
    }
    track
}
