//! Backward and forward walks around a candidate event.

use std::collections::BTreeSet;

use super::config::{EventSelectionConfig, UNBOUNDED_RANGE};
use crate::graph::Graph;
use crate::sample::Sample;
use crate::{NodeId, Result};

/// Nodes collected by a successful forward walk.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ForwardWalk {
    /// Nodes up to and including the split node (or the whole walk without a split).
    pub nodes: Vec<NodeId>,
    pub split: Option<Split>,
}

/// The first split met by a forward walk.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Split {
    pub node: NodeId,
    /// One entry per out-edge of the split node; `None` where the daughter failed.
    pub daughters: Vec<Option<Vec<NodeId>>>,
}

fn has_label<S: Sample>(sample: &S, labels: &BTreeSet<i32>) -> bool {
    sample.label().map_or(false, |label| labels.contains(&label))
}

/// Whether a walk may stop at `level`.
///
/// `terminal` is true at a root (backward) or leaf (forward).
fn reached_end(range: i32, range_min: bool, level: i32, terminal: bool) -> bool {
    if range == UNBOUNDED_RANGE {
        terminal
    } else if range_min {
        level >= range && terminal
    } else {
        level >= range
    }
}

/// Walk from the event node towards the root.
///
/// Returns the visited nodes starting with `event_id`, or `None` when the
/// walk hits a branch, a label outside `backward_labels`, or a root too early.
pub(crate) fn backward_walk<S: Sample, E>(
    graph: &Graph<S, E>,
    config: &EventSelectionConfig,
    event_id: NodeId,
) -> Result<Option<Vec<NodeId>>> {
    let mut nodes = Vec::new();
    let mut node_id = event_id;
    let mut level = 0;

    loop {
        // The event node's label is fixed by the transition itself
        if level > 0
            && level > config.backward_check
            && !has_label(graph.node_data(&node_id)?, &config.backward_labels)
        {
            return Ok(None);
        }
        nodes.push(node_id);

        let in_degree = graph.in_degree(&node_id)?;
        if reached_end(config.backward_range, config.backward_range_min, level, in_degree == 0) {
            return Ok(Some(nodes));
        }
        if in_degree != 1 {
            return Ok(None);
        }

        let Some(predecessor) = graph.predecessors(&node_id)?.first().copied() else {
            return Ok(None);
        };
        if graph.out_degree(&predecessor)? != 1 {
            return Ok(None);
        }

        node_id = predecessor;
        level += 1;
    }
}

/// Walk from the node following the event towards the leaves.
///
/// The first split is followed into every daughter; the walk succeeds if
/// one (`allow_one_daughter_cell`) or all daughters succeed.
pub(crate) fn forward_walk<S: Sample, E>(
    graph: &Graph<S, E>,
    config: &EventSelectionConfig,
    start: NodeId,
) -> Result<Option<ForwardWalk>> {
    walk_forward(graph, config, start, 1, true)
}

fn walk_forward<S: Sample, E>(
    graph: &Graph<S, E>,
    config: &EventSelectionConfig,
    start: NodeId,
    start_level: i32,
    follow_split: bool,
) -> Result<Option<ForwardWalk>> {
    let mut nodes = Vec::new();
    let mut node_id = start;
    let mut level = start_level;

    loop {
        if graph.in_degree(&node_id)? > config.max_in_degree {
            return Ok(None);
        }
        let in_window = config.forward_check < 0 || level <= config.forward_check;
        if in_window && !has_label(graph.node_data(&node_id)?, &config.forward_labels) {
            return Ok(None);
        }
        nodes.push(node_id);

        let out_degree = graph.out_degree(&node_id)?;
        if reached_end(config.forward_range, config.forward_range_min, level, out_degree == 0) {
            return Ok(Some(ForwardWalk { nodes, split: None }));
        }
        if out_degree == 0 || out_degree > config.max_out_degree {
            return Ok(None);
        }

        let successors = graph.successors(&node_id)?;

        if out_degree > 1 && follow_split {
            let mut daughters = Vec::with_capacity(successors.len());
            for &daughter in &successors {
                let walk = walk_forward(graph, config, daughter, level + 1, false)?;
                daughters.push(walk.map(|w| w.nodes));
            }

            let passed = daughters.iter().filter(|d| d.is_some()).count();
            let accepted = if config.allow_one_daughter_cell {
                passed > 0
            } else {
                passed == daughters.len()
            };
            if !accepted {
                return Ok(None);
            }

            return Ok(Some(ForwardWalk {
                nodes,
                split: Some(Split { node: node_id, daughters }),
            }));
        }

        // Later splits are followed along their first daughter only
        node_id = successors[0];
        level += 1;
    }
}
