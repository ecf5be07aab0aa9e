//! Event selection results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::NodeId;

/// Key of an event record: the first node of the track, plus the 1-based
/// daughter index when the track passes through a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackKey {
    pub start: NodeId,
    pub daughter: Option<usize>,
}

impl TrackKey {
    pub fn new(start: NodeId) -> Self {
        Self { start, daughter: None }
    }

    pub fn daughter(start: NodeId, index: usize) -> Self {
        Self {
            start,
            daughter: Some(index),
        }
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.daughter {
            Some(index) => write!(f, "{}_{}", self.start, index),
            None => write!(f, "{}", self.start),
        }
    }
}

impl Serialize for TrackKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A trajectory matching the event pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Node carrying the first label of the matched transition.
    pub event_id: NodeId,

    /// Split node absorbed by the forward walk, if any.
    pub split_id: Option<NodeId>,

    /// Length of every track in `tracks`.
    pub max_length: usize,

    /// Node sequences of the trajectory, each of length `max_length`.
    pub tracks: Vec<Vec<NodeId>>,
}

/// Every root-to-leaf path starting at one root.
pub type FullTrajectory = Vec<Vec<NodeId>>;

/// Output of [`EventSelection::find_events`](super::EventSelection::find_events).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Events {
    /// Discovered event trajectories.
    pub records: BTreeMap<TrackKey, EventRecord>,

    /// Full trajectory tree of every root, for export.
    pub trajectories: BTreeMap<NodeId, FullTrajectory>,
}

impl Events {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &TrackKey) -> Option<&EventRecord> {
        self.records.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_key_display() {
        let start = NodeId::new(0, 4);

        assert_eq!(TrackKey::new(start).to_string(), "0_4_1");
        assert_eq!(TrackKey::daughter(start, 2).to_string(), "0_4_1_2");
    }

    #[test]
    fn test_track_key_ordering_groups_daughters() {
        let mut keys = vec![
            TrackKey::daughter(NodeId::new(0, 1), 2),
            TrackKey::new(NodeId::new(1, 1)),
            TrackKey::daughter(NodeId::new(0, 1), 1),
        ];
        keys.sort();

        assert_eq!(keys[0], TrackKey::daughter(NodeId::new(0, 1), 1));
        assert_eq!(keys[1], TrackKey::daughter(NodeId::new(0, 1), 2));
        assert_eq!(keys[2], TrackKey::new(NodeId::new(1, 1)));
    }

    #[test]
    fn test_events_serialize_with_string_keys() {
        let start = NodeId::new(0, 1);
        let mut events = Events::default();
        events.records.insert(
            TrackKey::daughter(start, 1),
            EventRecord {
                event_id: NodeId::new(2, 1),
                split_id: None,
                max_length: 1,
                tracks: vec![vec![start]],
            },
        );

        let json = serde_json::to_value(&events).unwrap();
        assert_eq!(json["records"]["0_1_1_1"]["event_id"], "2_1_1");
        assert_eq!(json["records"]["0_1_1_1"]["tracks"][0][0], "0_1_1");
    }
}
