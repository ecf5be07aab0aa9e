//! Event selection configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Range value meaning "extend to the root (backward) or a leaf (forward)".
pub const UNBOUNDED_RANGE: i32 = -1;

/// Pattern a trajectory has to match around a label transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSelectionConfig {
    /// Label transitions `(before, after)` that anchor an event.
    pub transitions: Vec<(i32, i32)>,

    /// Labels allowed after the event, within `forward_check`.
    pub forward_labels: BTreeSet<i32>,

    /// Labels allowed before the event, outside the `backward_check` window.
    pub backward_labels: BTreeSet<i32>,

    /// Frames before the event (not counting the event frame); `-1` extends to the root.
    pub backward_range: i32,

    /// Frames after the event; `-1` extends to a leaf.
    pub forward_range: i32,

    /// Treat `backward_range` as a minimum and extend to the root.
    pub backward_range_min: bool,

    /// Treat `forward_range` as a minimum and extend to a leaf.
    pub forward_range_min: bool,

    /// Number of frames directly before the event exempt from the backward label check.
    pub backward_check: i32,

    /// Number of frames after the event subject to the forward label check; negative checks all.
    pub forward_check: i32,

    /// Maximum in-degree of nodes on the forward walk.
    pub max_in_degree: usize,

    /// Maximum out-degree of nodes on the forward walk.
    pub max_out_degree: usize,

    /// At a split, one daughter satisfying the forward check is enough.
    pub allow_one_daughter_cell: bool,
}

impl EventSelectionConfig {
    /// Create a configuration for a single transition with exact ranges.
    ///
    /// # Arguments
    /// * `transition` - `(label_before, label_after)`
    /// * `backward_range` - Frames before the event
    /// * `forward_range` - Frames after the event
    pub fn new(transition: (i32, i32), backward_range: i32, forward_range: i32) -> Self {
        Self {
            transitions: vec![transition],
            backward_labels: BTreeSet::from([transition.0]),
            forward_labels: BTreeSet::from([transition.1]),
            backward_range,
            forward_range,
            ..Self::default()
        }
    }

    /// Check the configuration for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.backward_range < UNBOUNDED_RANGE {
            return Err(Error::InvalidConfig(format!(
                "backward_range must be -1 or non-negative, got {}",
                self.backward_range
            )));
        }

        if self.forward_range < UNBOUNDED_RANGE {
            return Err(Error::InvalidConfig(format!(
                "forward_range must be -1 or non-negative, got {}",
                self.forward_range
            )));
        }

        Ok(())
    }

    /// Whether `(before, after)` is one of the configured transitions.
    pub fn is_transition(&self, before: i32, after: i32) -> bool {
        self.transitions.iter().any(|&(b, a)| b == before && a == after)
    }

    /// Track length when both ranges are exact, counting the event frame.
    ///
    /// The frame after the transition is always part of the track, so a
    /// forward range of 0 counts as 1. `None` when either range is unbounded
    /// or a minimum, in which case the length follows the discovered
    /// trajectory.
    pub fn nominal_length(&self) -> Option<usize> {
        let exact = |range: i32, min: bool| if min || range < 0 { None } else { Some(range as usize) };

        let backward = exact(self.backward_range, self.backward_range_min)?;
        let forward = exact(self.forward_range, self.forward_range_min)?.max(1);
        Some(backward + forward + 1)
    }
}

impl Default for EventSelectionConfig {
    fn default() -> Self {
        Self {
            transitions: Vec::new(),
            forward_labels: BTreeSet::new(),
            backward_labels: BTreeSet::new(),
            backward_range: 20,
            forward_range: 30,
            backward_range_min: false,
            forward_range_min: false,
            backward_check: 0,
            forward_check: 2,
            max_in_degree: 1,
            max_out_degree: 2,
            allow_one_daughter_cell: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = EventSelectionConfig::new((1, 2), 3, 4);

        assert_eq!(config.transitions, vec![(1, 2)]);
        assert!(config.backward_labels.contains(&1));
        assert!(config.forward_labels.contains(&2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_invalid_ranges() {
        let mut config = EventSelectionConfig::new((1, 2), -2, 4);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        config.backward_range = UNBOUNDED_RANGE;
        config.forward_range = -5;
        assert!(config.validate().is_err());

        config.forward_range = UNBOUNDED_RANGE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_transition() {
        let mut config = EventSelectionConfig::new((1, 2), 1, 1);
        config.transitions.push((3, 4));

        assert!(config.is_transition(1, 2));
        assert!(config.is_transition(3, 4));
        assert!(!config.is_transition(2, 1));
        assert!(!config.is_transition(1, 4));
    }

    #[test]
    fn test_nominal_length() {
        let mut config = EventSelectionConfig::new((1, 2), 2, 3);
        assert_eq!(config.nominal_length(), Some(6));

        config.forward_range = 0;
        assert_eq!(config.nominal_length(), Some(4));

        config.forward_range_min = true;
        assert_eq!(config.nominal_length(), None);

        config.forward_range_min = false;
        config.backward_range = UNBOUNDED_RANGE;
        assert_eq!(config.nominal_length(), None);
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: EventSelectionConfig =
            serde_json::from_str(r#"{"transitions": [[1, 2]], "backward_range": 5}"#).unwrap();

        assert_eq!(config.transitions, vec![(1, 2)]);
        assert_eq!(config.backward_range, 5);
        assert_eq!(config.forward_range, 30);
        assert!(config.allow_one_daughter_cell);
    }
}
