//! # lineage-rs - Cell Lineage Tracking
//!
//! Links segmented objects of a time-lapse into a lineage graph and searches
//! that graph for trajectories around a class-label transition (for example
//! the onset of mitosis).
//!
//! ## Features
//!
//! - Frame-by-frame nearest-neighbor tracking with merge/split disambiguation
//! - Tolerance for empty or missing frames
//! - Event selection with backward/forward label checks and split handling
//! - Full root-to-leaf trajectory export and per-track bounding boxes
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::collections::BTreeMap;
//! use lineage_rs::{EventSelection, EventSelectionConfig, ObjectSample, Tracker, TrackerConfig};
//!
//! // Track objects
//! let mut tracker = Tracker::new(TrackerConfig::new(20.0, 3, 2)).unwrap();
//! let objects = BTreeMap::from([(1, ObjectSample::at(100.0, 100.0, 8.0).unwrap())]);
//! tracker.track_next_frame(0, objects).unwrap();
//!
//! // Search the classified graph for events
//! let selection = EventSelection::new(EventSelectionConfig::new((1, 2), 5, 10)).unwrap();
//! let events = selection.find_events(tracker.graph()).unwrap();
//! ```

// Public modules
pub mod events;
pub mod graph;
pub mod node_id;
pub mod sample;
pub mod settings;
pub mod tracker;

// Re-exports for convenience
pub use events::{EventRecord, EventSelection, EventSelectionConfig, Events, TrackKey};
pub use graph::{EdgeId, Graph};
pub use node_id::{FrameIndex, NodeId, ObjectLabel};
pub use sample::{BoundingBox, ObjectSample, Sample};
pub use settings::Settings;
pub use tracker::{Tracker, TrackerConfig};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    use crate::graph::EdgeId;
    use crate::node_id::NodeId;

    /// Errors that can occur in lineage tracking
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Duplicate node: {0}")]
        DuplicateNode(NodeId),

        #[error("Unknown node: {0}")]
        UnknownNode(NodeId),

        #[error("Unknown edge: {0}")]
        UnknownEdge(EdgeId),

        #[error("Invalid node id: {0:?}")]
        InvalidNodeId(String),

        #[error("Invalid sample: {0}")]
        InvalidSample(String),

        /// Raised by annotation stages that write classes into node payloads.
        #[error("Inconsistent annotation: {0}")]
        InconsistentAnnotation(String),

        #[error("Configuration parse error: {0}")]
        ConfigParse(#[from] serde_json::Error),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),
    }

    /// Result type for lineage operations
    pub type Result<T> = std::result::Result<T, Error>;
}
