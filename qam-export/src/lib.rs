//! qam-export library
//!
//! The export pipeline core: everything between a collaborator's raw scene
//! data (vertex attribute values, polygon bone references, sampled bone
//! transforms) and a finished, gzip-compressed QAM container on disk.
//!
//! The collaborator walks its scene graph and feeds plain data in; this
//! crate partitions polygons into bone-limited groups, deduplicates
//! vertices (via `qam-common`), reduces sampled keyframe tracks within an
//! error bound, and writes the assembled tag tree. Scene traversal,
//! coordinate conversion and argument parsing stay on the collaborator's
//! side.

pub mod approx;
pub mod bone_groups;
pub mod config;
pub mod keyframes;
pub mod writer;

pub use approx::{Approximator, IntervalDeviation, RefineState};
pub use bone_groups::{partition, BoneGroup, Partition, PartitionError};
pub use config::ExportConfig;
pub use keyframes::{reduce_node_tracks, reduce_track, TrackChannel};
pub use writer::{pack_model, write_model};
