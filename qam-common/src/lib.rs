//! Shared types and utilities for the QAM model pipeline
//!
//! This crate provides the in-memory model that the exporter assembles and
//! packs into the tag-tree container:
//!
//! # Modules
//!
//! - [`attribute`] - Typed vertex attributes with fixed-precision canonicalization
//! - [`vertex`] - Vertex records and bone-influence finalization
//! - [`mesh`] - Meshes with content-addressed vertex dedup, mesh parts
//! - [`model`] - Model / node / material / animation containers
//! - [`packing`] - The 4-byte-per-float reinterpretation packing
//! - [`transform`] - Default-transform predicates (epsilon comparisons)
//!
//! Everything here is pure, single-threaded and I/O-free; `&mut` receivers
//! enforce the one-writer-per-mesh rule at compile time.

pub mod attribute;
pub mod error;
pub mod mesh;
pub mod model;
pub mod packing;
pub mod transform;
pub mod vertex;

pub use attribute::{AttributeKind, VertexAttribute, canonicalize, FROUND_EPSILON};
pub use error::ModelError;
pub use mesh::{Mesh, MeshPart};
pub use model::{
    Animation, Bone, BoundBox, Keyframe, Material, Model, Node, NodeAnimation, NodePart,
    SeparateKeyframe, Texture,
};
pub use packing::{pack4_bytes, pack_unorm4, unpack4_bytes};
pub use transform::{
    is_default_rotation, is_default_scale, is_default_translation, DEFAULT_ROTATION,
    DEFAULT_SCALE, DEFAULT_TRANSLATION,
};
pub use vertex::Vertex;
