//! Model validation errors

/// A model that must not be packed into a container.
///
/// These are the collaborator-visible guards: an entity failing one of
/// them would produce a corrupt compound, so packing is refused instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("model has no materials; at least one material is required")]
    NoMaterials,

    #[error("mesh '{0}' has no vertices")]
    EmptyMesh(String),

    #[error("part '{part}' references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        part: String,
        index: u32,
        vertex_count: usize,
    },
}
