//! Model, node, material and animation containers
//!
//! Ownership is strictly tree-shaped: the model owns meshes, materials,
//! nodes and animations; nodes own their parts and children. Nothing here
//! holds a back-pointer; parts address their mesh by id.
//!
//! Every container packs itself into the tag tree with `to_tag`. Optional
//! transform channels and empty sub-lists are omitted, keeping files
//! compact; readers fall back to the channel defaults.

use qam_nbt::{Tag, TagCompound, TagList, TagType};

use crate::error::ModelError;
use crate::mesh::Mesh;
use crate::transform::{DEFAULT_ROTATION, DEFAULT_SCALE, DEFAULT_TRANSLATION};

/// A complete exportable model.
#[derive(Debug, Default)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub nodes: Vec<Node>,
    pub animations: Vec<Animation>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_mesh(&self, mesh_id: &str) -> bool {
        self.meshes.iter().any(|m| m.id == mesh_id)
    }

    /// Collaborator-visible guards: a model failing these would pack into
    /// a corrupt compound, so packing must be refused instead.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.materials.is_empty() {
            return Err(ModelError::NoMaterials);
        }
        for mesh in &self.meshes {
            if mesh.vertex_count() == 0 {
                return Err(ModelError::EmptyMesh(mesh.id.clone()));
            }
            for part in mesh.parts() {
                if part.max_index() as usize >= mesh.vertex_count() {
                    return Err(ModelError::IndexOutOfRange {
                        part: part.id.clone(),
                        index: part.max_index(),
                        vertex_count: mesh.vertex_count(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("meshes", compound_list(self.meshes.iter().map(Mesh::to_tag)));
        nbt.insert(
            "materials",
            compound_list(self.materials.iter().map(Material::to_tag)),
        );
        nbt.insert("nodes", compound_list(self.nodes.iter().map(Node::to_tag)));
        nbt.insert(
            "animations",
            compound_list(self.animations.iter().map(Animation::to_tag)),
        );
        nbt
    }
}

fn compound_list(items: impl Iterator<Item = TagCompound>) -> Tag {
    Tag::List(TagList::of(
        TagType::Compound,
        items.map(Tag::Compound).collect(),
    ))
}

/// Ten floats: translation, w-first rotation, scale, with defaults for
/// omitted channels.
fn transform_array(
    translation: Option<[f32; 3]>,
    rotation: Option<[f32; 4]>,
    scale: Option<[f32; 3]>,
) -> Vec<f32> {
    let mut out = Vec::with_capacity(10);
    out.extend_from_slice(&translation.unwrap_or(DEFAULT_TRANSLATION));
    out.extend_from_slice(&rotation.unwrap_or(DEFAULT_ROTATION));
    out.extend_from_slice(&scale.unwrap_or(DEFAULT_SCALE));
    out
}

/// A scene-graph node binding mesh parts, materials and bones together.
#[derive(Debug, Default)]
pub struct Node {
    pub id: String,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub parts: Vec<NodePart>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("id", Tag::String(self.id.clone()));
        nbt.insert(
            "transform",
            Tag::FloatArray(transform_array(self.translation, self.rotation, self.scale)),
        );
        if !self.parts.is_empty() {
            nbt.insert(
                "parts",
                compound_list(self.parts.iter().map(NodePart::to_tag)),
            );
        }
        if !self.children.is_empty() {
            nbt.insert(
                "children",
                compound_list(self.children.iter().map(Node::to_tag)),
            );
        }
        nbt
    }
}

/// Binds one mesh part to a material and the bones its group references.
#[derive(Debug, Default)]
pub struct NodePart {
    pub mesh_part_id: String,
    pub material_id: String,
    pub bones: Vec<Bone>,
    pub bound_box: Option<BoundBox>,
}

impl NodePart {
    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("meshPartId", Tag::String(self.mesh_part_id.clone()));
        nbt.insert("materialId", Tag::String(self.material_id.clone()));
        if !self.bones.is_empty() {
            nbt.insert("bones", compound_list(self.bones.iter().map(Bone::to_tag)));
        }
        if let Some(bound_box) = &self.bound_box {
            nbt.insert("boundBox", bound_box.to_tag());
        }
        nbt
    }
}

/// Axis-aligned corner set of a part, one float triple per corner.
#[derive(Debug, Clone)]
pub struct BoundBox(pub Vec<[f32; 3]>);

impl BoundBox {
    pub fn to_tag(&self) -> Tag {
        Tag::List(TagList::of(
            TagType::FloatArray,
            self.0.iter().map(|c| Tag::FloatArray(c.to_vec())).collect(),
        ))
    }
}

/// A bone reference with its bind transform relative to the node.
#[derive(Debug, Default)]
pub struct Bone {
    pub node: String,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

impl Bone {
    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("node", Tag::String(self.node.clone()));
        nbt.insert(
            "transform",
            Tag::FloatArray(transform_array(self.translation, self.rotation, self.scale)),
        );
        nbt
    }
}

/// Material: named float-vector properties plus texture references.
#[derive(Debug, Default)]
pub struct Material {
    pub id: String,
    properties: Vec<(String, Vec<f32>)>,
    pub textures: Vec<Texture>,
}

impl Material {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set a property, replacing any existing value of the same name.
    pub fn set_property(&mut self, name: impl Into<String>, values: Vec<f32>) {
        let name = name.into();
        if let Some(slot) = self.properties.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = values;
        } else {
            self.properties.push((name, values));
        }
    }

    pub fn properties(&self) -> &[(String, Vec<f32>)] {
        &self.properties
    }

    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("id", Tag::String(self.id.clone()));
        for (name, values) in &self.properties {
            nbt.insert(name.clone(), Tag::FloatArray(values.clone()));
        }
        nbt.insert(
            "textures",
            compound_list(self.textures.iter().map(Texture::to_tag)),
        );
        nbt
    }
}

/// Reference to a texture image on disk.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub id: String,
    pub filename: String,
    /// Usage slot, e.g. "DIFFUSE" or "NORMAL".
    pub kind: String,
}

impl Texture {
    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("id", Tag::String(self.id.clone()));
        nbt.insert("fileName", Tag::String(self.filename.clone()));
        nbt.insert("type", Tag::String(self.kind.clone()));
        nbt
    }
}

/// One named clip: per-bone keyframe tracks over a total duration.
#[derive(Debug, Default)]
pub struct Animation {
    pub id: String,
    /// Clip length in milliseconds.
    pub time: f32,
    pub bones: Vec<NodeAnimation>,
}

impl Animation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("id", Tag::String(self.id.clone()));
        nbt.insert("time", Tag::Float(self.time));
        if !self.bones.is_empty() {
            nbt.insert(
                "bones",
                compound_list(self.bones.iter().map(NodeAnimation::to_tag)),
            );
        }
        nbt
    }
}

/// Keyframe tracks of one bone within a clip.
///
/// `keyframes` carries combined TRS keys; the three separate tracks carry
/// per-channel keys after approximation. Either representation may be
/// present; empty tracks are omitted from the container.
#[derive(Debug, Default)]
pub struct NodeAnimation {
    pub bone_id: String,
    pub keyframes: Vec<Keyframe>,
    pub translation: Vec<SeparateKeyframe>,
    pub rotation: Vec<SeparateKeyframe>,
    pub scale: Vec<SeparateKeyframe>,
}

impl NodeAnimation {
    pub fn new(bone_id: impl Into<String>) -> Self {
        Self {
            bone_id: bone_id.into(),
            ..Self::default()
        }
    }

    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("boneId", Tag::String(self.bone_id.clone()));
        if !self.keyframes.is_empty() {
            nbt.insert(
                "keyFrames",
                float_array_list(self.keyframes.iter().map(Keyframe::to_tag)),
            );
        }
        if !self.translation.is_empty() {
            nbt.insert(
                "translation",
                float_array_list(self.translation.iter().map(SeparateKeyframe::to_tag)),
            );
        }
        if !self.rotation.is_empty() {
            nbt.insert(
                "rotation",
                float_array_list(self.rotation.iter().map(SeparateKeyframe::to_tag)),
            );
        }
        if !self.scale.is_empty() {
            nbt.insert(
                "scaling",
                float_array_list(self.scale.iter().map(SeparateKeyframe::to_tag)),
            );
        }
        nbt
    }
}

fn float_array_list(items: impl Iterator<Item = Tag>) -> Tag {
    Tag::List(TagList::of(TagType::FloatArray, items.collect()))
}

/// A combined TRS keyframe. Omitted channels pack as their defaults.
#[derive(Debug, Clone, Default)]
pub struct Keyframe {
    /// Key time in milliseconds from clip start.
    pub keytime: f32,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

impl Keyframe {
    /// `[keytime, tx, ty, tz, qw, qx, qy, qz, sx, sy, sz]`.
    pub fn to_tag(&self) -> Tag {
        let mut values = vec![self.keytime];
        values.extend(transform_array(self.translation, self.rotation, self.scale));
        Tag::FloatArray(values)
    }

    pub fn separate_translation(&self) -> Option<SeparateKeyframe> {
        self.translation.map(|t| SeparateKeyframe {
            keytime: self.keytime,
            value: t.to_vec(),
        })
    }

    pub fn separate_rotation(&self) -> Option<SeparateKeyframe> {
        self.rotation.map(|r| SeparateKeyframe {
            keytime: self.keytime,
            value: r.to_vec(),
        })
    }

    pub fn separate_scale(&self) -> Option<SeparateKeyframe> {
        self.scale.map(|s| SeparateKeyframe {
            keytime: self.keytime,
            value: s.to_vec(),
        })
    }
}

/// A single-channel keyframe: key time plus the channel components.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparateKeyframe {
    /// Key time in milliseconds from clip start.
    pub keytime: f32,
    pub value: Vec<f32>,
}

impl SeparateKeyframe {
    pub fn new(keytime: f32, value: Vec<f32>) -> Self {
        Self { keytime, value }
    }

    /// `[keytime, components...]`.
    pub fn to_tag(&self) -> Tag {
        let mut values = vec![self.keytime];
        values.extend_from_slice(&self.value);
        Tag::FloatArray(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeKind, VertexAttribute};
    use crate::mesh::MeshPart;
    use crate::vertex::Vertex;

    fn one_vertex_mesh(id: &str) -> Mesh {
        let mut mesh = Mesh::new(id);
        let mut v = Vertex::new();
        v.add(VertexAttribute::new(
            AttributeKind::Position,
            vec![0.0, 0.0, 0.0],
        ));
        mesh.add_vertex(v);
        mesh
    }

    #[test]
    fn test_validate_requires_materials() {
        let model = Model::new();
        assert_eq!(model.validate(), Err(ModelError::NoMaterials));
    }

    #[test]
    fn test_validate_rejects_empty_mesh() {
        let mut model = Model::new();
        model.materials.push(Material::new("mat"));
        model.meshes.push(Mesh::new("hollow"));
        assert_eq!(
            model.validate(),
            Err(ModelError::EmptyMesh("hollow".into()))
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let mut model = Model::new();
        model.materials.push(Material::new("mat"));
        let mut mesh = one_vertex_mesh("m");
        let mut part = MeshPart::new("m_part0");
        part.add_index(1);
        mesh.add_part(part);
        model.meshes.push(mesh);
        assert_eq!(
            model.validate(),
            Err(ModelError::IndexOutOfRange {
                part: "m_part0".into(),
                index: 1,
                vertex_count: 1,
            })
        );
    }

    #[test]
    fn test_model_tag_has_four_lists() {
        let tag = Model::new().to_tag();
        for key in ["meshes", "materials", "nodes", "animations"] {
            match tag.get(key) {
                Some(Tag::List(list)) => assert!(list.is_empty()),
                other => panic!("{key}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_node_transform_defaults() {
        let node = Node::new("root");
        match node.to_tag().get("transform") {
            Some(Tag::FloatArray(v)) => {
                assert_eq!(
                    v,
                    &vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_node_omits_empty_lists() {
        let tag = Node::new("root").to_tag();
        assert!(tag.get("parts").is_none());
        assert!(tag.get("children").is_none());
    }

    #[test]
    fn test_material_properties_in_order() {
        let mut mat = Material::new("mat");
        mat.set_property("diffuse", vec![1.0, 0.5, 0.25]);
        mat.set_property("roughness", vec![0.8]);
        mat.set_property("diffuse", vec![0.0, 0.0, 0.0]);
        let tag = mat.to_tag();
        assert_eq!(
            tag.get("diffuse"),
            Some(&Tag::FloatArray(vec![0.0, 0.0, 0.0]))
        );
        assert_eq!(tag.get("roughness"), Some(&Tag::FloatArray(vec![0.8])));
        // id, two properties, textures.
        assert_eq!(tag.len(), 4);
    }

    #[test]
    fn test_keyframe_layout() {
        let kf = Keyframe {
            keytime: 33.3,
            translation: Some([1.0, 2.0, 3.0]),
            rotation: None,
            scale: None,
        };
        match kf.to_tag() {
            Tag::FloatArray(v) => {
                assert_eq!(v.len(), 11);
                assert_eq!(&v[..4], &[33.3, 1.0, 2.0, 3.0]);
                assert_eq!(&v[4..8], &[1.0, 0.0, 0.0, 0.0]);
                assert_eq!(&v[8..], &[1.0, 1.0, 1.0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_separate_keyframe_layout() {
        let kf = SeparateKeyframe::new(10.0, vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            kf.to_tag(),
            Tag::FloatArray(vec![10.0, 1.0, 0.0, 0.0, 0.0])
        );
    }

    #[test]
    fn test_node_animation_omits_empty_tracks() {
        let mut anim = NodeAnimation::new("rig_spine");
        anim.translation
            .push(SeparateKeyframe::new(0.0, vec![0.0, 1.0, 0.0]));
        let tag = anim.to_tag();
        assert!(tag.get("translation").is_some());
        assert!(tag.get("rotation").is_none());
        assert!(tag.get("scaling").is_none());
        assert!(tag.get("keyFrames").is_none());
    }
}
