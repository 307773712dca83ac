//! Meshes, mesh parts, and the content-addressed vertex store

use hashbrown::HashMap;
use smallvec::SmallVec;

use qam_nbt::{Tag, TagCompound, TagList, TagType};

use crate::attribute::AttributeKind;
use crate::packing::{pack4_bytes, pack_unorm4};
use crate::vertex::Vertex;

/// Part indices above this value force the wide index array encoding.
const MAX_USHORT_INDEX: u32 = (1 << 16) - 1;

/// A mesh: deduplicated vertices plus the parts indexing into them.
///
/// `add_vertex` is the content-addressed dedup entry point: structurally
/// identical vertices (after canonicalization) collapse to one stored
/// instance and one stable index. The hash bucket table keeps colliding
/// but unequal vertices apart by falling back to full value comparison.
#[derive(Debug, Default)]
pub struct Mesh {
    pub id: String,
    vertices: Vec<Vertex>,
    parts: Vec<MeshPart>,
    schema: Vec<AttributeKind>,
    buckets: HashMap<u64, SmallVec<[u32; 2]>>,
}

impl Mesh {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }

    /// Attribute kind sequence, available after `finalize_attributes`.
    pub fn schema(&self) -> &[AttributeKind] {
        &self.schema
    }

    /// Deduplicating insert: returns the index of an existing vertex with
    /// equal canonical content, or appends and returns the new index.
    ///
    /// The vertex must be fully finalized (influences included); its hash
    /// is computed exactly once, here.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        debug_assert!(
            self.vertices.is_empty()
                || self.vertices[0].schema().eq(vertex.schema()),
            "vertex schema differs from the mesh schema"
        );

        let hash = vertex.content_hash();
        let bucket = self.buckets.entry(hash).or_default();
        for &idx in bucket.iter() {
            if self.vertices[idx as usize] == vertex {
                return idx;
            }
        }
        let idx = self.vertices.len() as u32;
        self.vertices.push(vertex);
        bucket.push(idx);
        idx
    }

    pub fn add_part(&mut self, part: MeshPart) {
        self.parts.push(part);
    }

    /// Freeze the attribute layout once every vertex has been added.
    ///
    /// Captures the schema from the first vertex, equalizes the bone
    /// influence width across the mesh, packs bone index quadruplets into
    /// float bit patterns, and packs 4-component colors the same way.
    /// Call exactly once, after the last `add_vertex`.
    pub fn finalize_attributes(&mut self) {
        let Some(first) = self.vertices.first() else {
            return;
        };
        self.schema = first.schema().collect();

        let color_slot = self
            .schema
            .iter()
            .position(|k| *k == AttributeKind::Color);

        let bone_width = self
            .vertices
            .iter()
            .map(|v| v.weight_count())
            .max()
            .unwrap_or(0);

        if bone_width > 0 {
            // Index list width rounded up to whole quadruplets.
            let index_width = ((bone_width - 1) >> 2 << 2) + 4;
            for vertex in &mut self.vertices {
                pack_vertex_bones(vertex, bone_width, index_width);
            }
        }

        if let Some(slot) = color_slot {
            for vertex in &mut self.vertices {
                let attr = &mut vertex.attributes_mut()[slot];
                let v = attr.values();
                debug_assert_eq!(v.len(), 4, "color attributes carry 4 channels");
                let packed = pack_unorm4([v[0], v[1], v[2], v[3]]);
                attr.set_values_raw(vec![packed]);
            }
        }
    }

    /// Expanded attribute name schema, one entry per name the container
    /// expects. Empty before `finalize_attributes`.
    pub fn schema_names(&self) -> Vec<String> {
        let Some(first) = self.vertices.first() else {
            return Vec::new();
        };
        self.schema
            .iter()
            .zip(first.attributes())
            .flat_map(|(kind, attr)| kind.schema_names(attr.values().len()))
            .collect()
    }

    /// Pack into the container layout:
    /// `{ id, attributes: List<String>, vertices: FloatArray, parts }`.
    pub fn to_tag(&self) -> TagCompound {
        let names = self.schema_names();
        let flattened: Vec<f32> = self
            .vertices
            .iter()
            .flat_map(|v| v.attributes().iter().flat_map(|a| a.values().iter().copied()))
            .collect();

        let mut nbt = TagCompound::new();
        nbt.insert("id", Tag::String(self.id.clone()));
        nbt.insert(
            "attributes",
            Tag::List(TagList::of(
                TagType::String,
                names.into_iter().map(Tag::String).collect(),
            )),
        );
        nbt.insert("vertices", Tag::FloatArray(flattened));
        nbt.insert(
            "parts",
            Tag::List(TagList::of(
                TagType::Compound,
                self.parts.iter().map(|p| Tag::Compound(p.to_tag())).collect(),
            )),
        );
        nbt
    }
}

fn pack_vertex_bones(vertex: &mut Vertex, bone_width: usize, index_width: usize) {
    let indices_slot = vertex
        .attributes()
        .iter()
        .position(|a| a.kind == AttributeKind::BoneIndices);
    let weights_slot = vertex
        .attributes()
        .iter()
        .position(|a| a.kind == AttributeKind::BoneWeights);
    let (Some(indices_slot), Some(weights_slot)) = (indices_slot, weights_slot) else {
        return;
    };

    let attrs = vertex.attributes_mut();

    let mut weights = attrs[weights_slot].values().to_vec();
    weights.resize(bone_width, 0.0);
    attrs[weights_slot].set_values(weights);

    let mut indices = attrs[indices_slot].values().to_vec();
    indices.resize(index_width, 0.0);
    let packed: Vec<f32> = indices
        .chunks_exact(4)
        .map(|quad| {
            pack4_bytes([
                quad[0] as u8,
                quad[1] as u8,
                quad[2] as u8,
                quad[3] as u8,
            ])
        })
        .collect();
    attrs[indices_slot].set_values_raw(packed);
}

/// A triangle list indexing into its parent mesh's vertex array.
#[derive(Debug, Clone, Default)]
pub struct MeshPart {
    pub id: String,
    /// Primitive kind, "TRIANGLES" for everything this pipeline emits.
    pub primitive: String,
    indices: Vec<u32>,
    max_index: u32,
}

impl MeshPart {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primitive: "TRIANGLES".to_string(),
            ..Self::default()
        }
    }

    pub fn add_index(&mut self, index: u32) {
        self.indices.push(index);
        self.max_index = self.max_index.max(index);
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    /// Pack into the container layout. Index arrays use the compact
    /// unsigned-short encoding whenever every index fits.
    pub fn to_tag(&self) -> TagCompound {
        let mut nbt = TagCompound::new();
        nbt.insert("id", Tag::String(self.id.clone()));
        nbt.insert("type", Tag::String(self.primitive.clone()));
        if !self.indices.is_empty() {
            let indices = if self.max_index > MAX_USHORT_INDEX {
                Tag::IntArray(self.indices.iter().map(|&i| i as i32).collect())
            } else {
                Tag::UShortArray(self.indices.iter().map(|&i| i as u16).collect())
            };
            nbt.insert("indices", indices);
        }
        nbt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::VertexAttribute;
    use crate::packing::unpack4_bytes;

    fn vert(pos: [f32; 3]) -> Vertex {
        let mut v = Vertex::new();
        v.add(VertexAttribute::new(AttributeKind::Position, pos.to_vec()));
        v
    }

    #[test]
    fn test_dedup_returns_same_index() {
        let mut mesh = Mesh::new("m");
        let a = mesh.add_vertex(vert([1.0, 2.0, 3.0]));
        let b = mesh.add_vertex(vert([0.0, 0.0, 0.0]));
        let c = mesh.add_vertex(vert([1.0, 2.0, 3.0]));
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(mesh.vertex_count(), 2);
    }

    #[test]
    fn test_dedup_merges_within_canonical_tolerance() {
        let mut mesh = Mesh::new("m");
        let a = mesh.add_vertex(vert([1.0, 2.0, 3.0]));
        let b = mesh.add_vertex(vert([1.000_000_4, 2.0, 3.0]));
        assert_eq!(a, b);

        let c = mesh.add_vertex(vert([1.000_01, 2.0, 3.0]));
        assert_ne!(a, c);
        assert_eq!(mesh.vertex_count(), 2);
    }

    #[test]
    fn test_hash_collision_falls_back_to_equality() {
        // Force two unequal vertices into the same bucket by inserting the
        // second under the first one's hash.
        let mut mesh = Mesh::new("m");
        let a = vert([1.0, 0.0, 0.0]);
        let b = vert([2.0, 0.0, 0.0]);
        let ha = a.content_hash();

        let ia = mesh.add_vertex(a);
        // Simulate the collision: put b in a's bucket manually.
        let ib = mesh.vertices.len() as u32;
        mesh.vertices.push(b.clone());
        mesh.buckets.get_mut(&ha).unwrap().push(ib);

        // Looking b up through a's bucket must not merge it with a.
        let hit = mesh
            .buckets
            .get(&ha)
            .unwrap()
            .iter()
            .find(|&&i| mesh.vertices[i as usize] == b)
            .copied();
        assert_eq!(hit, Some(ib));
        assert_ne!(ia, ib);
    }

    #[test]
    fn test_finalize_packs_bone_indices() {
        let mut mesh = Mesh::new("m");
        let mut v = vert([0.0, 0.0, 0.0]);
        v.add_influence(3, 0.5);
        v.add_influence(7, 0.5);
        v.finalize_influences(8, 2);
        mesh.add_vertex(v);
        mesh.finalize_attributes();

        let attrs = mesh.vertices()[0].attributes();
        let indices = attrs
            .iter()
            .find(|a| a.kind == AttributeKind::BoneIndices)
            .unwrap();
        // Two influences round up to one packed quadruplet.
        assert_eq!(indices.values().len(), 1);
        assert_eq!(unpack4_bytes(indices.values()[0]), [3, 7, 0, 0]);

        let weights = attrs
            .iter()
            .find(|a| a.kind == AttributeKind::BoneWeights)
            .unwrap();
        assert_eq!(weights.values(), &[0.5, 0.5]);
    }

    #[test]
    fn test_finalize_equalizes_influence_width() {
        let mut mesh = Mesh::new("m");

        let mut a = vert([0.0, 0.0, 0.0]);
        for bone in 0..5 {
            a.add_influence(bone, 0.2);
        }
        a.finalize_influences(8, 4);
        mesh.add_vertex(a);

        let mut b = vert([1.0, 0.0, 0.0]);
        b.add_influence(1, 1.0);
        b.finalize_influences(8, 4);
        mesh.add_vertex(b);

        mesh.finalize_attributes();

        // Widest vertex has 8 weights (5 rounded up to the modulus), so
        // both carry 8 weights and 8/4 = 2 packed index floats.
        for v in mesh.vertices() {
            let w = v
                .attributes()
                .iter()
                .find(|x| x.kind == AttributeKind::BoneWeights)
                .unwrap();
            assert_eq!(w.values().len(), 8);
            let i = v
                .attributes()
                .iter()
                .find(|x| x.kind == AttributeKind::BoneIndices)
                .unwrap();
            assert_eq!(i.values().len(), 2);
        }
    }

    #[test]
    fn test_finalize_packs_color() {
        let mut mesh = Mesh::new("m");
        let mut v = Vertex::new();
        v.add(VertexAttribute::new(
            AttributeKind::Position,
            vec![0.0, 0.0, 0.0],
        ));
        v.add(VertexAttribute::new(
            AttributeKind::Color,
            vec![1.0, 0.0, 0.5, 1.0],
        ));
        mesh.add_vertex(v);
        mesh.finalize_attributes();

        let color = mesh.vertices()[0]
            .attributes()
            .iter()
            .find(|a| a.kind == AttributeKind::Color)
            .unwrap();
        assert_eq!(color.values().len(), 1);
        assert_eq!(unpack4_bytes(color.values()[0]), [255, 0, 128, 255]);
    }

    #[test]
    fn test_schema_names_after_finalize() {
        let mut mesh = Mesh::new("m");
        let mut v = vert([0.0, 0.0, 0.0]);
        v.add(VertexAttribute::new(
            AttributeKind::Normal,
            vec![0.0, 1.0, 0.0],
        ));
        v.add_influence(1, 0.6);
        v.add_influence(2, 0.4);
        v.finalize_influences(8, 4);
        mesh.add_vertex(v);
        mesh.finalize_attributes();

        assert_eq!(
            mesh.schema_names(),
            vec!["POSITION", "NORMAL", "BONEINDICES0", "BONEWEIGHTS04"]
        );
    }

    #[test]
    fn test_part_index_encoding() {
        let mut narrow = MeshPart::new("p0");
        narrow.add_index(0);
        narrow.add_index(65535);
        match narrow.to_tag().get("indices") {
            Some(Tag::UShortArray(v)) => assert_eq!(v, &vec![0u16, 65535]),
            other => panic!("unexpected {other:?}"),
        }

        let mut wide = MeshPart::new("p1");
        wide.add_index(65536);
        match wide.to_tag().get("indices") {
            Some(Tag::IntArray(v)) => assert_eq!(v, &vec![65536]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_mesh_tag_layout() {
        let mut mesh = Mesh::new("mesh0");
        mesh.add_vertex(vert([1.0, 2.0, 3.0]));
        mesh.add_vertex(vert([4.0, 5.0, 6.0]));
        let mut part = MeshPart::new("mesh0_part0");
        for i in [0, 1, 0] {
            part.add_index(i);
        }
        mesh.add_part(part);
        mesh.finalize_attributes();

        let tag = mesh.to_tag();
        assert_eq!(tag.get("id"), Some(&Tag::String("mesh0".into())));
        assert_eq!(
            tag.get("vertices"),
            Some(&Tag::FloatArray(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
        );
        match tag.get("parts") {
            Some(Tag::List(list)) => assert_eq!(list.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
