//! Vertex records and bone-influence finalization

use crate::attribute::{polynomial_hash, AttributeKind, VertexAttribute, FROUND_EPSILON};

/// Near-zero threshold for dropping bone weights and for deciding whether
/// a weight set needs renormalizing.
const WEIGHT_EPSILON: f32 = FROUND_EPSILON as f32;

/// One vertex: an ordered list of typed attributes.
///
/// The attribute kind sequence (schema) is fixed by the first vertex added
/// to a mesh; every later vertex must present the same sequence.
///
/// Bone influences are staged as raw (bone, weight) pairs and only become
/// BoneIndices/BoneWeights attributes in [`finalize_influences`], after
/// which the content hash is stable. There is no lazy hash cache to
/// invalidate: the hash is computed exactly once, when the vertex enters
/// the store.
///
/// [`finalize_influences`]: Vertex::finalize_influences
#[derive(Debug, Clone, Default)]
pub struct Vertex {
    attributes: Vec<VertexAttribute>,
    influences: Vec<(u32, f32)>,
}

impl Vertex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute. Order is significant.
    pub fn add(&mut self, attribute: VertexAttribute) {
        self.attributes.push(attribute);
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut [VertexAttribute] {
        &mut self.attributes
    }

    /// Attribute kind sequence.
    pub fn schema(&self) -> impl Iterator<Item = AttributeKind> + '_ {
        self.attributes.iter().map(|a| a.kind)
    }

    /// Stage one bone influence for later finalization.
    pub fn add_influence(&mut self, bone: u32, weight: f32) {
        self.influences.push((bone, weight));
    }

    /// Turn staged influences into BoneIndices/BoneWeights attributes.
    ///
    /// Near-zero weights are dropped, the rest are sorted by descending
    /// weight and truncated to `max_per_vertex`. The kept set is
    /// renormalized to sum 1 only when the sum is off by more than the
    /// weight epsilon, then zero-padded (bone 0, weight 0) up to the next
    /// multiple of `modulus` so every vertex in a mesh carries the same
    /// fixed-width influence count.
    ///
    /// A vertex with no surviving influence gains no attributes.
    pub fn finalize_influences(&mut self, max_per_vertex: usize, modulus: usize) {
        let mut kept: Vec<(u32, f32)> = self
            .influences
            .drain(..)
            .filter(|(_, w)| w.abs() > WEIGHT_EPSILON)
            .collect();
        if kept.is_empty() {
            return;
        }

        kept.sort_by(|a, b| b.1.total_cmp(&a.1));
        kept.truncate(max_per_vertex);

        let sum: f32 = kept.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            for (_, w) in &mut kept {
                *w /= sum;
            }
        }

        let padded = ((kept.len() - 1) / modulus * modulus) + modulus;
        kept.resize(padded, (0, 0.0));

        let (indices, weights): (Vec<f32>, Vec<f32>) =
            kept.iter().map(|(b, w)| (*b as f32, *w)).unzip();
        self.attributes
            .push(VertexAttribute::new(AttributeKind::BoneIndices, indices));
        self.attributes
            .push(VertexAttribute::new(AttributeKind::BoneWeights, weights));
    }

    /// Number of bone weights carried after finalization (0 if unskinned).
    pub(crate) fn weight_count(&self) -> usize {
        self.attributes
            .iter()
            .find(|a| a.kind == AttributeKind::BoneWeights)
            .map(|a| a.values().len())
            .unwrap_or(0)
    }

    /// Content hash over the attribute hashes, order-sensitive.
    pub fn content_hash(&self) -> u64 {
        polynomial_hash(self.attributes.iter().map(|a| a.content_hash()))
    }
}

/// Value equality over canonicalized attributes. Staged influences do not
/// participate; vertices are compared only after finalization.
impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skinned(influences: &[(u32, f32)], max: usize, modulus: usize) -> Vertex {
        let mut v = Vertex::new();
        v.add(VertexAttribute::new(
            AttributeKind::Position,
            vec![0.0, 0.0, 0.0],
        ));
        for &(bone, weight) in influences {
            v.add_influence(bone, weight);
        }
        v.finalize_influences(max, modulus);
        v
    }

    fn weights(v: &Vertex) -> Vec<f32> {
        v.attributes()
            .iter()
            .find(|a| a.kind == AttributeKind::BoneWeights)
            .map(|a| a.values().to_vec())
            .unwrap_or_default()
    }

    fn indices(v: &Vertex) -> Vec<f32> {
        v.attributes()
            .iter()
            .find(|a| a.kind == AttributeKind::BoneIndices)
            .map(|a| a.values().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_near_zero_weights_dropped() {
        let v = skinned(&[(1, 0.5), (2, 1e-8), (3, 0.5)], 8, 4);
        assert_eq!(indices(&v), vec![1.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_all_zero_weights_leave_vertex_unskinned() {
        let v = skinned(&[(1, 0.0), (2, 1e-9)], 8, 4);
        assert_eq!(v.attributes().len(), 1);
        assert_eq!(v.weight_count(), 0);
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let v = skinned(&[(1, 0.1), (2, 0.6), (3, 0.3)], 2, 1);
        assert_eq!(indices(&v), vec![2.0, 3.0]);
        // 0.6/0.9 and 0.3/0.9 after renormalizing.
        let w = weights(&v);
        assert!((w[0] - 2.0 / 3.0).abs() < 1e-5);
        assert!((w[1] - 1.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalized_sum_is_left_alone() {
        let v = skinned(&[(1, 0.25), (2, 0.75)], 8, 2);
        assert_eq!(weights(&v), vec![0.75, 0.25]);
    }

    #[test]
    fn test_padding_to_modulus() {
        // Three kept weights, modulus 4: padded to four entries.
        let v = skinned(&[(1, 0.5), (2, 0.3), (3, 0.2)], 8, 4);
        assert_eq!(weights(&v).len(), 4);
        assert_eq!(indices(&v)[3], 0.0);
        assert_eq!(weights(&v)[3], 0.0);

        // Exactly four kept weights stay at four.
        let v = skinned(&[(1, 0.4), (2, 0.3), (3, 0.2), (4, 0.1)], 8, 4);
        assert_eq!(weights(&v).len(), 4);

        // Five kept weights round up to eight.
        let v = skinned(&[(1, 0.3), (2, 0.2), (3, 0.2), (4, 0.2), (5, 0.1)], 8, 4);
        assert_eq!(weights(&v).len(), 8);
    }

    #[test]
    fn test_equality_ignores_staging() {
        let mut a = Vertex::new();
        a.add(VertexAttribute::new(AttributeKind::Position, vec![1.0]));
        let mut b = Vertex::new();
        b.add(VertexAttribute::new(AttributeKind::Position, vec![1.0]));
        b.add_influence(1, 0.5);
        assert_eq!(a, b);
    }
}
