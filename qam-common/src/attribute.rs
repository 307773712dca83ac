//! Typed vertex attributes
//!
//! Attribute components are canonicalized to a fixed decimal precision on
//! construction so that floating noise from upstream transform math never
//! splits vertices that are geometrically identical. Hashing and equality
//! always see canonicalized values.

/// Decimal digits kept by [`canonicalize`].
pub const FROUND_DIGITS: i32 = 6;

/// Smallest distinguishable canonical step (10^-6).
pub const FROUND_EPSILON: f64 = 1e-6;

/// Round a component to 6 decimal digits.
#[inline]
pub fn canonicalize(component: f32) -> f32 {
    let scale = 10f64.powi(FROUND_DIGITS);
    (((component as f64) * scale).round() / scale) as f32
}

/// Kind of a vertex attribute.
///
/// The numeric ids feed the attribute hash and are part of the dedup
/// contract; they match the container's attribute table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    Normal,
    Tangent,
    Binormal,
    Color,
    /// Texture coordinate set 0-9.
    TexCoord(u8),
    BoneIndices,
    BoneWeights,
}

impl AttributeKind {
    /// Stable numeric id used in the content hash.
    pub fn id(self) -> u64 {
        match self {
            AttributeKind::Position => 10,
            AttributeKind::Normal => 20,
            AttributeKind::Tangent => 30,
            AttributeKind::Binormal => 40,
            AttributeKind::Color => 50,
            AttributeKind::TexCoord(n) => 60 + n as u64,
            AttributeKind::BoneIndices => 70,
            AttributeKind::BoneWeights => 80,
        }
    }

    /// Base schema name, before per-component expansion.
    pub fn base_name(self) -> String {
        match self {
            AttributeKind::Position => "POSITION".to_string(),
            AttributeKind::Normal => "NORMAL".to_string(),
            AttributeKind::Tangent => "TANGENT".to_string(),
            AttributeKind::Binormal => "BINORMAL".to_string(),
            AttributeKind::Color => "COLOR".to_string(),
            AttributeKind::TexCoord(n) => format!("TEXCOORD{n}"),
            AttributeKind::BoneIndices => "BONEINDICES".to_string(),
            AttributeKind::BoneWeights => "BONEWEIGHTS".to_string(),
        }
    }

    /// Schema names contributed by an attribute with `len` components.
    ///
    /// Bone indices expand to one name per packed float; bone weights to
    /// one name per group of up to four weights (suffixed with the group
    /// index and the group size). Everything else is a single name.
    pub fn schema_names(self, len: usize) -> Vec<String> {
        match self {
            AttributeKind::BoneIndices => {
                (0..len).map(|i| format!("BONEINDICES{i}")).collect()
            }
            AttributeKind::BoneWeights => {
                let mut names = Vec::new();
                let mut idx = 0;
                let mut count = len;
                while count > 0 {
                    names.push(format!("BONEWEIGHTS{}{}", idx, count.min(4)));
                    idx += 1;
                    count = count.saturating_sub(4);
                }
                names
            }
            _ => vec![self.base_name()],
        }
    }
}

/// One typed, fixed-length vector of floating components.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub kind: AttributeKind,
    values: Vec<f32>,
}

impl VertexAttribute {
    /// Build an attribute; every component is canonicalized.
    pub fn new(kind: AttributeKind, values: Vec<f32>) -> Self {
        let mut attr = Self { kind, values };
        attr.canonicalize_values();
        attr
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Replace the component list, re-canonicalizing.
    pub fn set_values(&mut self, values: Vec<f32>) {
        self.values = values;
        self.canonicalize_values();
    }

    /// Replace the component list without canonicalizing. Reserved for
    /// packed bit-pattern payloads, which must stay bit-exact.
    pub(crate) fn set_values_raw(&mut self, values: Vec<f32>) {
        self.values = values;
    }

    fn canonicalize_values(&mut self) {
        for v in &mut self.values {
            *v = canonicalize(*v);
        }
    }

    /// Content hash: `81 * kind_id + polynomial_hash(components, base 31)`.
    pub fn content_hash(&self) -> u64 {
        let comps = polynomial_hash(self.values.iter().map(|v| component_hash(*v)));
        81u64.wrapping_mul(self.kind.id()).wrapping_add(comps)
    }
}

/// Hash one canonical component. Positive and negative zero collapse so a
/// value that rounds to -0.0 dedups against one that rounds to 0.0.
#[inline]
fn component_hash(v: f32) -> u64 {
    let v = if v == 0.0 { 0.0 } else { v };
    v.to_bits() as u64
}

/// Order-sensitive polynomial hash with base 31 over item hashes.
pub fn polynomial_hash(items: impl Iterator<Item = u64>) -> u64 {
    let mut out = 0u64;
    for h in items {
        out = out.wrapping_mul(31).wrapping_add(h);
    }
    out
}
