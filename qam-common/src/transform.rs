//! Default-transform predicates
//!
//! Node and keyframe transforms omit channels that sit on their defaults;
//! these epsilon comparisons decide that. Rotations are w-first.

const EPSILON: f32 = 1e-6;

/// Identity translation.
pub const DEFAULT_TRANSLATION: [f32; 3] = [0.0, 0.0, 0.0];
/// Identity rotation, w-first: [w, x, y, z].
pub const DEFAULT_ROTATION: [f32; 4] = [1.0, 0.0, 0.0, 0.0];
/// Identity scale.
pub const DEFAULT_SCALE: [f32; 3] = [1.0, 1.0, 1.0];

#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}

pub fn is_default_translation(v: &[f32]) -> bool {
    v.len() == 3 && v.iter().all(|&x| approx_eq(x, 0.0))
}

pub fn is_default_rotation(v: &[f32]) -> bool {
    v.len() == 4
        && approx_eq(v[0], 1.0)
        && approx_eq(v[1], 0.0)
        && approx_eq(v[2], 0.0)
        && approx_eq(v[3], 0.0)
}

pub fn is_default_scale(v: &[f32]) -> bool {
    v.len() == 3 && v.iter().all(|&x| approx_eq(x, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_epsilon() {
        assert!(is_default_translation(&[0.0, 1e-7, -1e-7]));
        assert!(!is_default_translation(&[0.0, 0.0, 1e-3]));
        assert!(is_default_rotation(&[1.0, 0.0, 0.0, 1e-7]));
        assert!(!is_default_rotation(&[0.0, 1.0, 0.0, 0.0]));
        assert!(is_default_scale(&[1.0, 1.0, 1.0]));
        assert!(!is_default_scale(&[1.0, 1.0, 0.5]));
    }
}
