//! Keyframe track reduction
//!
//! Sampled per-frame bone transforms arrive as dense single-channel
//! tracks; the approximator thins them to the keyframes needed to stay
//! within a per-channel error bound. Tracks that turn out static collapse
//! to a single key, and static tracks sitting on the channel default
//! vanish entirely - readers reconstruct defaults on their own.

use qam_common::model::{NodeAnimation, SeparateKeyframe};
use qam_common::{canonicalize, is_default_rotation, is_default_scale, is_default_translation};

use crate::approx::Approximator;
use crate::config::ExportConfig;

/// Which transform channel a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackChannel {
    Translation,
    /// W-first quaternion.
    Rotation,
    Scale,
}

impl TrackChannel {
    /// Approximation point dimension: channel components plus key time.
    pub fn dim(self) -> usize {
        match self {
            TrackChannel::Rotation => 5,
            TrackChannel::Translation | TrackChannel::Scale => 4,
        }
    }

    fn is_default(self, value: &[f32]) -> bool {
        match self {
            TrackChannel::Translation => is_default_translation(value),
            TrackChannel::Rotation => is_default_rotation(value),
            TrackChannel::Scale => is_default_scale(value),
        }
    }
}

/// Reduce one channel track within a squared error bound.
///
/// Returns the kept keyframes in time order. A track reduced to two keys
/// with equal canonical components is static: it becomes empty when the
/// value is the channel default, otherwise just its first key.
pub fn reduce_track(
    track: &[SeparateKeyframe],
    channel: TrackChannel,
    err: f64,
) -> Vec<SeparateKeyframe> {
    if track.len() < 2 {
        return track.to_vec();
    }

    let points: Vec<Vec<f64>> = track
        .iter()
        .map(|kf| {
            let mut p: Vec<f64> = kf.value.iter().map(|&v| v as f64).collect();
            p.push(kf.keytime as f64);
            p
        })
        .collect();

    let approximator = Approximator::new(channel.dim());
    let kept = approximator.approximate(&points, err);
    let mut out: Vec<SeparateKeyframe> = kept.iter().map(|&i| track[i].clone()).collect();

    if out.len() == 2 && canonical_eq(&out[0].value, &out[1].value) {
        if channel.is_default(&out[0].value) {
            return Vec::new();
        }
        out.pop();
    }
    out
}

/// Reduce all three channel tracks of a bone with the configured bounds.
pub fn reduce_node_tracks(anim: &mut NodeAnimation, config: &ExportConfig) {
    anim.translation = reduce_track(
        &anim.translation,
        TrackChannel::Translation,
        config.approx_err_translation,
    );
    anim.rotation = reduce_track(
        &anim.rotation,
        TrackChannel::Rotation,
        config.approx_err_rotation,
    );
    anim.scale = reduce_track(&anim.scale, TrackChannel::Scale, config.approx_err_scale);
}

fn canonical_eq(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(&x, &y)| canonicalize(x) == canonicalize(y))
}
