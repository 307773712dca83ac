//! Error-bounded point-sequence reduction
//!
//! Reduces a dense sampled curve to the sparse subset of points that keeps
//! every dropped point within a squared-deviation bound of the polyline
//! through the kept ones. Points live in R^d where the last component is a
//! monotonically non-decreasing time/parameter value; the algorithm itself
//! is dimension-agnostic.
//!
//! All arithmetic is f64 and all distances are *squared* - callers must
//! not read deviations as Euclidean lengths.

/// N-dimensional polyline reducer, batch and incremental.
#[derive(Debug, Clone, Copy)]
pub struct Approximator {
    dim: usize,
}

/// Worst deviation recorded for one kept-index interval.
///
/// `index` is the interior point realizing the deviation, `None` when the
/// interval has no interior point with positive deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalDeviation {
    pub index: Option<usize>,
    pub value: f64,
}

/// Incremental refinement state threaded between [`Approximator::refine_step`]
/// calls. Invariant: `weights[i]` always describes the interval
/// `(indices[i], indices[i+1])`.
#[derive(Debug, Clone, Default)]
pub struct RefineState {
    indices: Vec<usize>,
    weights: Vec<IntervalDeviation>,
}

impl RefineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kept indices so far, sorted ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Per-interval deviations, one entry per adjacent index pair.
    pub fn weights(&self) -> &[IntervalDeviation] {
        &self.weights
    }
}

impl Approximator {
    /// `dim` is the point dimension: geometric components plus the
    /// trailing time component.
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Worst interior point of `points[init..=end]` by squared deviation
    /// from the segment `points[init]` - `points[end]`.
    ///
    /// Returns `None` when the range is empty (`init > end`) or has no
    /// interior point with positive deviation; the returned value is the
    /// worst deviation found either way.
    pub fn max_deviation(
        &self,
        points: &[Vec<f64>],
        init: usize,
        end: usize,
    ) -> (Option<usize>, f64) {
        if init > end {
            return (None, 0.0);
        }
        let mut index = None;
        let mut max_value = 0.0;
        for i in (init + 1)..end {
            let d = self.segment_deviation_sq(&points[init], &points[end], &points[i]);
            if d > max_value {
                max_value = d;
                index = Some(i);
            }
        }
        (index, max_value)
    }

    /// Reduce `points` to a sorted index subset whose intervals all stay
    /// within `err` (squared). The first and last index are always kept.
    ///
    /// Worklist formulation: a stack of candidate insertion points is
    /// processed so already-accepted intervals are never re-scanned.
    pub fn approximate(&self, points: &[Vec<f64>], err: f64) -> Vec<usize> {
        if points.is_empty() {
            return Vec::new();
        }
        if points.len() == 1 {
            return vec![0];
        }

        let mut indices = vec![0, points.len() - 1];
        let mut pending = Vec::new();
        self.push_candidate(points, 0, points.len() - 1, err, &mut pending);

        while let Some(candidate) = pending.pop() {
            let j = binary_insert(&mut indices, candidate);
            self.push_candidate(points, indices[j - 1], indices[j], err, &mut pending);
            self.push_candidate(points, indices[j], indices[j + 1], err, &mut pending);
        }

        indices
    }

    /// One step of incremental refinement.
    ///
    /// The first call (state with fewer than two indices) initializes the
    /// state to `{0, last}` with a single interval weight. Each later call
    /// splits the interval with the greatest recorded deviation, if any
    /// interval still has a candidate, and recomputes exactly the two
    /// affected weight entries. Returns `false` once no interval can be
    /// split further.
    pub fn refine_step(&self, points: &[Vec<f64>], state: &mut RefineState) -> bool {
        if state.indices.len() < 2 {
            if points.len() < 2 {
                return false;
            }
            state.indices = vec![0, points.len() - 1];
            let (index, value) = self.max_deviation(points, 0, points.len() - 1);
            state.weights = vec![IntervalDeviation { index, value }];
            return true;
        }

        let mut slot = 0;
        let mut max_value = 0.0;
        for (i, w) in state.weights.iter().enumerate() {
            if w.value > max_value {
                max_value = w.value;
                slot = i;
            }
        }

        let Some(candidate) = state.weights[slot].index else {
            return false;
        };

        let j = binary_insert(&mut state.indices, candidate);
        let (li, lv) = self.max_deviation(points, state.indices[j - 1], state.indices[j]);
        let (ri, rv) = self.max_deviation(points, state.indices[j], state.indices[j + 1]);
        state.weights[j - 1] = IntervalDeviation {
            index: li,
            value: lv,
        };
        state.weights.insert(
            j,
            IntervalDeviation {
                index: ri,
                value: rv,
            },
        );
        true
    }

    fn push_candidate(
        &self,
        points: &[Vec<f64>],
        init: usize,
        end: usize,
        err: f64,
        pending: &mut Vec<usize>,
    ) {
        let (index, value) = self.max_deviation(points, init, end);
        if let Some(i) = index {
            if value > err {
                pending.push(i);
            }
        }
    }

    /// Squared deviation of `pa` from the segment `p1`-`p2`, with the
    /// projection parameter clamped to the segment. A zero-length segment
    /// degenerates to the squared distance to `p1`.
    fn segment_deviation_sq(&self, p1: &[f64], p2: &[f64], pa: &[f64]) -> f64 {
        debug_assert_eq!(p1.len(), self.dim);

        let dsq = distance_sq(p1, p2);
        if dsq == 0.0 {
            return distance_sq(p1, pa);
        }

        let mut u = 0.0;
        for i in 0..p1.len() {
            u += (pa[i] - p1[i]) * (p2[i] - p1[i]);
        }
        u /= dsq;

        if u <= 0.0 {
            distance_sq(p1, pa)
        } else if u >= 1.0 {
            distance_sq(p2, pa)
        } else {
            let mut sum = 0.0;
            for i in 0..p1.len() {
                let d = pa[i] - (p1[i] + u * (p2[i] - p1[i]));
                sum += d * d;
            }
            sum
        }
    }
}

fn distance_sq(p1: &[f64], p2: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in 0..p1.len() {
        let d = p2[i] - p1[i];
        sum += d * d;
    }
    sum
}

/// Ordered insert via binary search; returns the insertion position.
fn binary_insert(indices: &mut Vec<usize>, item: usize) -> usize {
    let pos = indices.binary_search(&item).unwrap_or_else(|p| p);
    indices.insert(pos, item);
    pos
}
