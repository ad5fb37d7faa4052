//! Cost matrix, backtrace and the reusable per-row aligner.

use crate::scanline::ScanlineConfig;
use crate::util::{StereoError, StereoResult};

/// Decision recorded at a cost-matrix cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Left pixel `i - 1` corresponds to right pixel `j - 1`.
    Match,
    /// Left pixel `i - 1` is occluded.
    SkipLeft,
    /// Right pixel `j - 1` is occluded.
    SkipRight,
}

/// One backtrace step taken from cell `(i, j)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub i: usize,
    pub j: usize,
    pub step: Step,
}

/// Dynamic-programming cost matrix for one row pair.
///
/// `D[i, j]` is the cheapest alignment of the first `i` left samples with the
/// first `j` right samples:
///
/// ```text
/// D[0, 0] = 0
/// D[i, 0] = i * c0,   D[0, j] = j * c0
/// D[i, j] = min(D[i-1, j-1] + (l[i-1] - r[j-1])^2 / sigma^2,
///               D[i-1, j] + c0,
///               D[i, j-1] + c0)
/// ```
///
/// Ties prefer match, then skip-left, then skip-right. The winning decision is
/// stored per cell so the backtrace replays it exactly.
///
/// The buffers are kept between builds; a matrix reused across rows of the
/// same length does not reallocate.
#[derive(Clone, Debug, Default)]
pub struct CostMatrix {
    n: usize,
    costs: Vec<f64>,
    steps: Vec<Option<Step>>,
}

impl CostMatrix {
    /// Creates an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the matrix for a row pair.
    ///
    /// Fails with `DivisionByZero` / `InvalidParameter` for bad parameters and
    /// `LengthMismatch` for rows of different length, before touching the
    /// buffers.
    pub fn build<T>(&mut self, left: &[T], right: &[T], cfg: &ScanlineConfig) -> StereoResult<()>
    where
        T: Copy + Into<f64>,
    {
        cfg.validate()?;
        check_row_lengths(left.len(), right.len())?;
        self.fill(left, right, cfg.sigma * cfg.sigma, cfg.occlusion_cost)
    }

    fn fill<T>(&mut self, left: &[T], right: &[T], sigma_sq: f64, c0: f64) -> StereoResult<()>
    where
        T: Copy + Into<f64>,
    {
        let n = left.len();
        let side = n + 1;
        let cells = side
            .checked_mul(side)
            .ok_or(StereoError::InvalidDimensions {
                width: side,
                height: side,
            })?;

        self.n = n;
        self.costs.clear();
        self.costs.resize(cells, 0.0);
        self.steps.clear();
        self.steps.resize(cells, None);

        for i in 1..side {
            self.costs[i * side] = self.costs[(i - 1) * side] + c0;
            self.steps[i * side] = Some(Step::SkipLeft);
        }
        for j in 1..side {
            self.costs[j] = self.costs[j - 1] + c0;
            self.steps[j] = Some(Step::SkipRight);
        }

        for i in 1..side {
            let l: f64 = left[i - 1].into();
            let row = i * side;
            let prev_row = (i - 1) * side;
            for j in 1..side {
                let r: f64 = right[j - 1].into();
                let mut best = self.costs[prev_row + j - 1] + local_cost(l, r, sigma_sq);
                let mut step = Step::Match;

                let skip_left = self.costs[prev_row + j] + c0;
                if skip_left < best {
                    best = skip_left;
                    step = Step::SkipLeft;
                }
                let skip_right = self.costs[row + j - 1] + c0;
                if skip_right < best {
                    best = skip_right;
                    step = Step::SkipRight;
                }

                self.costs[row + j] = best;
                self.steps[row + j] = Some(step);
            }
        }
        Ok(())
    }

    /// Row length `N` the matrix was built for.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns true if the matrix was built for empty rows (or never built).
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Accumulated cost `D[i, j]` for `0 <= i, j <= N`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.index(i, j).and_then(|idx| self.costs.get(idx).copied())
    }

    /// Decision recorded at `(i, j)`; `None` at the origin.
    pub fn step(&self, i: usize, j: usize) -> Option<Step> {
        self.index(i, j)
            .and_then(|idx| self.steps.get(idx).copied())
            .flatten()
    }

    /// Cost of the optimal full alignment, `D[N, N]`.
    pub fn total_cost(&self) -> f64 {
        self.get(self.n, self.n).unwrap_or(0.0)
    }

    /// Backtracks the optimal path from `(N, N)` to `(0, 0)`.
    pub fn backtrace(&self) -> AlignmentPath {
        let mut path = AlignmentPath::default();
        self.backtrace_into(&mut path);
        path
    }

    pub(crate) fn backtrace_into(&self, path: &mut AlignmentPath) {
        path.steps.clear();
        let (mut i, mut j) = (self.n, self.n);
        while let Some(step) = self.step(i, j) {
            path.steps.push(PathStep { i, j, step });
            match step {
                Step::Match => {
                    i -= 1;
                    j -= 1;
                }
                Step::SkipLeft => i -= 1,
                Step::SkipRight => j -= 1,
            }
        }
    }

    fn index(&self, i: usize, j: usize) -> Option<usize> {
        if i > self.n || j > self.n || self.costs.is_empty() {
            return None;
        }
        Some(i * (self.n + 1) + j)
    }
}

/// Optimal alignment path in backtrace order, from `(N, N)` towards `(0, 0)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignmentPath {
    steps: Vec<PathStep>,
}

impl AlignmentPath {
    /// Steps in backtrace order.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Recomputes the path cost from the samples: the local cost for every
    /// match plus `c0` for every skip.
    pub fn cost<T>(&self, left: &[T], right: &[T], cfg: &ScanlineConfig) -> f64
    where
        T: Copy + Into<f64>,
    {
        let sigma_sq = cfg.sigma * cfg.sigma;
        self.steps
            .iter()
            .map(|s| match s.step {
                Step::Match => local_cost(left[s.i - 1].into(), right[s.j - 1].into(), sigma_sq),
                Step::SkipLeft | Step::SkipRight => cfg.occlusion_cost,
            })
            .sum()
    }
}

/// Per-row disparities for both views.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanlineAlignment {
    /// Disparity per left pixel; `None` where occluded.
    pub left: Vec<Option<u32>>,
    /// Disparity per right pixel; `None` where occluded.
    pub right: Vec<Option<u32>>,
    /// Optimal alignment cost `D[N, N]`.
    pub cost: f64,
}

/// Output row slices written by [`ScanlineAligner::align_into`].
pub(crate) struct RowOutput<'a> {
    pub left_values: &'a mut [u32],
    pub left_mask: &'a mut [u8],
    pub right_values: &'a mut [u32],
    pub right_mask: &'a mut [u8],
}

/// Reusable row aligner owning the cost-matrix and path buffers.
///
/// One aligner serves any number of rows; keep one per thread.
#[derive(Clone, Debug)]
pub struct ScanlineAligner {
    cfg: ScanlineConfig,
    matrix: CostMatrix,
    path: AlignmentPath,
}

impl ScanlineAligner {
    /// Creates an aligner with empty buffers.
    pub fn new(cfg: ScanlineConfig) -> Self {
        Self {
            cfg,
            matrix: CostMatrix::new(),
            path: AlignmentPath::default(),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ScanlineConfig {
        &self.cfg
    }

    /// Cost matrix of the most recent alignment.
    pub fn cost_matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    /// Backtraced path of the most recent alignment.
    pub fn path(&self) -> &AlignmentPath {
        &self.path
    }

    /// Aligns one row pair and returns disparities for both views.
    ///
    /// A match at cell `(i, j)` assigns `|i - j|` to left pixel `i - 1` and
    /// right pixel `j - 1`; skipped pixels get `None`. Empty rows produce
    /// empty outputs.
    pub fn align<T>(&mut self, left: &[T], right: &[T]) -> StereoResult<ScanlineAlignment>
    where
        T: Copy + Into<f64>,
    {
        self.matrix.build(left, right, &self.cfg)?;
        self.matrix.backtrace_into(&mut self.path);

        let n = left.len();
        let mut out = ScanlineAlignment {
            left: vec![None; n],
            right: vec![None; n],
            cost: self.matrix.total_cost(),
        };
        for s in self.path.steps() {
            if s.step == Step::Match {
                let d = s.i.abs_diff(s.j) as u32;
                out.left[s.i - 1] = Some(d);
                out.right[s.j - 1] = Some(d);
            }
        }
        Ok(out)
    }

    /// Aligns one row pair and writes straight into disparity-map rows.
    ///
    /// Occluded cells receive `NO_DISPARITY` and mask 0.
    pub(crate) fn align_into<T>(
        &mut self,
        left: &[T],
        right: &[T],
        out: RowOutput<'_>,
    ) -> StereoResult<()>
    where
        T: Copy + Into<f64>,
    {
        self.matrix.build(left, right, &self.cfg)?;
        self.matrix.backtrace_into(&mut self.path);

        out.left_values.fill(crate::NO_DISPARITY);
        out.left_mask.fill(0);
        out.right_values.fill(crate::NO_DISPARITY);
        out.right_mask.fill(0);
        for s in self.path.steps() {
            if s.step == Step::Match {
                let d = s.i.abs_diff(s.j) as u32;
                out.left_values[s.i - 1] = d;
                out.left_mask[s.i - 1] = 1;
                out.right_values[s.j - 1] = d;
                out.right_mask[s.j - 1] = 1;
            }
        }
        Ok(())
    }
}

/// Aligns a single row pair with the given `sigma` and occlusion cost `c0`.
pub fn align_scanline<T>(
    left: &[T],
    right: &[T],
    sigma: f64,
    c0: f64,
) -> StereoResult<ScanlineAlignment>
where
    T: Copy + Into<f64>,
{
    ScanlineAligner::new(ScanlineConfig {
        sigma,
        occlusion_cost: c0,
        parallel: false,
    })
    .align(left, right)
}

#[inline]
fn local_cost(l: f64, r: f64, sigma_sq: f64) -> f64 {
    let diff = l - r;
    diff * diff / sigma_sq
}

fn check_row_lengths(left: usize, right: usize) -> StereoResult<()> {
    if left != right {
        return Err(StereoError::LengthMismatch {
            context: "row length",
            left,
            right,
        });
    }
    Ok(())
}
