use super::value_objects::ChartMode;
use serde::Serialize;

/// Linear map from a numeric domain onto a pixel range, with its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// A zero-width domain maps everything to the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        r0 + (r1 - r0) * t
    }

    pub fn invert(&self, position: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        let t = if span == 0.0 { 0.5 } else { (position - r0) / span };
        d0 + (d1 - d0) * t
    }

    /// [`invert`](Self::invert), clamped into `[min(domain), max(domain)]`
    pub fn invert_clamped(&self, position: f64) -> f64 {
        let (d0, d1) = self.domain;
        self.invert(position).clamp(d0.min(d1), d0.max(d1))
    }
}

/// Evenly spaced positions for the indices `0..len`, with outer padding
/// expressed in steps and centred alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointScale {
    len: usize,
    range: (f64, f64),
    padding: f64,
}

impl PointScale {
    pub fn new(len: usize, range: (f64, f64), padding: f64) -> Self {
        Self { len, range, padding }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn last_index(&self) -> Option<usize> {
        self.len.checked_sub(1)
    }

    /// Distance between neighbouring positions
    pub fn step(&self) -> f64 {
        let (r0, r1) = self.range;
        let slots = (self.len as f64 - 1.0 + 2.0 * self.padding).max(1.0);
        (r1 - r0) / slots
    }

    fn start(&self) -> f64 {
        let (r0, r1) = self.range;
        let occupied = self.step() * self.len.saturating_sub(1) as f64;
        r0 + (r1 - r0 - occupied) * 0.5
    }

    /// Position of `index`, `None` outside the domain
    pub fn position(&self, index: usize) -> Option<f64> {
        (index < self.len).then(|| self.extrapolate(index))
    }

    /// Position of `index` continuing the uniform step past the domain
    pub fn extrapolate(&self, index: usize) -> f64 {
        self.start() + self.step() * index as f64
    }

    /// Same scale over a different number of slots
    pub fn with_len(&self, len: usize) -> Self {
        Self { len, ..*self }
    }

    pub fn with_range(&self, range: (f64, f64)) -> Self {
        Self { range, ..*self }
    }
}

/// How the position fit ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
    /// Sum of absolute edge errors of the range that was kept, in px
    pub residual: f64,
    /// Left edge of the first bar
    pub first_left_edge: f64,
    /// Right edge of the anchor bar
    pub anchor_right_edge: f64,
}

/// Everything the geometry builder and the pointer mapper need, derived in
/// one solve and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub mode: ChartMode,
    pub price_scale: LinearScale,
    pub volume_scale: LinearScale,
    pub position_scale: PointScale,
    pub price_height: f64,
    pub volume_height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
    /// Target x of the anchor bar's right edge
    pub divider_x: f64,
    /// Index whose right edge is pinned to `divider_x`
    pub anchor_index: usize,
    pub last_historical_index: usize,
    pub fit: FitReport,
}

impl Scales {
    /// Rendered bar width: `step * BAR_WIDTH_RATIO`, or the fallback width
    /// when the step is unusable.
    pub fn bar_width(&self) -> f64 {
        bar_width_for_step(self.position_scale.step())
    }
}

pub(crate) fn bar_width_for_step(step: f64) -> f64 {
    if step.is_finite() && step > 0.0 {
        step * super::solver::BAR_WIDTH_RATIO
    } else {
        super::solver::FALLBACK_BAR_WIDTH
    }
}
