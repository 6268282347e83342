//! Scale solving: price/volume scales plus the self-referential position fit.
//!
//! The position scale has to satisfy two edge constraints at once: the first
//! bar's left edge sits on x = 0 and the anchor bar's right edge sits on the
//! divider. Bar width is a fraction of the step and the step depends on the
//! range being solved, so the range is found by bounded fixed-point iteration
//! instead of algebra on one particular scale formula.

use super::scales::{FitReport, LinearScale, PointScale, Scales};
use super::value_objects::{ChartMode, DividerAnchor, SeriesComposition, Viewport};
use crate::domain::errors::{ChartError, SolveResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Candle, CandleSeries};
use crate::{log_debug, log_warn};

/// Bar width as a fraction of the step; the rest is the gap between bars
pub const BAR_WIDTH_RATIO: f64 = 0.8;
/// Edge error below which the fit counts as converged
pub const FIT_TOLERANCE_PX: f64 = 0.01;
pub const MAX_FIT_ITERATIONS: usize = 100;
pub const MAX_EXTENSION_ITERATIONS: usize = 30;
/// A range wider than this many inner widths is treated as divergence
pub const MAX_RANGE_FACTOR: f64 = 5.0;
/// Synthetic selection slots appended past the data, relative to the main length
pub const SELECTION_EXTENSION_RATIO: f64 = 0.4;
/// Volume domain headroom over the largest volume
pub const VOLUME_HEADROOM: f64 = 1.1;
/// Bar width used when the step is not a usable number
pub const FALLBACK_BAR_WIDTH: f64 = 6.0;
/// Widening applied to a zero-height price domain, relative to its value
const FLAT_DOMAIN_WIDENING: f64 = 0.01;

const COMPONENT: LogComponent = LogComponent::Domain("ScaleSolver");

/// Measured bar edges of one candidate range.
#[derive(Debug, Clone, Copy)]
struct EdgeMeasure {
    step: f64,
    first_left: f64,
    anchor_right: f64,
    after_left: Option<f64>,
}

impl EdgeMeasure {
    fn take(scale: &PointScale, anchor: usize, after_boundary: bool) -> Option<Self> {
        let step = scale.step();
        let half = step * BAR_WIDTH_RATIO * 0.5;
        let first_left = scale.extrapolate(0) - half;
        let anchor_right = scale.extrapolate(anchor) + half;
        let after_left = after_boundary.then(|| scale.extrapolate(anchor + 1) - half);

        let finite = step.is_finite()
            && step > 0.0
            && first_left.is_finite()
            && anchor_right.is_finite()
            && after_left.is_none_or(f64::is_finite);
        finite.then_some(Self { step, first_left, anchor_right, after_left })
    }

    /// The first after bar starts one inter-bar gap past the divider: with
    /// 0.8-wide bars it cannot start exactly where the anchor bar ends.
    /// `after_left` is always `anchor_right + 0.2 * step`, so this boundary
    /// holds exactly when the anchor edge does: redundant by construction.
    /// Averaging its ratio in only damps the update; the fixed point is the
    /// anchor constraint's.
    fn after_target(&self, divider_x: f64) -> f64 {
        divider_x + self.step * (1.0 - BAR_WIDTH_RATIO)
    }

    fn errors(&self, divider_x: f64) -> (f64, f64, f64) {
        let left = self.first_left.abs();
        let right = (self.anchor_right - divider_x).abs();
        let after = self.after_left.map_or(0.0, |x| (x - self.after_target(divider_x)).abs());
        (left, right, after)
    }
}

/// Domain service computing [`Scales`] from a series and a viewport.
#[derive(Debug, Clone, Copy)]
pub struct ScaleSolver {
    pub tolerance_px: f64,
    pub max_iterations: usize,
    pub max_extension_iterations: usize,
}

impl Default for ScaleSolver {
    fn default() -> Self {
        Self {
            tolerance_px: FIT_TOLERANCE_PX,
            max_iterations: MAX_FIT_ITERATIONS,
            max_extension_iterations: MAX_EXTENSION_ITERATIONS,
        }
    }
}

impl ScaleSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Solve price, volume and position scales for one recomputation pass.
    ///
    /// `zoom_pct` only matters in [`ChartMode::ZoomedOut`], where it reserves
    /// future slots for after candles that are not revealed yet.
    /// `extend_for_selection` appends synthetic slots past the data so the
    /// prediction marker can be positioned beyond the last candle.
    pub fn solve(
        &self,
        series: &CandleSeries,
        viewport: &Viewport,
        mode: ChartMode,
        zoom_pct: f64,
        extend_for_selection: bool,
    ) -> SolveResult<Scales> {
        let inner_width = viewport.inner_width();
        let inner_height = viewport.inner_height();
        if !(inner_width.is_finite() && inner_width > 0.0)
            || !(inner_height.is_finite() && inner_height > 0.0)
        {
            return Err(ChartError::InvalidViewport { inner_width, inner_height });
        }

        let layout = mode.layout();
        let last_historical_index =
            series.last_historical_index().ok_or(ChartError::NoValidPriceData)?;

        let domain_candles: Vec<&Candle> = match layout.composition {
            SeriesComposition::MainOnly => series.main().iter().collect(),
            SeriesComposition::Combined => series.combined().collect(),
        };

        let price_domain = price_domain(
            &domain_candles,
            layout.price_padding_below,
            layout.price_padding_above,
        )?;

        let volume_height = inner_height * layout.volume_share(viewport.device);
        let price_height = inner_height - volume_height;
        let price_scale = LinearScale::new(price_domain, (price_height, 0.0));
        let volume_scale = volume_scale(&domain_candles, volume_height);

        let anchor_index = match layout.anchor {
            DividerAnchor::LastHistorical => last_historical_index,
            DividerAnchor::LastCombined => series.combined_len() - 1,
        };
        let after_slots = match (layout.composition, layout.anchor) {
            (SeriesComposition::Combined, DividerAnchor::LastHistorical) => {
                reserved_after_slots(series, zoom_pct)
            }
            _ => 0,
        };
        let selection_slots = if extend_for_selection {
            ((series.main().len() as f64 * SELECTION_EXTENSION_RATIO).ceil() as usize).max(1)
        } else {
            0
        };

        let divider_x = inner_width * layout.divider_fraction(viewport.device);
        let (core, fit) = self.fit_core(
            anchor_index + 1,
            anchor_index,
            layout.position_padding,
            divider_x,
            inner_width,
            layout.after_boundary && after_slots > 0,
        );
        let position_scale =
            self.extend(core, anchor_index + 1 + after_slots + selection_slots, anchor_index);

        log_debug!(
            COMPONENT,
            "mode={} slots={} step={:.4} divider={:.2} iterations={}",
            mode,
            position_scale.len(),
            position_scale.step(),
            divider_x,
            fit.iterations
        );

        Ok(Scales {
            mode,
            price_scale,
            volume_scale,
            position_scale,
            price_height,
            volume_height,
            inner_width,
            inner_height,
            divider_x,
            anchor_index,
            last_historical_index,
            fit,
        })
    }

    /// Fixed-point fit of the range over the core slots `0..=anchor`.
    ///
    /// Each pass scales the span by `target / actual` (averaged with the
    /// after-boundary ratio when it takes part) and translates the range so the
    /// first left edge lands on 0. The lowest-residual finite candidate is kept
    /// in case the loop runs out or diverges.
    fn fit_core(
        &self,
        slots: usize,
        anchor: usize,
        padding: f64,
        divider_x: f64,
        inner_width: f64,
        after_boundary: bool,
    ) -> (PointScale, FitReport) {
        let mut scale = PointScale::new(slots, (0.0, inner_width), padding);
        let mut best: Option<(PointScale, f64, EdgeMeasure)> = None;
        let mut iterations = 0;

        for iteration in 1..=self.max_iterations {
            iterations = iteration;
            let Some(edges) = EdgeMeasure::take(&scale, anchor, after_boundary) else {
                break;
            };
            let (r0, r1) = scale.range();
            let span = r1 - r0;
            if !(span > 0.0) || span > MAX_RANGE_FACTOR * inner_width {
                break;
            }

            let (left_err, right_err, after_err) = edges.errors(divider_x);
            let residual = left_err + right_err + after_err;
            if best.as_ref().is_none_or(|(_, best_residual, _)| residual < *best_residual) {
                best = Some((scale, residual, edges));
            }

            let tol = self.tolerance_px;
            if left_err < tol && right_err < tol && after_err < tol {
                return (
                    scale,
                    FitReport {
                        iterations,
                        converged: true,
                        residual,
                        first_left_edge: edges.first_left,
                        anchor_right_edge: edges.anchor_right,
                    },
                );
            }

            let mut ratio = divider_x / (edges.anchor_right - edges.first_left);
            if let Some(after_left) = edges.after_left {
                let after_ratio = edges.after_target(divider_x) / (after_left - edges.first_left);
                ratio = 0.5 * (ratio + after_ratio);
            }
            if !(ratio.is_finite() && ratio > 0.0) {
                break;
            }

            let new_span = span * ratio;
            let new_left = r0 + (edges.first_left - r0) * ratio;
            let new_r0 = r0 - new_left;
            scale = scale.with_range((new_r0, new_r0 + new_span));
        }

        match best {
            Some((scale, residual, edges)) => {
                log_warn!(
                    COMPONENT,
                    "{}; keeping best range ({:.3}, {:.3})",
                    ChartError::ScaleSolveNonConvergent { iterations, residual },
                    scale.range().0,
                    scale.range().1
                );
                (
                    scale,
                    FitReport {
                        iterations,
                        converged: false,
                        residual,
                        first_left_edge: edges.first_left,
                        anchor_right_edge: edges.anchor_right,
                    },
                )
            }
            None => {
                log_warn!(
                    COMPONENT,
                    "{}; no finite candidate, using the raw inner width",
                    ChartError::ScaleSolveNonConvergent { iterations, residual: f64::INFINITY }
                );
                let scale = PointScale::new(slots, (0.0, inner_width), padding);
                let edges = EdgeMeasure::take(&scale, anchor, false);
                (
                    scale,
                    FitReport {
                        iterations,
                        converged: false,
                        residual: f64::INFINITY,
                        first_left_edge: edges.map_or(f64::NAN, |e| e.first_left),
                        anchor_right_edge: edges.map_or(f64::NAN, |e| e.anchor_right),
                    },
                )
            }
        }
    }

    /// Grow the domain to `total` slots while keeping the core step and the
    /// core positions, so the solved edges do not move.
    fn extend(&self, core: PointScale, total: usize, anchor: usize) -> PointScale {
        if total <= core.len() {
            return core;
        }

        let core_step = core.step();
        let core_first = core.extrapolate(0);
        let core_anchor = core.extrapolate(anchor);
        let tol = self.tolerance_px;
        let mut extended = core.with_len(total);

        for _ in 0..self.max_extension_iterations {
            let drift_first = (extended.extrapolate(0) - core_first).abs();
            let drift_anchor = (extended.extrapolate(anchor) - core_anchor).abs();
            if !(drift_first.is_finite() && drift_anchor.is_finite()) {
                break;
            }
            if drift_first < tol && drift_anchor < tol {
                return extended;
            }

            let ratio = core_step / extended.step();
            if !(ratio.is_finite() && ratio > 0.0) {
                break;
            }
            let (r0, r1) = extended.range();
            let scaled = extended.with_range((r0, r0 + (r1 - r0) * ratio));
            let shift = core_first - scaled.extrapolate(0);
            let (s0, s1) = scaled.range();
            extended = scaled.with_range((s0 + shift, s1 + shift));
        }

        log_warn!(
            COMPONENT,
            "extension to {} slots did not settle; keeping {} core slots",
            total,
            core.len()
        );
        core
    }
}

/// Padded price domain over every meaningful OHLC/SMA value.
fn price_domain(candles: &[&Candle], below: f64, above: f64) -> SolveResult<(f64, f64)> {
    let (min, max) = candles
        .iter()
        .flat_map(|c| c.domain_prices())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p), hi.max(p)));
    if !(min.is_finite() && max.is_finite()) {
        return Err(ChartError::NoValidPriceData);
    }

    let (min, max) = if max - min > 0.0 {
        (min, max)
    } else {
        let widen = max.abs() * FLAT_DOMAIN_WIDENING;
        (min - widen, max + widen)
    };
    let range = max - min;
    Ok((min - range * below, max + range * above))
}

/// `[0, max * 1.1]` onto the band; the range overshoots the band top by the
/// same headroom so the largest volume lands exactly on it.
fn volume_scale(candles: &[&Candle], volume_height: f64) -> LinearScale {
    let max_volume = candles
        .iter()
        .map(|c| c.volume.value())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .fold(0.0, f64::max);
    let max_volume = if max_volume > 0.0 { max_volume } else { 1.0 };
    LinearScale::new(
        (0.0, max_volume * VOLUME_HEADROOM),
        (volume_height, volume_height - volume_height * VOLUME_HEADROOM),
    )
}

/// After slots laid out in zoomed-out mode: at least the revealed ones, and as
/// many as the zoom percentage has opened up.
fn reserved_after_slots(series: &CandleSeries, zoom_pct: f64) -> usize {
    let zoom = if zoom_pct.is_finite() { zoom_pct.clamp(0.0, 100.0) } else { 0.0 };
    let opened = (series.after().len() as f64 * zoom / 100.0).ceil() as usize;
    opened.min(series.after().len()).max(series.revealed_count())
}
