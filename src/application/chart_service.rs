use crate::domain::{
    chart::{
        ChartGeometry, ChartKind, ChartMode, GeometryBuilder, InteractionMapper, Margins,
        PointerEvent, ScaleSolver, Scales, Selection, Viewport, ViewportOrigin,
    },
    errors::{ChartError, IngestResult},
    logging::LogComponent,
    market_data::CandleSeries,
};
use crate::infrastructure::dto::load_series;
use crate::{log_debug, log_warn};
use serde::Serialize;
use std::str::FromStr;

const COMPONENT: LogComponent = LogComponent::Application("ChartEngine");

/// Output of one recomputation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub mode: ChartMode,
    pub scales: Scales,
    pub geometry: ChartGeometry,
}

/// Application service owning the chart inputs.
///
/// Every setter drops the cached frame; the next [`frame`](Self::frame) call
/// rebuilds it from scratch, so a frame never mixes old and new inputs.
pub struct ChartEngine {
    series: CandleSeries,
    viewport: Viewport,
    kind: ChartKind,
    zoom_pct: f64,
    progress_pct: f64,
    extend_for_selection: bool,
    solver: ScaleSolver,
    builder: GeometryBuilder,
    mapper: InteractionMapper,
    frame: Option<Result<ChartFrame, ChartError>>,
}

impl Default for ChartEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartEngine {
    pub fn new() -> Self {
        Self {
            series: CandleSeries::default(),
            viewport: Viewport::default(),
            kind: ChartKind::Default,
            zoom_pct: 0.0,
            progress_pct: 0.0,
            extend_for_selection: false,
            solver: ScaleSolver::new(),
            builder: GeometryBuilder::new(),
            mapper: InteractionMapper::new(),
            frame: None,
        }
    }

    pub fn with_solver(mut self, solver: ScaleSolver) -> Self {
        self.solver = solver;
        self.invalidate();
        self
    }

    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn mode(&self) -> ChartMode {
        ChartMode::resolve(self.kind, self.zoom_pct)
    }

    /// Replace the series; the current reveal progress is applied to it.
    pub fn set_series(&mut self, mut series: CandleSeries) {
        series.set_progress(self.progress_pct);
        self.series = series;
        self.invalidate();
    }

    /// Normalize JSON payloads and use them as the new series.
    pub fn load_json(&mut self, main_json: &str, after_json: Option<&str>) -> IngestResult<()> {
        let series = load_series(main_json, after_json)?;
        self.set_series(series);
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.invalidate();
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.invalidate();
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.viewport.margins = margins;
        self.invalidate();
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.kind = kind;
        self.invalidate();
    }

    /// Parse a chart type string (`default|hourly|previous|monthly|minute`).
    pub fn set_chart_type(&mut self, chart_type: &str) -> Result<(), ChartError> {
        let kind = ChartKind::from_str(chart_type.trim())
            .map_err(|_| ChartError::InvalidInput(format!("unknown chart type '{}'", chart_type)))?;
        self.set_chart_kind(kind);
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom_pct: f64) {
        self.zoom_pct = clamp_pct(zoom_pct);
        self.invalidate();
    }

    pub fn set_progress(&mut self, progress_pct: f64) {
        self.progress_pct = clamp_pct(progress_pct);
        self.series.set_progress(self.progress_pct);
        self.invalidate();
    }

    pub fn set_selection_extension(&mut self, enabled: bool) {
        self.extend_for_selection = enabled;
        self.invalidate();
    }

    /// Current frame, recomputed if any input changed since the last call.
    pub fn frame(&mut self) -> Result<&ChartFrame, ChartError> {
        if self.frame.is_none() {
            self.frame = Some(self.compute());
        }
        self.frame
            .as_ref()
            .map_or(Err(ChartError::NoValidPriceData), |frame| frame.as_ref().map_err(Clone::clone))
    }

    /// Map a pointer against the current frame. `None` without a frame or
    /// outside the selectable region.
    pub fn map_pointer(&mut self, event: &PointerEvent, origin: &ViewportOrigin) -> Option<Selection> {
        self.frame().ok()?;
        let frame = self.frame.as_ref()?.as_ref().ok()?;
        self.mapper.map_pointer(event, origin, &self.viewport, &frame.scales, &self.series)
    }

    fn invalidate(&mut self) {
        self.frame = None;
    }

    fn compute(&self) -> Result<ChartFrame, ChartError> {
        let mode = self.mode();
        let scales = self
            .solver
            .solve(&self.series, &self.viewport, mode, self.zoom_pct, self.extend_for_selection)
            .inspect_err(|err| {
                log_warn!(COMPONENT, "no frame for mode {}: {}", mode, err);
            })?;
        let geometry = self.builder.build(&self.series, &scales, mode);

        log_debug!(
            COMPONENT,
            "frame mode={} sticks={} bars={} converged={}",
            mode,
            geometry.candlesticks.len(),
            geometry.volume_bars.len(),
            scales.fit.converged
        );

        Ok(ChartFrame { mode, scales, geometry })
    }
}

fn clamp_pct(pct: f64) -> f64 {
    if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 }
}
