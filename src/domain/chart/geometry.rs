use super::scales::Scales;
use super::value_objects::{ChartMode, SeriesComposition};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Candle, CandleSeries, SmaPeriod};
use crate::log_trace;
use serde::Serialize;
use strum::IntoEnumIterator;

/// Sub-pixel gap between a previous-mode volume bar and the baseline that gets
/// closed by stretching the bar.
pub const BASELINE_SNAP_PX: f64 = 0.1;

/// One drawable candle. `x` is the bar centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candlestick {
    pub index: usize,
    pub x: f64,
    pub open_y: f64,
    pub close_y: f64,
    pub high_y: f64,
    pub low_y: f64,
    pub width: f64,
    pub is_up: bool,
}

/// Volume rectangle; `x`/`y` are its top-left corner inside the volume band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeBar {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

/// Moving-average line split at every undefined value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmaPolyline {
    pub period: SmaPeriod,
    pub segments: Vec<Vec<Vertex>>,
}

impl SmaPolyline {
    pub fn vertex_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartGeometry {
    pub candlesticks: Vec<Candlestick>,
    pub volume_bars: Vec<VolumeBar>,
    pub sma_polylines: Vec<SmaPolyline>,
}

impl ChartGeometry {
    pub fn is_empty(&self) -> bool {
        self.candlesticks.is_empty()
            && self.volume_bars.is_empty()
            && self.sma_polylines.iter().all(|line| line.segments.is_empty())
    }
}

/// Domain service turning solved scales into drawing primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryBuilder;

impl GeometryBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, series: &CandleSeries, scales: &Scales, mode: ChartMode) -> ChartGeometry {
        let candles: Vec<&Candle> = match mode.layout().composition {
            SeriesComposition::MainOnly => series.main().iter().collect(),
            SeriesComposition::Combined => series.combined().collect(),
        };
        if candles.is_empty() {
            return ChartGeometry::default();
        }

        let width = scales.bar_width();
        let fallback_step = scales.inner_width / candles.len() as f64;
        let x_for = |index: usize| {
            scales
                .position_scale
                .position(index)
                .filter(|x| x.is_finite())
                .unwrap_or(index as f64 * fallback_step)
        };

        let mut candlesticks = Vec::with_capacity(candles.len());
        let mut volume_bars = Vec::with_capacity(candles.len());

        for (index, candle) in candles.iter().enumerate() {
            let Some(ohlc) = candle.renderable_ohlc() else {
                continue;
            };
            let x = x_for(index);
            let price = |p: f64| scales.price_scale.apply(p);

            let stick = Candlestick {
                index,
                x,
                open_y: price(ohlc.open.value()),
                close_y: price(ohlc.close.value()),
                high_y: price(ohlc.high.value()),
                low_y: price(ohlc.low.value()),
                width,
                is_up: ohlc.is_up(),
            };
            if ![stick.x, stick.open_y, stick.close_y, stick.high_y, stick.low_y]
                .iter()
                .all(|v| v.is_finite())
            {
                continue;
            }
            candlesticks.push(stick);

            if let Some(bar) = volume_bar(index, x, width, candle.volume.value(), scales, mode) {
                volume_bars.push(bar);
            }
        }

        let sma_polylines = SmaPeriod::iter()
            .map(|period| sma_polyline(period, &candles, scales))
            .collect();

        log_trace!(
            LogComponent::Domain("GeometryBuilder"),
            "{} candles -> {} sticks, {} volume bars",
            candles.len(),
            candlesticks.len(),
            volume_bars.len()
        );

        ChartGeometry { candlesticks, volume_bars, sma_polylines }
    }
}

fn volume_bar(
    index: usize,
    center_x: f64,
    width: f64,
    volume: f64,
    scales: &Scales,
    mode: ChartMode,
) -> Option<VolumeBar> {
    if !volume.is_finite() {
        return None;
    }
    let baseline = scales.volume_height;
    let y = scales.volume_scale.apply(volume);
    let mut height = (baseline - y).max(0.0);

    if mode == ChartMode::Previous {
        let gap = baseline - (y + height);
        if gap > 0.0 && gap < BASELINE_SNAP_PX {
            height += gap;
        }
    }

    let bar = VolumeBar { index, x: center_x - width / 2.0, y, width, height };
    (bar.x.is_finite() && bar.y.is_finite() && bar.height.is_finite()).then_some(bar)
}

/// A vertex wherever the value is defined and the index is inside the solved
/// domain; anything else closes the current segment.
fn sma_polyline(period: SmaPeriod, candles: &[&Candle], scales: &Scales) -> SmaPolyline {
    let mut segments = Vec::new();
    let mut current: Vec<Vertex> = Vec::new();

    for (index, candle) in candles.iter().enumerate() {
        let vertex = candle
            .sma(period)
            .map(|p| p.value())
            .filter(|v| v.is_finite())
            .zip(scales.position_scale.position(index))
            .map(|(value, x)| Vertex { index, x, y: scales.price_scale.apply(value) })
            .filter(|v| v.x.is_finite() && v.y.is_finite());

        match vertex {
            Some(vertex) => current.push(vertex),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    SmaPolyline { period, segments }
}
