use super::{Candle, CandleSeries, Price, SmaPeriod};
use std::collections::VecDeque;
use strum::IntoEnumIterator;

/// Trailing simple moving average over closes, fed one candle at a time.
#[derive(Debug, Clone)]
pub struct SmaWindow {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl SmaWindow {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1), window: VecDeque::with_capacity(period.max(1)), sum: 0.0 }
    }

    /// Push the next close; `None` until the window is full. A missing close
    /// restarts the window, so the average never spans a hole in the data.
    pub fn push(&mut self, close: Option<f64>) -> Option<f64> {
        let Some(close) = close.filter(|c| c.is_finite()) else {
            self.window.clear();
            self.sum = 0.0;
            return None;
        };

        self.sum += close;
        self.window.push_back(close);
        if self.window.len() > self.period {
            if let Some(v) = self.window.pop_front() {
                self.sum -= v;
            }
        }
        (self.window.len() == self.period).then(|| self.sum / self.period as f64)
    }
}

/// Which moving-average columns the payload carried at all.
fn carried_periods<'a>(candles: impl Iterator<Item = &'a Candle> + Clone) -> Vec<SmaPeriod> {
    SmaPeriod::iter()
        .filter(|period| candles.clone().any(|c| c.sma(*period).is_some()))
        .collect()
}

/// Compute the moving-average columns the source left out entirely.
///
/// Runs over `main ++ after` (the whole after series, revealed or not) so the
/// future part continues the historical windows. Columns present anywhere are
/// left untouched: their nulls are real gaps.
pub fn fill_absent_averages(series: &mut CandleSeries) -> Vec<SmaPeriod> {
    let carried = {
        let all: Vec<&Candle> = series.main().iter().chain(series.after().iter()).collect();
        carried_periods(all.iter().copied())
    };
    let missing: Vec<SmaPeriod> = SmaPeriod::iter().filter(|p| !carried.contains(p)).collect();
    if missing.is_empty() {
        return missing;
    }

    let mut windows: Vec<(SmaPeriod, SmaWindow)> =
        missing.iter().map(|p| (*p, SmaWindow::new(p.length()))).collect();

    for candle in series.all_mut() {
        let close = candle.close.map(|c| c.value());
        for (period, window) in windows.iter_mut() {
            *candle.sma_slot(*period) = window.push(close).map(Price::from);
        }
    }

    missing
}
