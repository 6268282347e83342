pub use super::value_objects::{Ohlc, Price, SmaPeriod, Volume};
use serde::{Deserialize, Serialize};

/// Domain entity - one normalized candle.
///
/// OHLC fields stay optional: a record with gaps still occupies its index slot
/// and is only dropped at geometry time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Candle {
    pub open: Option<Price>,
    pub high: Option<Price>,
    pub low: Option<Price>,
    pub close: Option<Price>,
    pub volume: Volume,
    pub sma10: Option<Price>,
    pub sma20: Option<Price>,
    pub sma50: Option<Price>,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open: Some(Price::from(open)),
            high: Some(Price::from(high)),
            low: Some(Price::from(low)),
            close: Some(Price::from(close)),
            ..Self::default()
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Volume::from(volume);
        self
    }

    pub fn with_sma(mut self, period: SmaPeriod, value: Option<f64>) -> Self {
        *self.sma_slot(period) = value.map(Price::from);
        self
    }

    pub fn sma(&self, period: SmaPeriod) -> Option<Price> {
        match period {
            SmaPeriod::Sma10 => self.sma10,
            SmaPeriod::Sma20 => self.sma20,
            SmaPeriod::Sma50 => self.sma50,
        }
    }

    pub(crate) fn sma_slot(&mut self, period: SmaPeriod) -> &mut Option<Price> {
        match period {
            SmaPeriod::Sma10 => &mut self.sma10,
            SmaPeriod::Sma20 => &mut self.sma20,
            SmaPeriod::Sma50 => &mut self.sma50,
        }
    }

    /// All four prices, if every one of them is present
    pub fn ohlc(&self) -> Option<Ohlc> {
        Some(Ohlc::new(self.open?, self.high?, self.low?, self.close?))
    }

    /// OHLC worth drawing: present and not degenerate
    pub fn renderable_ohlc(&self) -> Option<Ohlc> {
        self.ohlc().filter(|ohlc| !ohlc.is_degenerate())
    }

    /// Every price this candle contributes to a price domain: OHLC plus any
    /// moving averages, restricted to meaningful values.
    pub fn domain_prices(&self) -> impl Iterator<Item = f64> + '_ {
        [self.high, self.low, self.close, self.open, self.sma10, self.sma20, self.sma50]
            .into_iter()
            .flatten()
            .filter(Price::is_meaningful)
            .map(|p| p.value())
    }
}

/// Domain entity - historical ("main") candles followed by future ("after")
/// candles, of which only the first `revealed` are visible.
///
/// Indices are stable: `0..main.len()` for main, `main.len()..` for after.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandleSeries {
    main: Vec<Candle>,
    after: Vec<Candle>,
    revealed: usize,
}

impl CandleSeries {
    pub fn new(main: Vec<Candle>, after: Vec<Candle>) -> Self {
        Self { main, after, revealed: 0 }
    }

    pub fn historical(main: Vec<Candle>) -> Self {
        Self::new(main, Vec::new())
    }

    pub fn main(&self) -> &[Candle] {
        &self.main
    }

    pub fn after(&self) -> &[Candle] {
        &self.after
    }

    pub fn revealed_after(&self) -> &[Candle] {
        &self.after[..self.revealed]
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    /// Reveal `floor(after.len() * progress / 100)` future candles.
    pub fn set_progress(&mut self, progress_pct: f64) {
        let pct = if progress_pct.is_finite() { progress_pct.clamp(0.0, 100.0) } else { 0.0 };
        let count = (self.after.len() as f64 * pct / 100.0).floor() as usize;
        self.revealed = count.min(self.after.len());
    }

    pub fn with_progress(mut self, progress_pct: f64) -> Self {
        self.set_progress(progress_pct);
        self
    }

    pub fn reveal_all(&mut self) {
        self.revealed = self.after.len();
    }

    /// Main candles followed by the revealed part of the after series
    pub fn combined(&self) -> impl Iterator<Item = &Candle> + '_ {
        self.main.iter().chain(self.revealed_after().iter())
    }

    pub fn combined_len(&self) -> usize {
        self.main.len() + self.revealed
    }

    pub fn last_historical_index(&self) -> Option<usize> {
        self.main.len().checked_sub(1)
    }

    /// Mutable view over every candle, revealed or not, in index order
    pub(crate) fn all_mut(&mut self) -> impl Iterator<Item = &mut Candle> + '_ {
        self.main.iter_mut().chain(self.after.iter_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.after.is_empty()
    }
}
