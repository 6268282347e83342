use derive_more::{Constructor, Deref, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter};

/// Values at or below this are treated as "no price" (missing or zero-filled data).
pub const PRICE_EPSILON: f64 = 1e-4;

/// Value Object - price
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, From, Into, Deref, Constructor, Serialize, Deserialize)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Finite and above [`PRICE_EPSILON`]
    pub fn is_meaningful(&self) -> bool {
        self.0.is_finite() && self.0 > PRICE_EPSILON
    }
}

/// Value Object - traded volume
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, From, Into, Deref, Constructor, Serialize, Deserialize)]
pub struct Volume(f64);

impl Volume {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Resolved OHLC quadruple of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
}

impl Ohlc {
    /// Flat candles (`high == low` within epsilon) or all-zero rows draw nothing.
    pub fn is_degenerate(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.value().is_finite()) {
            return true;
        }
        if prices.iter().all(|p| p.value() <= PRICE_EPSILON) {
            return true;
        }
        (self.high.value() - self.low.value()).abs() < PRICE_EPSILON
    }

    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Moving-average columns carried by every candle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr, StrumDisplay, Serialize, Deserialize)]
pub enum SmaPeriod {
    #[strum(serialize = "sma10")]
    #[serde(rename = "sma10")]
    Sma10,
    #[strum(serialize = "sma20")]
    #[serde(rename = "sma20")]
    Sma20,
    #[strum(serialize = "sma50")]
    #[serde(rename = "sma50")]
    Sma50,
}

impl SmaPeriod {
    pub fn length(&self) -> usize {
        match self {
            Self::Sma10 => 10,
            Self::Sma20 => 20,
            Self::Sma50 => 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ohlc(o: f64, h: f64, l: f64, c: f64) -> Ohlc {
        Ohlc::new(Price::from(o), Price::from(h), Price::from(l), Price::from(c))
    }

    #[test]
    fn flat_candle_is_degenerate() {
        assert!(ohlc(10.0, 10.0, 10.0, 10.0).is_degenerate());
        assert!(ohlc(10.0, 10.00005, 10.0, 10.0).is_degenerate());
        assert!(!ohlc(10.0, 12.0, 9.0, 11.0).is_degenerate());
    }

    #[test]
    fn zero_filled_candle_is_degenerate() {
        assert!(ohlc(0.0, 0.0, 0.0, 0.0).is_degenerate());
        assert!(ohlc(0.00001, 0.00009, 0.0, 0.00002).is_degenerate());
    }

    #[test]
    fn up_includes_unchanged_close() {
        assert!(ohlc(10.0, 12.0, 9.0, 10.0).is_up());
        assert!(!ohlc(10.0, 12.0, 9.0, 9.5).is_up());
    }
}
