//! Data Normalizer: the only place that knows the historical field spellings.

use crate::domain::errors::{ChartError, IngestResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Candle, CandleSeries, Price, Volume, fill_absent_averages};
use crate::log_debug;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// DTO for one candle record as the data files deliver it
#[derive(Debug, Default, Deserialize)]
pub struct RawCandle {
    #[serde(default, alias = "Open", alias = "OPEN", alias = "o", deserialize_with = "lenient_number")]
    pub open: Option<f64>,
    #[serde(default, alias = "High", alias = "HIGH", alias = "h", deserialize_with = "lenient_number")]
    pub high: Option<f64>,
    #[serde(default, alias = "Low", alias = "LOW", alias = "l", deserialize_with = "lenient_number")]
    pub low: Option<f64>,
    #[serde(default, alias = "Close", alias = "CLOSE", alias = "c", deserialize_with = "lenient_number")]
    pub close: Option<f64>,
    #[serde(default, alias = "Volume", alias = "VOLUME", alias = "v", deserialize_with = "lenient_number")]
    pub volume: Option<f64>,
    #[serde(
        default,
        alias = "SMA10",
        alias = "ma10",
        alias = "MA10",
        alias = "10sma",
        alias = "10SMA",
        alias = "ema10",
        alias = "EMA10",
        deserialize_with = "lenient_number"
    )]
    pub sma10: Option<f64>,
    #[serde(
        default,
        alias = "SMA20",
        alias = "ma20",
        alias = "MA20",
        alias = "20sma",
        alias = "20SMA",
        alias = "ema20",
        alias = "EMA20",
        deserialize_with = "lenient_number"
    )]
    pub sma20: Option<f64>,
    #[serde(
        default,
        alias = "SMA50",
        alias = "ma50",
        alias = "MA50",
        alias = "50sma",
        alias = "50SMA",
        alias = "ema50",
        alias = "EMA50",
        deserialize_with = "lenient_number"
    )]
    pub sma50: Option<f64>,
}

impl RawCandle {
    pub fn to_domain_candle(&self) -> Candle {
        Candle {
            open: self.open.map(Price::from),
            high: self.high.map(Price::from),
            low: self.low.map(Price::from),
            close: self.close.map(Price::from),
            volume: Volume::from(self.volume.unwrap_or(0.0)),
            sma10: self.sma10.map(Price::from),
            sma20: self.sma20.map(Price::from),
            sma50: self.sma50.map(Price::from),
        }
    }
}

/// Numbers, numeric strings or null; anything non-finite or unparsable is absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|v| v.is_finite()))
}

/// A series arrives either as an array or as a JSON string holding one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeriesPayload {
    Records(Vec<RawCandle>),
    Encoded(String),
}

/// Parse one candle array. Empty input and `null` yield an empty series.
pub fn parse_candles(json: &str) -> IngestResult<Vec<Candle>> {
    let json = json.trim();
    if json.is_empty() {
        return Ok(Vec::new());
    }

    let payload: Option<SeriesPayload> = serde_json::from_str(json)
        .map_err(|e| ChartError::InvalidInput(format!("candle payload: {}", e)))?;

    match payload {
        None => Ok(Vec::new()),
        Some(SeriesPayload::Records(records)) => {
            Ok(records.iter().map(RawCandle::to_domain_candle).collect())
        }
        Some(SeriesPayload::Encoded(inner)) => parse_candles(&inner),
    }
}

/// Parse main and after payloads into one series, filling moving-average
/// columns the source did not carry at all.
pub fn load_series(main_json: &str, after_json: Option<&str>) -> IngestResult<CandleSeries> {
    let main = parse_candles(main_json)?;
    let after = match after_json {
        Some(json) => parse_candles(json)?,
        None => Vec::new(),
    };

    let mut series = CandleSeries::new(main, after);
    let filled = fill_absent_averages(&mut series);

    log_debug!(
        LogComponent::Infrastructure("DataNormalizer"),
        "loaded {} main + {} after candles, computed {:?}",
        series.main().len(),
        series.after().len(),
        filled
    );

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_numbers_accept_strings_and_drop_garbage() {
        let candles = parse_candles(r#"[{"open":"10.5","high":12,"low":"x","close":null}]"#).unwrap();
        assert_eq!(candles[0].open, Some(Price::from(10.5)));
        assert_eq!(candles[0].high, Some(Price::from(12.0)));
        assert_eq!(candles[0].low, None);
        assert_eq!(candles[0].close, None);
        assert_eq!(candles[0].volume.value(), 0.0);
    }

    #[test]
    fn null_and_blank_are_empty() {
        assert!(parse_candles("").unwrap().is_empty());
        assert!(parse_candles("null").unwrap().is_empty());
    }

    #[test]
    fn object_payload_is_rejected() {
        assert!(matches!(parse_candles(r#"{"open":1}"#), Err(ChartError::InvalidInput(_))));
    }
}
