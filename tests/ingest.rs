use prediction_chart_wasm::domain::errors::ChartError;
use prediction_chart_wasm::domain::market_data::{Price, SmaPeriod};
use prediction_chart_wasm::infrastructure::dto::{load_series, parse_candles};
use serde_json::json;

fn closes(range: std::ops::RangeInclusive<u32>) -> String {
    let records: Vec<_> = range
        .map(|c| json!({"Open": c, "High": c + 1, "Low": c - 1 , "Close": c, "Volume": 10}))
        .collect();
    serde_json::to_string(&records).unwrap()
}

#[test]
fn historical_field_spellings_are_normalized() {
    let payload = r#"[
        {"Date": "2024-01-02", "Open": 10, "HIGH": "12.5", "l": 9, "Close": 11,
         "Volume": 1500, "10sma": 10.2, "MA20": null, "EMA50": "9.9"},
        {"open": 11, "high": 13, "low": 10, "close": 12, "VOLUME": "7", "SMA10": 10.4, "ma50": 10.0}
    ]"#;
    let candles = parse_candles(payload).unwrap();

    assert_eq!(candles.len(), 2);
    let first = &candles[0];
    assert_eq!(first.open, Some(Price::from(10.0)));
    assert_eq!(first.high, Some(Price::from(12.5)));
    assert_eq!(first.low, Some(Price::from(9.0)));
    assert_eq!(first.close, Some(Price::from(11.0)));
    assert_eq!(first.volume.value(), 1500.0);
    assert_eq!(first.sma(SmaPeriod::Sma10), Some(Price::from(10.2)));
    assert_eq!(first.sma(SmaPeriod::Sma20), None);
    assert_eq!(first.sma(SmaPeriod::Sma50), Some(Price::from(9.9)));
    assert_eq!(candles[1].volume.value(), 7.0);
    assert_eq!(candles[1].sma(SmaPeriod::Sma50), Some(Price::from(10.0)));
}

#[test]
fn json_encoded_string_payload_is_unwrapped() {
    let inner = r#"[{"open": 1.5, "high": 2, "low": 1, "close": 1.8}]"#;
    let encoded = serde_json::to_string(inner).unwrap();
    let candles = parse_candles(&encoded).unwrap();
    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].close, Some(Price::from(1.8)));
}

#[test]
fn absent_averages_continue_into_the_after_series() {
    let series = load_series(&closes(1..=15), Some(&closes(16..=25))).unwrap();

    assert_eq!(series.main().len(), 15);
    assert_eq!(series.after().len(), 10);
    assert_eq!(series.main()[8].sma10, None);
    assert_eq!(series.main()[9].sma10, Some(Price::from(5.5)));
    assert_eq!(series.after()[0].sma10, Some(Price::from(11.5)));
    assert_eq!(series.after()[3].sma20, None);
    assert_eq!(series.after()[4].sma20, Some(Price::from(10.5)));
    assert!(series.after().iter().all(|c| c.sma50.is_none()));
}

#[test]
fn carried_average_column_keeps_its_nulls() {
    let payload = r#"[
        {"open": 1, "high": 2, "low": 0.5, "close": 1, "sma10": null},
        {"open": 1, "high": 2, "low": 0.5, "close": 1, "sma10": 1.25}
    ]"#;
    let series = load_series(payload, None).unwrap();
    assert_eq!(series.main()[0].sma10, None);
    assert_eq!(series.main()[1].sma10, Some(Price::from(1.25)));
}

#[test]
fn missing_after_payload_is_an_empty_series() {
    let series = load_series(&closes(1..=3), Some("null")).unwrap();
    assert!(series.after().is_empty());
    assert_eq!(series.revealed_count(), 0);
}

#[test]
fn malformed_payload_is_invalid_input() {
    assert!(matches!(parse_candles("[{"), Err(ChartError::InvalidInput(_))));
    assert!(matches!(load_series("42", None), Err(ChartError::InvalidInput(_))));
}
