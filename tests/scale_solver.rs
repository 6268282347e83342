use prediction_chart_wasm::domain::chart::{
    ChartMode, DeviceClass, FIT_TOLERANCE_PX, Margins, ScaleSolver, Scales, Viewport,
};
use prediction_chart_wasm::domain::errors::ChartError;
use prediction_chart_wasm::domain::market_data::{Candle, CandleSeries};
use quickcheck_macros::quickcheck;

fn scenario_series() -> CandleSeries {
    CandleSeries::historical(vec![
        Candle::new(10.0, 12.0, 9.0, 11.0).with_volume(100.0),
        Candle::new(11.0, 13.0, 10.0, 12.0).with_volume(200.0),
        Candle::new(12.0, 11.0, 9.0, 10.0).with_volume(150.0),
    ])
}

fn wave(len: usize) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let base = 100.0 + (i as f64 * 0.37).sin() * 10.0;
            Candle::new(base, base + 1.5, base - 1.5, base + 0.5).with_volume(1000.0 + i as f64)
        })
        .collect()
}

fn edges(scales: &Scales, index: usize) -> (f64, f64) {
    let half = scales.bar_width() / 2.0;
    let x = scales.position_scale.extrapolate(index);
    (x - half, x + half)
}

#[test]
fn scenario_last_bar_meets_divider() {
    let scales = ScaleSolver::new()
        .solve(&scenario_series(), &Viewport::new(800.0, 400.0), ChartMode::Default, 0.0, false)
        .unwrap();

    assert_eq!(scales.divider_x, 600.0);
    assert!(scales.fit.converged);
    let (first_left, _) = edges(&scales, 0);
    let (_, last_right) = edges(&scales, 2);
    assert!(first_left.abs() < 0.1, "first left edge {first_left}");
    assert!((last_right - 600.0).abs() < 0.1, "last right edge {last_right}");
    assert!(scales.fit.residual < 3.0 * FIT_TOLERANCE_PX);
}

#[test]
fn volume_scale_maps_max_to_band_top() {
    // 750px inner height at the 20% desktop share gives a 150px volume band
    let scales = ScaleSolver::new()
        .solve(&scenario_series(), &Viewport::new(800.0, 750.0), ChartMode::Default, 0.0, false)
        .unwrap();

    assert_eq!(scales.volume_height, 150.0);
    assert_eq!(scales.price_height, 600.0);
    assert!(scales.volume_scale.apply(200.0).abs() < 1e-9);
    assert_eq!(scales.volume_scale.apply(0.0), 150.0);
    assert_eq!(scales.volume_scale.domain(), (0.0, 200.0 * 1.1));
}

#[quickcheck]
fn default_mode_converges(len: u16, width: u16) -> bool {
    let len = 2 + len as usize % 4999;
    let width = 100.0 + (width % 3901) as f64;
    let series = CandleSeries::historical(wave(len));
    let scales = ScaleSolver::new()
        .solve(&series, &Viewport::new(width, 500.0), ChartMode::Default, 0.0, false)
        .unwrap();

    let (first_left, _) = edges(&scales, 0);
    let (_, anchor_right) = edges(&scales, len - 1);
    first_left.abs() < 0.1 && (anchor_right - 0.75 * width).abs() < 0.1
}

#[quickcheck]
fn zoomed_out_mode_converges(len: u16, width: u16, after: u8, zoom: u8) -> bool {
    let len = 2 + len as usize % 4999;
    let width = 100.0 + (width % 3901) as f64;
    let zoom = 1.0 + (zoom % 100) as f64;
    let series = CandleSeries::new(wave(len), wave(1 + after as usize)).with_progress(30.0);
    let vp = Viewport::new(width, 500.0).with_device(DeviceClass::Mobile);
    let scales = ScaleSolver::new().solve(&series, &vp, ChartMode::ZoomedOut, zoom, false).unwrap();

    let (first_left, _) = edges(&scales, 0);
    let (_, anchor_right) = edges(&scales, len - 1);
    let (after_left, _) = edges(&scales, len);
    first_left.abs() < 0.1
        && (anchor_right - 0.70 * width).abs() < 0.1
        && after_left > anchor_right
}

#[quickcheck]
fn price_scale_is_decreasing(a: u32, b: u32) -> bool {
    let scales = ScaleSolver::new()
        .solve(&CandleSeries::historical(wave(50)), &Viewport::default(), ChartMode::Hourly, 0.0, false)
        .unwrap();
    let (lo, hi) = scales.price_scale.domain();
    let at = |t: u32| lo + (hi - lo) * (t as f64 / u32::MAX as f64);
    let (pa, pb) = (at(a.min(b)), at(a.max(b)));
    pa == pb || scales.price_scale.apply(pa) > scales.price_scale.apply(pb)
}

#[test]
fn selection_extension_keeps_solved_edges() {
    let series = CandleSeries::historical(wave(20));
    let vp = Viewport::new(1200.0, 600.0);
    let plain = ScaleSolver::new().solve(&series, &vp, ChartMode::Default, 0.0, false).unwrap();
    let extended = ScaleSolver::new().solve(&series, &vp, ChartMode::Default, 0.0, true).unwrap();

    assert_eq!(plain.position_scale.len(), 20);
    assert_eq!(extended.position_scale.len(), 28);
    for index in [0, 19] {
        let a = plain.position_scale.position(index).unwrap();
        let b = extended.position_scale.position(index).unwrap();
        assert!((a - b).abs() < FIT_TOLERANCE_PX, "index {index}: {a} vs {b}");
    }
    assert!((plain.bar_width() - extended.bar_width()).abs() < 1e-6);
}

#[test]
fn zoom_reserves_after_slots() {
    let series = CandleSeries::new(wave(30), wave(20));
    let vp = Viewport::new(1000.0, 500.0);
    let scales = ScaleSolver::new().solve(&series, &vp, ChartMode::ZoomedOut, 50.0, false).unwrap();

    assert_eq!(scales.position_scale.len(), 40);
    assert_eq!(scales.anchor_index, 29);
    let (_, anchor_right) = edges(&scales, 29);
    let (after_left, _) = edges(&scales, 30);
    let gap = scales.position_scale.step() * 0.2;
    assert!((after_left - (750.0 + gap)).abs() < 0.1);
    assert!((anchor_right - 750.0).abs() < 0.1);
}

#[test]
fn previous_mode_gives_price_the_full_height() {
    let series = CandleSeries::new(wave(12), wave(6)).with_progress(50.0);
    let vp = Viewport::new(900.0, 420.0).with_margins(Margins::new(10.0, 0.0, 10.0, 0.0));
    let scales = ScaleSolver::new().solve(&series, &vp, ChartMode::Previous, 0.0, false).unwrap();

    assert_eq!(scales.volume_height, 0.0);
    assert_eq!(scales.price_height, 400.0);
    assert_eq!(scales.price_scale.range(), (400.0, 0.0));
    // the last revealed candle is pinned at 98% of the width
    assert_eq!(scales.anchor_index, 14);
    let (_, right) = edges(&scales, 14);
    assert!((right - 882.0).abs() < 0.1);
}

#[test]
fn default_padding_is_asymmetric() {
    let series = CandleSeries::historical(vec![
        Candle::new(10.0, 20.0, 10.0, 15.0),
        Candle::new(15.0, 20.0, 12.0, 18.0),
    ]);
    let scales = ScaleSolver::new()
        .solve(&series, &Viewport::default(), ChartMode::Default, 0.0, false)
        .unwrap();
    let (lo, hi) = scales.price_scale.domain();
    assert!((lo - 9.0).abs() < 1e-9);
    assert!((hi - 25.0).abs() < 1e-9);
}

#[test]
fn near_zero_prices_are_not_part_of_the_domain() {
    let mut candles = wave(5);
    candles.push(Candle::new(0.0, 0.0, 0.0, 0.0));
    let scales = ScaleSolver::new()
        .solve(&CandleSeries::historical(candles), &Viewport::default(), ChartMode::Hourly, 0.0, false)
        .unwrap();
    assert!(scales.price_scale.domain().0 > 50.0);
    // the zero row still occupies its slot
    assert_eq!(scales.position_scale.len(), 6);
}

#[test]
fn invalid_viewport_is_reported() {
    let series = scenario_series();
    let zero = ScaleSolver::new().solve(&series, &Viewport::new(0.0, 400.0), ChartMode::Default, 0.0, false);
    assert!(matches!(zero, Err(ChartError::InvalidViewport { .. })));

    let squeezed = Viewport::new(100.0, 400.0).with_margins(Margins::new(0.0, 60.0, 0.0, 60.0));
    let result = ScaleSolver::new().solve(&series, &squeezed, ChartMode::Default, 0.0, false);
    assert_eq!(result, Err(ChartError::InvalidViewport { inner_width: -20.0, inner_height: 400.0 }));
}

#[test]
fn missing_prices_are_reported() {
    let empty = ScaleSolver::new().solve(
        &CandleSeries::default(),
        &Viewport::default(),
        ChartMode::Default,
        0.0,
        false,
    );
    assert_eq!(empty, Err(ChartError::NoValidPriceData));

    let zeros = CandleSeries::historical(vec![Candle::new(0.0, 0.0, 0.0, 0.0); 4]);
    let result = ScaleSolver::new().solve(&zeros, &Viewport::default(), ChartMode::Default, 0.0, false);
    assert_eq!(result, Err(ChartError::NoValidPriceData));
}

#[test]
fn iteration_cap_degrades_instead_of_failing() {
    let scales = ScaleSolver::new()
        .with_max_iterations(1)
        .solve(&scenario_series(), &Viewport::new(800.0, 400.0), ChartMode::Default, 0.0, false)
        .unwrap();
    assert!(!scales.fit.converged);
    assert!(scales.fit.residual.is_finite());
}

#[test]
fn solving_is_idempotent() {
    let series = CandleSeries::new(wave(64), wave(16)).with_progress(25.0);
    let vp = Viewport::new(1280.0, 720.0).with_device(DeviceClass::Mobile);
    let solver = ScaleSolver::new();
    for mode in [ChartMode::Default, ChartMode::Hourly, ChartMode::Previous, ChartMode::ZoomedOut] {
        let first = solver.solve(&series, &vp, mode, 40.0, true).unwrap();
        let second = solver.solve(&series, &vp, mode, 40.0, true).unwrap();
        assert_eq!(first, second);
    }
}
