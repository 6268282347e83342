use super::scales::Scales;
use super::value_objects::{PointerEvent, Viewport, ViewportOrigin};
use crate::domain::market_data::CandleSeries;
use serde::Serialize;

/// Absorbs rounding when the pointer sits exactly on a step boundary
const STEP_EPSILON: f64 = 1e-9;

/// A prediction pick: a future index plus the price under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Selection {
    pub index: usize,
    pub price: f64,
    /// Index lies past the last solved slot
    pub extrapolated: bool,
}

/// Maps pointer events to data coordinates. Stateless; every input is explicit.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionMapper;

impl InteractionMapper {
    pub fn new() -> Self {
        Self
    }

    /// `None` means the pointer is outside the selectable region: at or left
    /// of the last historical bar's right edge, or unusable input.
    pub fn map_pointer(
        &self,
        event: &PointerEvent,
        origin: &ViewportOrigin,
        viewport: &Viewport,
        scales: &Scales,
        series: &CandleSeries,
    ) -> Option<Selection> {
        let local_x = event.client_x - origin.left - viewport.margins.left;
        let local_y = event.client_y - origin.top - viewport.margins.top;
        if !(local_x.is_finite() && local_y.is_finite()) {
            return None;
        }

        let scale = &scales.position_scale;
        let last_slot = scale.last_index()?;
        let step = scale.step();
        if !(step.is_finite() && step > 0.0) {
            return None;
        }
        let half_width = scales.bar_width() / 2.0;

        let last_historical = series.last_historical_index()?;
        let historical_right = scale.extrapolate(last_historical) + half_width;
        if local_x <= historical_right {
            return None;
        }

        let base_slot = last_slot.max(last_historical);
        let last_right = scale.extrapolate(base_slot) + half_width;
        let (index, extrapolated) = if local_x > last_right {
            // (right, right + step] is the next index
            let steps_beyond = ((local_x - last_right) / step - STEP_EPSILON).ceil().max(1.0);
            (base_slot + steps_beyond as usize, true)
        } else {
            let nearest = nearest_slot(scale.len(), |i| scale.extrapolate(i), local_x);
            (nearest.max(last_historical + 1), false)
        };

        Some(Selection { index, price: scales.price_scale.invert_clamped(local_y), extrapolated })
    }
}

/// `argmin |x(i) - target|`; the first index wins a tie.
fn nearest_slot(len: usize, x: impl Fn(usize) -> f64, target: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for i in 0..len {
        let distance = (x(i) - target).abs();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_go_to_the_lower_index() {
        // positions 0, 10, 20; target 5 is equidistant from 0 and 10
        assert_eq!(nearest_slot(3, |i| i as f64 * 10.0, 5.0), 0);
        assert_eq!(nearest_slot(3, |i| i as f64 * 10.0, 16.0), 2);
    }

    #[test]
    fn empty_domain_defaults_to_first_slot() {
        assert_eq!(nearest_slot(0, |_| 0.0, 3.0), 0);
    }
}
