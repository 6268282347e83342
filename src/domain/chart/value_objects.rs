use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - chart type string as delivered by the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, AsRefStr, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[display(fmt = "default")]
    #[strum(serialize = "default")]
    Default,
    #[display(fmt = "hourly")]
    #[strum(serialize = "hourly")]
    Hourly,
    #[display(fmt = "previous")]
    #[strum(serialize = "previous")]
    Previous,
    #[display(fmt = "monthly")]
    #[strum(serialize = "monthly")]
    Monthly,
    #[display(fmt = "minute")]
    #[strum(serialize = "minute")]
    Minute,
}

/// Value Object - layout family the solver works in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartMode {
    #[display(fmt = "default")]
    #[strum(serialize = "default")]
    Default,
    #[display(fmt = "hourly")]
    #[strum(serialize = "hourly")]
    Hourly,
    #[display(fmt = "previous")]
    #[strum(serialize = "previous")]
    Previous,
    #[display(fmt = "zoomedOut")]
    #[strum(serialize = "zoomedOut")]
    ZoomedOut,
}

impl ChartMode {
    /// `previous` always wins; any zoom-out turns the other kinds into the
    /// combined zoomed-out layout.
    pub fn resolve(kind: ChartKind, zoom_pct: f64) -> Self {
        match kind {
            ChartKind::Previous => Self::Previous,
            _ if zoom_pct.is_finite() && zoom_pct > 0.0 => Self::ZoomedOut,
            ChartKind::Hourly => Self::Hourly,
            ChartKind::Default | ChartKind::Monthly | ChartKind::Minute => Self::Default,
        }
    }

    pub fn layout(self) -> ModeLayout {
        match self {
            Self::Default => ModeLayout {
                price_padding_below: 0.10,
                price_padding_above: 0.50,
                divider_fraction_desktop: 0.75,
                divider_fraction_mobile: 0.70,
                volume_share_desktop: 0.20,
                volume_share_mobile: 0.25,
                position_padding: 0.5,
                composition: SeriesComposition::MainOnly,
                anchor: DividerAnchor::LastHistorical,
                after_boundary: false,
            },
            Self::Hourly => ModeLayout {
                price_padding_below: 0.20,
                price_padding_above: 0.20,
                ..Self::Default.layout()
            },
            Self::Previous => ModeLayout {
                price_padding_below: 0.12,
                price_padding_above: 0.01,
                divider_fraction_desktop: 0.98,
                divider_fraction_mobile: 0.98,
                volume_share_desktop: 0.0,
                volume_share_mobile: 0.0,
                position_padding: 0.2,
                composition: SeriesComposition::Combined,
                anchor: DividerAnchor::LastCombined,
                after_boundary: false,
            },
            Self::ZoomedOut => ModeLayout {
                price_padding_below: 0.20,
                price_padding_above: 0.20,
                position_padding: 0.3,
                composition: SeriesComposition::Combined,
                after_boundary: true,
                ..Self::Default.layout()
            },
        }
    }
}

/// Which candles feed the price domain, the position domain and the geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeriesComposition {
    MainOnly,
    /// main ++ revealed after
    Combined,
}

/// Which bar's right edge is pinned to the divider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DividerAnchor {
    LastHistorical,
    LastCombined,
}

/// Per-mode layout configuration.
///
/// The asymmetric paddings of `Default` and `Previous` are kept exactly as the
/// product ships them; they are not unified with the symmetric modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeLayout {
    /// Fraction of the price range added below the minimum
    pub price_padding_below: f64,
    /// Fraction of the price range added above the maximum
    pub price_padding_above: f64,
    pub divider_fraction_desktop: f64,
    pub divider_fraction_mobile: f64,
    /// Share of inner height given to the volume band
    pub volume_share_desktop: f64,
    pub volume_share_mobile: f64,
    /// Outer padding of the point scale, in steps
    pub position_padding: f64,
    pub composition: SeriesComposition,
    pub anchor: DividerAnchor,
    /// Whether the first after slot's left edge takes part in the fit
    pub after_boundary: bool,
}

impl ModeLayout {
    pub fn divider_fraction(&self, device: DeviceClass) -> f64 {
        match device {
            DeviceClass::Desktop => self.divider_fraction_desktop,
            DeviceClass::Mobile => self.divider_fraction_mobile,
        }
    }

    pub fn volume_share(&self, device: DeviceClass) -> f64 {
        match device {
            DeviceClass::Desktop => self.volume_share_desktop,
            DeviceClass::Mobile => self.volume_share_mobile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    #[display(fmt = "desktop")]
    Desktop,
    #[display(fmt = "mobile")]
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }
}

/// Value Object - measured container plus margins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub device: DeviceClass,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 800.0, height: 400.0, margins: Margins::default(), device: DeviceClass::Desktop }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, ..Default::default() }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = device;
        self
    }

    pub fn inner_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }
}

/// Pointer position in page/client coordinates, handed in by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Top-left corner of the chart container in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportOrigin {
    pub left: f64,
    pub top: f64,
}

impl ViewportOrigin {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn chart_kind_parses_case_insensitively() {
        assert_eq!(ChartKind::from_str("Hourly").ok(), Some(ChartKind::Hourly));
        assert_eq!(ChartKind::from_str("PREVIOUS").ok(), Some(ChartKind::Previous));
        assert!(ChartKind::from_str("weekly").is_err());
    }

    #[test]
    fn zoom_turns_default_kinds_into_zoomed_out() {
        assert_eq!(ChartMode::resolve(ChartKind::Default, 0.0), ChartMode::Default);
        assert_eq!(ChartMode::resolve(ChartKind::Minute, 0.0), ChartMode::Default);
        assert_eq!(ChartMode::resolve(ChartKind::Hourly, 0.0), ChartMode::Hourly);
        assert_eq!(ChartMode::resolve(ChartKind::Monthly, 35.0), ChartMode::ZoomedOut);
        assert_eq!(ChartMode::resolve(ChartKind::Previous, 80.0), ChartMode::Previous);
    }

    #[test]
    fn previous_gives_all_height_to_price() {
        let layout = ChartMode::Previous.layout();
        assert_eq!(layout.volume_share(DeviceClass::Mobile), 0.0);
        assert_eq!(layout.divider_fraction(DeviceClass::Desktop), 0.98);
    }

    #[test]
    fn inner_size_subtracts_margins() {
        let vp = Viewport::new(800.0, 500.0).with_margins(Margins::new(10.0, 40.0, 20.0, 0.0));
        assert_eq!(vp.inner_width(), 760.0);
        assert_eq!(vp.inner_height(), 470.0);
    }
}
