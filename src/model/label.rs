//! Label taxonomy for drawing symbols.
//!
//! Labels form a closed set grouped into semantic categories. Every category
//! owns exactly one display color, and a label's color is its category's.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Semantic grouping of labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelCategory {
    Lighting,
    Power,
    Switches,
    Data,
    Safety,
    Distribution,
    Other,
}

impl LabelCategory {
    /// Display name of the category.
    pub fn name(&self) -> &'static str {
        match self {
            LabelCategory::Lighting => "Lighting",
            LabelCategory::Power => "Power",
            LabelCategory::Switches => "Switches",
            LabelCategory::Data => "Data",
            LabelCategory::Safety => "Safety",
            LabelCategory::Distribution => "Distribution",
            LabelCategory::Other => "Other",
        }
    }

    /// Color used for every label in this category.
    pub fn color(&self) -> Rgba {
        match self {
            LabelCategory::Lighting => Rgba::rgb(0xF5, 0x9E, 0x0B), // amber
            LabelCategory::Power => Rgba::rgb(0xEF, 0x44, 0x44),    // red
            LabelCategory::Switches => Rgba::rgb(0x3B, 0x82, 0xF6), // blue
            LabelCategory::Data => Rgba::rgb(0x10, 0xB9, 0x81),     // emerald
            LabelCategory::Safety => Rgba::rgb(0x8B, 0x5C, 0xF6),   // violet
            LabelCategory::Distribution => Rgba::rgb(0x6B, 0x72, 0x80),
            LabelCategory::Other => Rgba::rgb(0xF4, 0x72, 0xB6), // pink
        }
    }

    /// Labels belonging to this category, in menu order.
    pub fn labels(&self) -> &'static [Label] {
        use Label::*;
        match self {
            LabelCategory::Lighting => &[
                Downlight,
                DownlightDimmable,
                PendantLight,
                WallLight,
                EmergencyLight,
                ExitSign,
                BattenLight,
            ],
            LabelCategory::Power => &[Gpo, GpoDouble, GpoWeatherproof, UsbOutlet],
            LabelCategory::Switches => &[SwitchSingle, SwitchDouble, SwitchDimmer, SwitchSensor],
            LabelCategory::Data => &[DataOutlet, PhoneOutlet, TvOutlet],
            LabelCategory::Safety => &[SmokeDetector, HeatDetector, Speaker],
            LabelCategory::Distribution => &[Switchboard, DistributionBoard],
            LabelCategory::Other => &[ExhaustFan, RangeHood, Unknown],
        }
    }

    /// All categories in menu order.
    pub fn all() -> &'static [LabelCategory] {
        &[
            LabelCategory::Lighting,
            LabelCategory::Power,
            LabelCategory::Switches,
            LabelCategory::Data,
            LabelCategory::Safety,
            LabelCategory::Distribution,
            LabelCategory::Other,
        ]
    }
}

/// Annotation label. Serialized as its snake_case identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    #[default]
    Downlight,
    DownlightDimmable,
    PendantLight,
    WallLight,
    EmergencyLight,
    ExitSign,
    BattenLight,
    Gpo,
    GpoDouble,
    GpoWeatherproof,
    UsbOutlet,
    SwitchSingle,
    SwitchDouble,
    SwitchDimmer,
    SwitchSensor,
    DataOutlet,
    PhoneOutlet,
    TvOutlet,
    SmokeDetector,
    HeatDetector,
    Speaker,
    Switchboard,
    DistributionBoard,
    ExhaustFan,
    RangeHood,
    Unknown,
}

impl Label {
    /// The snake_case identifier used in files.
    pub fn as_str(&self) -> &'static str {
        use Label::*;
        match self {
            Downlight => "downlight",
            DownlightDimmable => "downlight_dimmable",
            PendantLight => "pendant_light",
            WallLight => "wall_light",
            EmergencyLight => "emergency_light",
            ExitSign => "exit_sign",
            BattenLight => "batten_light",
            Gpo => "gpo",
            GpoDouble => "gpo_double",
            GpoWeatherproof => "gpo_weatherproof",
            UsbOutlet => "usb_outlet",
            SwitchSingle => "switch_single",
            SwitchDouble => "switch_double",
            SwitchDimmer => "switch_dimmer",
            SwitchSensor => "switch_sensor",
            DataOutlet => "data_outlet",
            PhoneOutlet => "phone_outlet",
            TvOutlet => "tv_outlet",
            SmokeDetector => "smoke_detector",
            HeatDetector => "heat_detector",
            Speaker => "speaker",
            Switchboard => "switchboard",
            DistributionBoard => "distribution_board",
            ExhaustFan => "exhaust_fan",
            RangeHood => "range_hood",
            Unknown => "unknown",
        }
    }

    /// Human readable caption: the identifier with underscores as spaces.
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Category this label belongs to.
    pub fn category(&self) -> LabelCategory {
        LabelCategory::all()
            .iter()
            .copied()
            .find(|cat| cat.labels().contains(self))
            .unwrap_or(LabelCategory::Other)
    }

    /// Display color (the category color).
    pub fn color(&self) -> Rgba {
        self.category().color()
    }

    /// Every label, grouped by category in menu order.
    pub fn all() -> impl Iterator<Item = Label> {
        LabelCategory::all()
            .iter()
            .flat_map(|cat| cat.labels().iter().copied())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown label identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::all()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_replaces_underscores() {
        assert_eq!(Label::SwitchSingle.display_name(), "switch single");
        assert_eq!(Label::Gpo.display_name(), "gpo");
        assert_eq!(Label::DownlightDimmable.display_name(), "downlight dimmable");
    }

    #[test]
    fn test_every_label_in_exactly_one_category() {
        for label in Label::all() {
            let owners = LabelCategory::all()
                .iter()
                .filter(|c| c.labels().contains(&label))
                .count();
            assert_eq!(owners, 1, "{label} belongs to {owners} categories");
        }
        assert_eq!(Label::all().count(), 26);
    }

    #[test]
    fn test_category_colors() {
        assert_eq!(Label::Downlight.color().to_hex(), "#F59E0B");
        assert_eq!(Label::SwitchSingle.color().to_hex(), "#3B82F6");
        assert_eq!(Label::Unknown.category(), LabelCategory::Other);
        assert_eq!(Label::Switchboard.color(), LabelCategory::Distribution.color());
    }

    #[test]
    fn test_parse_and_serde_agree() {
        for label in Label::all() {
            let parsed: Label = label.as_str().parse().unwrap();
            assert_eq!(parsed, label);
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{}\"", label.as_str()));
        }
        assert!("not_a_label".parse::<Label>().is_err());
    }
}
