use serde::{Deserialize, Serialize};

pub const GREEN_THRESHOLD: f64 = 90.0;
pub const YELLOW_THRESHOLD: f64 = 60.0;
pub const ORANGE_THRESHOLD: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl BadgeColor {
    /// Picks the badge color for a coverage percentage.
    ///
    /// Each band includes its lower bound, so exactly 90 is green and
    /// exactly 40 is orange.
    pub fn for_coverage(total_coverage: f64) -> Self {
        if total_coverage >= GREEN_THRESHOLD {
            Self::Green
        } else if total_coverage >= YELLOW_THRESHOLD {
            Self::Yellow
        } else if total_coverage >= ORANGE_THRESHOLD {
            Self::Orange
        } else {
            Self::Red
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Green => "#97ca00",
            Self::Yellow => "#dfb317",
            Self::Orange => "#fe7d37",
            Self::Red => "#e05d44",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn green_band_starts_at_ninety() {
        for coverage in [90.0, 95.5, 100.0] {
            assert_eq!(BadgeColor::for_coverage(coverage), BadgeColor::Green);
        }
    }

    #[test]
    fn yellow_band_covers_sixty_up_to_ninety() {
        for coverage in [60.0, 75.0, 89.99] {
            assert_eq!(BadgeColor::for_coverage(coverage), BadgeColor::Yellow);
        }
    }

    #[test]
    fn orange_band_covers_forty_up_to_sixty() {
        for coverage in [40.0, 50.0, 59.9] {
            assert_eq!(BadgeColor::for_coverage(coverage), BadgeColor::Orange);
        }
    }

    #[test]
    fn everything_below_forty_is_red() {
        for coverage in [0.0, 1.0, 39.99] {
            assert_eq!(BadgeColor::for_coverage(coverage), BadgeColor::Red);
        }
    }

    #[test]
    fn names_match_serialized_form() {
        let json = serde_json::to_string(&BadgeColor::Orange).expect("color should serialize");
        assert_eq!(json, format!("\"{}\"", BadgeColor::Orange.name()));
    }
}
