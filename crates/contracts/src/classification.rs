//! Classification - coarse object category derived from altitude and speed
//!
//! The rule table is an ordered decision list; the first matching rule wins.
//! Altitudes are in feet and speeds in knots, as reported by the feed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Object category assigned to every observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Ground,
    Drone,
    Helicopter,
    Airplane,
    Unknown,
}

impl Classification {
    /// All labels, in table order
    pub const ALL: [Classification; 5] = [
        Self::Ground,
        Self::Drone,
        Self::Helicopter,
        Self::Airplane,
        Self::Unknown,
    ];

    /// Classify an object from its (optional) altitude and speed.
    ///
    /// Total and deterministic. When altitude is present but none of the
    /// altitude rules match, evaluation falls through to the speed-only rules.
    pub fn classify(altitude: Option<f64>, speed: Option<f64>) -> Self {
        if altitude.is_none() && speed.is_none() {
            return Self::Unknown;
        }

        if let Some(alt) = altitude {
            if alt <= 50.0 && speed.is_none_or(|spd| spd <= 40.0) {
                return Self::Ground;
            }
            if alt <= 400.0 && speed.is_some_and(|spd| spd <= 60.0) {
                return Self::Drone;
            }
            if alt <= 3000.0 && speed.is_none_or(|spd| spd < 170.0) {
                return if speed.is_some_and(|spd| spd < 120.0) {
                    Self::Helicopter
                } else {
                    Self::Airplane
                };
            }
            if alt > 3000.0 {
                return Self::Airplane;
            }
        }

        if let Some(spd) = speed {
            if spd < 10.0 {
                return Self::Ground;
            }
            if spd < 60.0 {
                return Self::Drone;
            }
            if spd < 200.0 {
                return Self::Airplane;
            }
        }

        Self::Unknown
    }

    /// Label as written to both sinks
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ground => "Ground",
            Self::Drone => "Drone",
            Self::Helicopter => "Helicopter",
            Self::Airplane => "Airplane",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown classification '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table() {
        let cases = [
            (None, None, Classification::Unknown),
            (Some(30.0), Some(20.0), Classification::Ground),
            (Some(200.0), Some(40.0), Classification::Drone),
            (Some(1000.0), Some(100.0), Classification::Helicopter),
            (Some(1000.0), Some(150.0), Classification::Airplane),
            (Some(5000.0), None, Classification::Airplane),
            (None, Some(5.0), Classification::Ground),
            (None, Some(150.0), Classification::Airplane),
        ];

        for (alt, spd, expected) in cases {
            assert_eq!(
                Classification::classify(alt, spd),
                expected,
                "alt={alt:?} spd={spd:?}"
            );
        }
    }

    #[test]
    fn test_threshold_boundaries() {
        // Inclusive bounds
        assert_eq!(
            Classification::classify(Some(50.0), Some(40.0)),
            Classification::Ground
        );
        assert_eq!(
            Classification::classify(Some(400.0), Some(60.0)),
            Classification::Drone
        );
        assert_eq!(
            Classification::classify(Some(50.0), None),
            Classification::Ground
        );
        // Exclusive bounds
        assert_eq!(
            Classification::classify(Some(1000.0), Some(120.0)),
            Classification::Airplane
        );
        assert_eq!(
            Classification::classify(Some(3000.0), None),
            Classification::Airplane
        );
        assert_eq!(
            Classification::classify(None, Some(10.0)),
            Classification::Drone
        );
        assert_eq!(
            Classification::classify(None, Some(60.0)),
            Classification::Airplane
        );
        assert_eq!(
            Classification::classify(None, Some(200.0)),
            Classification::Unknown
        );
    }

    #[test]
    fn test_low_and_fast_is_not_ground() {
        // alt <= 50 but speed > 40 skips Ground, lands on Drone
        assert_eq!(
            Classification::classify(Some(30.0), Some(45.0)),
            Classification::Drone
        );
    }

    #[test]
    fn test_altitude_rules_fall_through_to_speed() {
        // alt <= 3000 with speed >= 170 matches no altitude rule
        assert_eq!(
            Classification::classify(Some(2000.0), Some(180.0)),
            Classification::Airplane
        );
        assert_eq!(
            Classification::classify(Some(2000.0), Some(250.0)),
            Classification::Unknown
        );
    }

    #[test]
    fn test_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                Classification::classify(Some(1000.0), Some(100.0)),
                Classification::Helicopter
            );
        }
    }

    #[test]
    fn test_label_round_trip() {
        for c in Classification::ALL {
            assert_eq!(c.as_str().parse::<Classification>().unwrap(), c);
            assert_eq!(c.to_string(), c.as_str());
        }
        assert!("Balloon".parse::<Classification>().is_err());
    }
}
