//! Nameplate and loss-measurement inputs, and their validation.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    core::TOLERANCE,
    error::{StudyError, StudyResult},
    quantity::{
        current::Amperes,
        power::{Kilowatts, Megavoltamperes},
        voltage::Kilovolts,
    },
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformerKind {
    SinglePhase,
    ThreePhase,
}

impl TransformerKind {
    /// Phase factor `f` in `S = V·I·f`.
    pub fn factor(self) -> f64 {
        match self {
            Self::SinglePhase => 1.0,
            Self::ThreePhase => 3.0_f64.sqrt(),
        }
    }
}

/// Winding tap position of the transformer under test.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TapPosition {
    Nominal,
    Lower,
    Upper,
}

impl TapPosition {
    pub const ALL: [Self; 3] = [Self::Nominal, Self::Lower, Self::Upper];
}

impl Display for TapPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nominal => write!(f, "nominal"),
            Self::Lower => write!(f, "lower"),
            Self::Upper => write!(f, "upper"),
        }
    }
}

/// One value per tap position.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct TapSet<T> {
    pub nominal: T,
    pub lower: T,
    pub upper: T,
}

impl<T> TapSet<T> {
    pub const fn get(&self, tap: TapPosition) -> &T {
        match tap {
            TapPosition::Nominal => &self.nominal,
            TapPosition::Lower => &self.lower,
            TapPosition::Upper => &self.upper,
        }
    }
}

/// HV-side rating of one tap.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct TapRating {
    pub voltage: Kilovolts,
    pub impedance_percent: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nameplate {
    pub kind: TransformerKind,
    pub rated_power: Megavoltamperes,
    pub taps: TapSet<TapRating>,
}

impl Nameplate {
    /// Nominal HV current on the given tap, derived from the rated power.
    pub fn tap_current(&self, tap: TapPosition) -> Amperes {
        let rating = self.taps.get(tap);
        Amperes(self.rated_power.0 * 1000.0 / (rating.voltage.0 * self.kind.factor()))
    }

    /// Overload scenarios apply to ratings of 230 kV and above.
    pub fn overload_applicable(&self) -> bool {
        self.taps.nominal.voltage >= Kilovolts(230.0)
    }
}

/// Reference temperature of the loss measurement.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum, Serialize, Deserialize)]
pub enum ReferenceTemperature {
    #[value(name = "75")]
    T75,
    #[value(name = "85")]
    T85,
    #[value(name = "115")]
    T115,
}

impl ReferenceTemperature {
    pub const fn celsius(self) -> f64 {
        match self {
            Self::T75 => 75.0,
            Self::T85 => 85.0,
            Self::T115 => 115.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LossMeasurement {
    /// No-load loss, measured separately.
    pub no_load: Kilowatts,

    /// Total measured load losses per tap, at the reference temperature.
    pub load_total: TapSet<Kilowatts>,

    pub reference_temperature: ReferenceTemperature,
}

/// Reject missing, non-finite, or non-positive required inputs.
///
/// Collects every offending field so the caller can report them all at once
/// instead of failing one field at a time.
pub fn validate(nameplate: &Nameplate, losses: &LossMeasurement) -> StudyResult<()> {
    let mut fields = Vec::new();
    let mut check = |name: &'static str, value: f64| {
        if !value.is_finite() || value <= TOLERANCE {
            fields.push(name);
        }
    };

    check("rated-power-mva", nameplate.rated_power.0);
    check("nominal-tap-kv", nameplate.taps.nominal.voltage.0);
    check("nominal-impedance-percent", nameplate.taps.nominal.impedance_percent);
    check("lower-tap-kv", nameplate.taps.lower.voltage.0);
    check("lower-impedance-percent", nameplate.taps.lower.impedance_percent);
    check("upper-tap-kv", nameplate.taps.upper.voltage.0);
    check("upper-impedance-percent", nameplate.taps.upper.impedance_percent);
    check("no-load-loss-kw", losses.no_load.0);
    check("nominal-load-loss-kw", losses.load_total.nominal.0);
    check("lower-load-loss-kw", losses.load_total.lower.0);
    check("upper-load-loss-kw", losses.load_total.upper.0);

    if fields.is_empty() { Ok(()) } else { Err(StudyError::InvalidInput { fields }) }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn nameplate() -> Nameplate {
        Nameplate {
            kind: TransformerKind::ThreePhase,
            rated_power: Megavoltamperes(30.0),
            taps: TapSet {
                nominal: TapRating { voltage: Kilovolts(138.0), impedance_percent: 12.5 },
                lower: TapRating { voltage: Kilovolts(131.1), impedance_percent: 12.1 },
                upper: TapRating { voltage: Kilovolts(144.9), impedance_percent: 12.9 },
            },
        }
    }

    fn losses() -> LossMeasurement {
        LossMeasurement {
            no_load: Kilowatts(20.0),
            load_total: TapSet {
                nominal: Kilowatts(150.0),
                lower: Kilowatts(140.0),
                upper: Kilowatts(160.0),
            },
            reference_temperature: ReferenceTemperature::T75,
        }
    }

    #[test]
    fn test_tap_current_three_phase() {
        // 30 MVA at 138 kV: I = 30000 / (138 · √3).
        assert_abs_diff_eq!(
            nameplate().tap_current(TapPosition::Nominal).0,
            125.511,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_validate_accepts_complete_input() {
        assert!(validate(&nameplate(), &losses()).is_ok());
    }

    #[test]
    fn test_validate_names_offending_fields() {
        let mut nameplate = nameplate();
        nameplate.rated_power = Megavoltamperes(0.0);
        let mut losses = losses();
        losses.no_load = Kilowatts(f64::NAN);
        let error = validate(&nameplate, &losses).unwrap_err();
        match error {
            StudyError::InvalidInput { fields } => {
                assert_eq!(fields, vec!["rated-power-mva", "no-load-loss-kw"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overload_threshold() {
        let mut nameplate = nameplate();
        assert!(!nameplate.overload_applicable());
        nameplate.taps.nominal.voltage = Kilovolts(230.0);
        assert!(nameplate.overload_applicable());
    }
}
