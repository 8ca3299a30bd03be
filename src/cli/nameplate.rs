//! Nameplate-related CLI arguments.

use clap::Parser;

use crate::{
    core::input::{Nameplate, TapRating, TapSet, TransformerKind},
    quantity::{power::Megavoltamperes, voltage::Kilovolts},
};

#[must_use]
#[derive(Parser)]
pub struct NameplateArgs {
    /// Winding configuration of the transformer under test.
    #[clap(
        long = "transformer-kind",
        env = "TRANSFORMER_KIND",
        value_enum,
        default_value = "three-phase"
    )]
    pub kind: TransformerKind,

    /// Rated power in MVA.
    #[clap(long = "rated-power-mva", env = "RATED_POWER_MVA")]
    pub rated_power: Megavoltamperes,

    /// Nominal HV tap voltage in kV.
    #[clap(long = "nominal-tap-kv", env = "NOMINAL_TAP_KV")]
    pub nominal_tap: Kilovolts,

    /// Short-circuit impedance on the nominal tap, in percent.
    #[clap(long = "nominal-impedance-percent", env = "NOMINAL_IMPEDANCE_PERCENT")]
    pub nominal_impedance: f64,

    /// Lower HV tap voltage in kV.
    #[clap(long = "lower-tap-kv", env = "LOWER_TAP_KV")]
    pub lower_tap: Kilovolts,

    /// Short-circuit impedance on the lower tap, in percent.
    #[clap(long = "lower-impedance-percent", env = "LOWER_IMPEDANCE_PERCENT")]
    pub lower_impedance: f64,

    /// Upper HV tap voltage in kV.
    #[clap(long = "upper-tap-kv", env = "UPPER_TAP_KV")]
    pub upper_tap: Kilovolts,

    /// Short-circuit impedance on the upper tap, in percent.
    #[clap(long = "upper-impedance-percent", env = "UPPER_IMPEDANCE_PERCENT")]
    pub upper_impedance: f64,
}

impl NameplateArgs {
    pub fn to_nameplate(&self) -> Nameplate {
        Nameplate {
            kind: self.kind,
            rated_power: self.rated_power,
            taps: TapSet {
                nominal: TapRating {
                    voltage: self.nominal_tap,
                    impedance_percent: self.nominal_impedance,
                },
                lower: TapRating {
                    voltage: self.lower_tap,
                    impedance_percent: self.lower_impedance,
                },
                upper: TapRating {
                    voltage: self.upper_tap,
                    impedance_percent: self.upper_impedance,
                },
            },
        }
    }
}
