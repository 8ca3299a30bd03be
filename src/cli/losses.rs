//! Loss-measurement CLI arguments.

use clap::Parser;

use crate::{
    core::input::{LossMeasurement, ReferenceTemperature, TapSet},
    quantity::power::Kilowatts,
};

#[must_use]
#[derive(Parser)]
pub struct LossArgs {
    /// No-load loss in kW, from the no-load measurement.
    #[clap(long = "no-load-loss-kw", env = "NO_LOAD_LOSS_KW")]
    pub no_load: Kilowatts,

    /// Total load losses on the nominal tap, in kW.
    #[clap(long = "nominal-load-loss-kw", env = "NOMINAL_LOAD_LOSS_KW")]
    pub nominal: Kilowatts,

    /// Total load losses on the lower tap, in kW.
    #[clap(long = "lower-load-loss-kw", env = "LOWER_LOAD_LOSS_KW")]
    pub lower: Kilowatts,

    /// Total load losses on the upper tap, in kW.
    #[clap(long = "upper-load-loss-kw", env = "UPPER_LOAD_LOSS_KW")]
    pub upper: Kilowatts,

    /// Reference temperature of the loss measurement, in °C.
    #[clap(
        long = "reference-temperature",
        env = "REFERENCE_TEMPERATURE",
        value_enum,
        default_value = "75"
    )]
    pub reference_temperature: ReferenceTemperature,
}

impl LossArgs {
    pub fn to_measurement(&self) -> LossMeasurement {
        LossMeasurement {
            no_load: self.no_load,
            load_total: TapSet { nominal: self.nominal, lower: self.lower, upper: self.upper },
            reference_temperature: self.reference_temperature,
        }
    }
}
