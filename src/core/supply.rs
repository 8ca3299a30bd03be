//! Net EPS current over the SUT tap window, after reactive compensation.

use bon::Builder;
use serde::Serialize;

use crate::{
    catalog::SupplyTransformer,
    core::{TOLERANCE, input::TransformerKind, scenario::TestScenario, switching::Compensation},
    quantity::{
        current::Amperes,
        voltage::{Kilovolts, Volts},
    },
};

/// How many SUT taps around the target voltage are presented.
pub const SUPPLY_WINDOW: usize = 5;

/// Net current demanded from the EPS at one SUT tap.
///
/// A negative current means the capacitor bank over-compensates at this
/// tap; that is a valid, explicitly signed outcome.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct CompensatedCurrent {
    pub current: Amperes,

    /// Share of the EPS current limit, carrying the sign of the current.
    pub percent_of_limit: f64,
}

/// One row of the side-by-side S/F / C/F table.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct SupplyRow {
    pub tap_voltage: Kilovolts,
    pub without_factor: CompensatedCurrent,
    pub with_factor: CompensatedCurrent,
}

#[derive(Builder)]
pub struct SupplyCurrentCompensator<'a> {
    supply: &'a SupplyTransformer,
    kind: TransformerKind,
}

impl SupplyCurrentCompensator<'_> {
    /// The [`SUPPLY_WINDOW`] taps nearest the scenario's test voltage,
    /// ascending, each evaluated under both selection rules.
    pub fn window(
        &self,
        scenario: &TestScenario,
        without_factor: &Compensation,
        with_factor: &Compensation,
    ) -> Vec<SupplyRow> {
        let target = Volts::from(scenario.voltage);
        let mut taps = self.supply.hv_taps();
        taps.sort_by(|a, b| {
            (a.0 - target.0).abs().total_cmp(&(b.0 - target.0).abs())
        });
        taps.truncate(SUPPLY_WINDOW);
        taps.sort_unstable();
        taps.into_iter()
            .map(|tap| SupplyRow {
                tap_voltage: tap.into(),
                without_factor: self.compensate(scenario, without_factor, tap),
                with_factor: self.compensate(scenario, with_factor, tap),
            })
            .collect()
    }

    /// Net EPS current at one SUT tap.
    ///
    /// The scenario current reflects through the SUT ratio; the bank's
    /// provided power is corrected for the mismatch between the test
    /// voltage and the bank's nominal voltage, converted to a compensating
    /// current, and subtracted. Without a configured bank the reflected
    /// current passes through unchanged.
    pub fn compensate(
        &self,
        scenario: &TestScenario,
        compensation: &Compensation,
        hv_tap: Volts,
    ) -> CompensatedCurrent {
        let ratio = hv_tap / self.supply.lv_voltage;
        let reflected = scenario.current * ratio;

        let current = match compensation.configured() {
            Some(bank)
                if bank.provided_power.0 > TOLERANCE && bank.tier_voltage.0 > TOLERANCE =>
            {
                let mismatch = scenario.voltage / bank.tier_voltage;
                let corrected =
                    bank.provided_power * (mismatch * mismatch) * bank.correction_factor;
                let compensating = Amperes(
                    corrected.0 * 1000.0 / (scenario.voltage.0 * self.kind.factor()),
                ) * ratio;
                reflected - compensating
            }
            _ => reflected,
        };

        let percent_of_limit = if self.supply.current_limit.0 > TOLERANCE {
            current.0 / self.supply.current_limit.0 * 100.0
        } else {
            f64::INFINITY
        };
        CompensatedCurrent { current, percent_of_limit }
    }
}
