//! One suggested bank setup for the whole test session.

use serde::Serialize;
use tracing::debug;

use crate::{
    core::{
        TOLERANCE,
        bank::{BankSelection, BankVoltageSelector},
        input::TransformerKind,
        scenario::TestScenario,
        switching::{Compensation, SwitchCombinationOptimizer, group1_covers},
    },
    quantity::{Zero, power::Megavars, voltage::Kilovolts},
};

/// The single field configuration covering every scenario at once.
///
/// The maximum test voltage across all scenarios drives the tier, and the
/// maximum required bank power (not the sum) drives the switch search.
#[derive(Clone, Debug, Serialize)]
pub struct OverallConfiguration {
    pub max_test_voltage: Kilovolts,
    pub max_required_power: Megavars,
    pub tier_voltage: Kilovolts,
    pub out_of_range: bool,
    pub compensation: Compensation,
}

pub struct CompensationAggregator {
    max_voltage: Kilovolts,
    max_required: Megavars,
}

impl Default for CompensationAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl CompensationAggregator {
    pub fn new() -> Self {
        Self { max_voltage: Kilovolts::ZERO, max_required: Megavars::ZERO }
    }

    /// Fold in one scenario-rule requirement.
    ///
    /// Unbounded requirements (degenerate voltage ratios) are left out so a
    /// single broken scenario cannot poison the overall suggestion.
    pub fn observe(&mut self, scenario: &TestScenario, selection: &BankSelection) {
        self.max_voltage = self.max_voltage.max(scenario.voltage);
        if selection.required_power.0.is_finite() {
            self.max_required = self.max_required.max(selection.required_power);
        }
    }

    pub fn suggest(
        self,
        selector: &BankVoltageSelector<'_>,
        kind: TransformerKind,
    ) -> Option<OverallConfiguration> {
        if self.max_voltage.0 <= TOLERANCE || self.max_required.0 <= TOLERANCE {
            return None;
        }

        let choice = selector.select(self.max_voltage).with_factor;
        let tier = selector.tier(choice);
        let restrict = group1_covers(tier, self.max_required);
        debug!(
            max_voltage = %self.max_voltage,
            max_required = %self.max_required,
            tier = %tier.voltage,
            group1_only = restrict,
            "suggesting the overall bank configuration",
        );
        let compensation = SwitchCombinationOptimizer::builder()
            .tier(tier)
            .kind(kind)
            .build()
            .optimize(self.max_required, restrict);
        Some(OverallConfiguration {
            max_test_voltage: self.max_voltage,
            max_required_power: self.max_required,
            tier_voltage: tier.voltage,
            out_of_range: choice.out_of_range,
            compensation,
        })
    }
}
