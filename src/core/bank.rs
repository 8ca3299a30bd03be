//! Capacitor-bank voltage tier selection.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use tracing::warn;

use crate::{
    catalog::{CapacitorCatalog, CapacitorTier},
    core::{TOLERANCE, scenario::TestScenario},
    error::{StudyError, StudyResult},
    quantity::{power::Megavars, voltage::Kilovolts},
};

/// Tier selection rule.
///
/// "Without factor" (S/F) demands a tier at or above the test voltage;
/// "with factor" (C/F) accepts a tier down to test voltage / 1.1.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionRule {
    WithoutFactor,
    WithFactor,
}

impl SelectionRule {
    /// Overvoltage margin the rule allows on the tier.
    pub const fn margin(self) -> f64 {
        match self {
            Self::WithoutFactor => 1.0,
            Self::WithFactor => 1.1,
        }
    }
}

impl Display for SelectionRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WithoutFactor => write!(f, "S/F"),
            Self::WithFactor => write!(f, "C/F"),
        }
    }
}

/// A tier picked for one rule.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct TierChoice {
    pub index: usize,

    /// The requirement exceeded every tier and the largest one was used.
    pub out_of_range: bool,
}

#[derive(Copy, Clone, Debug)]
pub struct SelectedTiers {
    pub without_factor: TierChoice,
    pub with_factor: TierChoice,
}

/// What one rule asks of the bank for one scenario.
#[derive(Clone, Debug, Serialize)]
pub struct BankSelection {
    pub rule: SelectionRule,
    #[serde(skip)]
    pub tier_index: usize,
    pub tier_voltage: Kilovolts,
    pub out_of_range: bool,

    /// Reactive power the bank must be rated for at its nominal voltage.
    pub required_power: Megavars,
}

pub struct BankVoltageSelector<'a> {
    catalog: &'a CapacitorCatalog,
}

impl<'a> BankVoltageSelector<'a> {
    pub fn new(catalog: &'a CapacitorCatalog) -> StudyResult<Self> {
        if catalog.tiers().is_empty() {
            return Err(StudyError::EmptyCatalog);
        }
        Ok(Self { catalog })
    }

    pub fn tier(&self, choice: TierChoice) -> &'a CapacitorTier {
        &self.catalog.tiers()[choice.index]
    }

    /// Pick a tier under both rules for the given test voltage.
    pub fn select(&self, required_voltage: Kilovolts) -> SelectedTiers {
        SelectedTiers {
            without_factor: self.pick(required_voltage, SelectionRule::WithoutFactor),
            with_factor: self.pick(required_voltage, SelectionRule::WithFactor),
        }
    }

    fn pick(&self, required_voltage: Kilovolts, rule: SelectionRule) -> TierChoice {
        let tiers = self.catalog.tiers();
        for (index, tier) in tiers.iter().enumerate() {
            if required_voltage.0 <= tier.voltage.0 * rule.margin() + TOLERANCE {
                return TierChoice { index, out_of_range: false };
            }
        }
        let highest = tiers.last().expect("the catalog is checked to be non-empty");
        warn!(
            %required_voltage,
            highest_tier = %highest.voltage,
            %rule,
            "test voltage exceeds every bank tier, falling back to the highest",
        );
        TierChoice { index: tiers.len() - 1, out_of_range: true }
    }

    /// Reactive power the tier must supply so that the scenario's apparent
    /// power is available at the test voltage.
    ///
    /// A capacitor bank delivers power with the square of the voltage it
    /// runs at, so the nameplate requirement scales with the inverse square
    /// of the test/tier voltage ratio.
    pub fn requirement(
        &self,
        rule: SelectionRule,
        choice: TierChoice,
        scenario: &TestScenario,
    ) -> BankSelection {
        let tier = self.tier(choice);
        let ratio = scenario.voltage / tier.voltage;
        let voltage_scaling = ratio * ratio;
        let required_power = if voltage_scaling > TOLERANCE {
            Megavars(scenario.apparent_power.0 / voltage_scaling)
        } else {
            Megavars(f64::INFINITY)
        };
        BankSelection {
            rule,
            tier_index: choice.index,
            tier_voltage: tier.voltage,
            out_of_range: choice.out_of_range,
            required_power,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn selector(catalog: &CapacitorCatalog) -> BankVoltageSelector<'_> {
        BankVoltageSelector::new(catalog).unwrap()
    }

    fn tier_voltage(selector: &BankVoltageSelector<'_>, choice: TierChoice) -> f64 {
        selector.tier(choice).voltage.0
    }

    #[test]
    fn test_without_factor_picks_next_tier_up() {
        let catalog = CapacitorCatalog::default();
        let selector = selector(&catalog);
        let tiers = selector.select(Kilovolts(20.0));
        assert_abs_diff_eq!(tier_voltage(&selector, tiers.without_factor), 23.9);
    }

    #[test]
    fn test_with_factor_accepts_ten_percent_undervoltage() {
        let catalog = CapacitorCatalog::default();
        let selector = selector(&catalog);
        // 15.0 ≤ 13.8 · 1.1, so C/F stays on the lower tier while S/F moves up.
        let tiers = selector.select(Kilovolts(15.0));
        assert_abs_diff_eq!(tier_voltage(&selector, tiers.with_factor), 13.8);
        assert_abs_diff_eq!(tier_voltage(&selector, tiers.without_factor), 23.9);
    }

    #[test]
    fn test_exact_tier_voltage_selects_that_tier() {
        let catalog = CapacitorCatalog::default();
        let selector = selector(&catalog);
        let tiers = selector.select(Kilovolts(41.4));
        assert_abs_diff_eq!(tier_voltage(&selector, tiers.without_factor), 41.4);
        assert_abs_diff_eq!(tier_voltage(&selector, tiers.with_factor), 41.4);
    }

    #[test]
    fn test_out_of_range_falls_back_to_highest() {
        let catalog = CapacitorCatalog::default();
        let selector = selector(&catalog);
        let tiers = selector.select(Kilovolts(150.0));
        assert!(tiers.without_factor.out_of_range);
        assert!(tiers.with_factor.out_of_range);
        assert_abs_diff_eq!(tier_voltage(&selector, tiers.without_factor), 95.6);
    }

    #[test]
    fn test_selection_is_monotonic_in_voltage() {
        let catalog = CapacitorCatalog::default();
        let selector = selector(&catalog);
        let mut previous = 0.0;
        for voltage in [1.0, 10.0, 13.8, 14.0, 23.0, 30.0, 41.5, 70.0, 90.0, 100.0, 200.0] {
            let choice = selector.select(Kilovolts(voltage)).without_factor;
            let selected = tier_voltage(&selector, choice);
            assert!(selected >= previous, "tier went down at {voltage} kV");
            previous = selected;
        }
    }

    #[test]
    fn test_requirement_scales_with_the_voltage_ratio() {
        let catalog = CapacitorCatalog::default();
        let selector = selector(&catalog);
        let scenario = TestScenario {
            kind: crate::core::scenario::ScenarioKind::Reference25,
            voltage: Kilovolts(15.0),
            current: crate::quantity::current::Amperes(100.0),
            apparent_power: crate::quantity::power::Megavoltamperes(10.0),
            active_power: crate::quantity::power::Kilowatts(100.0),
            reactive_power: Megavars(9.99),
        };
        let tiers = selector.select(scenario.voltage);
        let selection =
            selector.requirement(SelectionRule::WithFactor, tiers.with_factor, &scenario);
        // The bank runs above its nominal 13.8 kV, so a smaller rating suffices.
        assert_abs_diff_eq!(selection.required_power.0, 10.0 / (15.0 / 13.8_f64).powi(2));
    }
}
