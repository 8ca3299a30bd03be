//! The planning pipeline: scenarios → bank selection → switch search →
//! supply currents, assembled into one study.

pub mod bank;
pub mod input;
pub mod overall;
pub mod scenario;
pub mod supply;
pub mod switching;

use bon::Builder;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    catalog::CapacitorCatalog,
    core::{
        bank::{BankSelection, BankVoltageSelector, SelectionRule},
        input::{LossMeasurement, Nameplate, TapPosition, validate},
        overall::{CompensationAggregator, OverallConfiguration},
        scenario::{TapDerivation, TestScenario, derive_tap, scenarios},
        supply::{SupplyCurrentCompensator, SupplyRow},
        switching::{Compensation, SwitchCombinationOptimizer, group1_covers},
    },
    error::StudyResult,
};

/// Shared tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-6;

/// One selection rule's view of a scenario: what was asked and what the
/// bank can do about it.
#[derive(Clone, Debug, Serialize)]
pub struct RuleStudy {
    pub selection: BankSelection,
    pub compensation: Compensation,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScenarioStudy {
    pub scenario: TestScenario,
    pub without_factor: RuleStudy,
    pub with_factor: RuleStudy,
    pub supply: Vec<SupplyRow>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TapStudy {
    pub tap: TapPosition,
    pub derivation: TapDerivation,
    pub scenarios: Vec<ScenarioStudy>,
}

/// The complete output of one planning run.
#[derive(Clone, Debug, Serialize)]
pub struct LoadTestStudy {
    pub taps: Vec<TapStudy>,
    pub overall: Option<OverallConfiguration>,
}

#[derive(Builder)]
pub struct Planner<'a> {
    nameplate: &'a Nameplate,
    losses: &'a LossMeasurement,
    catalog: &'a CapacitorCatalog,
}

impl Planner<'_> {
    #[instrument(skip_all)]
    pub fn plan(self) -> StudyResult<LoadTestStudy> {
        validate(self.nameplate, self.losses)?;

        let kind = self.nameplate.kind;
        let selector = BankVoltageSelector::new(self.catalog)?;
        let compensator =
            SupplyCurrentCompensator::builder().supply(&self.catalog.supply).kind(kind).build();
        let with_overloads = self.nameplate.overload_applicable();
        let mut aggregator = CompensationAggregator::new();

        let mut taps = Vec::with_capacity(TapPosition::ALL.len());
        for tap in TapPosition::ALL {
            let derivation = derive_tap(self.nameplate, self.losses, tap)?;
            let total_loss = *self.losses.load_total.get(tap);

            let mut studies = Vec::new();
            for scenario in scenarios(kind, &derivation, total_loss, with_overloads) {
                let tiers = selector.select(scenario.voltage);
                let without_factor = self.rule_study(selector.requirement(
                    SelectionRule::WithoutFactor,
                    tiers.without_factor,
                    &scenario,
                ));
                let with_factor = self.rule_study(selector.requirement(
                    SelectionRule::WithFactor,
                    tiers.with_factor,
                    &scenario,
                ));
                aggregator.observe(&scenario, &without_factor.selection);
                aggregator.observe(&scenario, &with_factor.selection);

                let supply = compensator.window(
                    &scenario,
                    &without_factor.compensation,
                    &with_factor.compensation,
                );
                studies.push(ScenarioStudy { scenario, without_factor, with_factor, supply });
            }
            taps.push(TapStudy { tap, derivation, scenarios: studies });
        }

        let overall = aggregator.suggest(&selector, kind);
        info!(
            n_taps = taps.len(),
            n_scenarios = taps.iter().map(|tap| tap.scenarios.len()).sum::<usize>(),
            overall_suggested = overall.is_some(),
            "study computed",
        );
        Ok(LoadTestStudy { taps, overall })
    }

    fn rule_study(&self, selection: BankSelection) -> RuleStudy {
        let tier = &self.catalog.tiers()[selection.tier_index];
        let restrict = group1_covers(tier, selection.required_power);
        let compensation = SwitchCombinationOptimizer::builder()
            .tier(tier)
            .kind(self.nameplate.kind)
            .build()
            .optimize(selection.required_power, restrict);
        RuleStudy { selection, compensation }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        core::{
            input::{ReferenceTemperature, TapRating, TapSet, TransformerKind},
            scenario::ScenarioKind,
            supply::SUPPLY_WINDOW,
        },
        quantity::{
            power::{Kilowatts, Megavoltamperes},
            voltage::Kilovolts,
        },
    };

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

    fn plan() -> LoadTestStudy {
        let nameplate = nameplate();
        let losses = losses();
        let catalog = CapacitorCatalog::default();
        Planner::builder()
            .nameplate(&nameplate)
            .losses(&losses)
            .catalog(&catalog)
            .build()
            .plan()
            .unwrap()
    }

    #[test]
    fn test_three_taps_three_scenarios_below_overload_threshold() {
        let study = plan();
        assert_eq!(study.taps.len(), 3);
        for tap in &study.taps {
            assert_eq!(tap.scenarios.len(), 3);
            for scenario in &tap.scenarios {
                assert_eq!(scenario.supply.len(), SUPPLY_WINDOW);
            }
        }
    }

    #[test]
    fn test_overloads_appear_for_230_kv_ratings() {
        let mut nameplate = nameplate();
        nameplate.taps.nominal.voltage = Kilovolts(230.0);
        let losses = losses();
        let catalog = CapacitorCatalog::default();
        let study = Planner::builder()
            .nameplate(&nameplate)
            .losses(&losses)
            .catalog(&catalog)
            .build()
            .plan()
            .unwrap();
        let kinds: Vec<ScenarioKind> =
            study.taps[0].scenarios.iter().map(|s| s.scenario.kind).collect();
        assert!(kinds.contains(&ScenarioKind::Overload12));
        assert!(kinds.contains(&ScenarioKind::Overload14));
    }

    #[test]
    fn test_cold_energization_end_to_end_reference() {
        let study = plan();
        let nominal = &study.taps[0];
        assert_eq!(nominal.tap, TapPosition::Nominal);
        let cold = &nominal.scenarios[0];
        assert_eq!(cold.scenario.kind, ScenarioKind::ColdEnergization);

        // V = √(P_total/P_cold)·Vcc and I = √(P_total/P_cold)·I_nom.
        let cold_loss: f64 = 130.0 * 260.0 / 310.0;
        let scale = (150.0 / cold_loss).sqrt();
        assert_relative_eq!(cold.scenario.voltage.0, scale * 17.25, max_relative = 1e-3);
        assert_relative_eq!(cold.scenario.current.0, scale * 125.511, max_relative = 1e-3);
    }

    #[test]
    fn test_provided_power_covers_requirement() {
        let study = plan();
        for tap in &study.taps {
            for scenario in &tap.scenarios {
                for rule in [&scenario.without_factor, &scenario.with_factor] {
                    if let Some(bank) = rule.compensation.configured() {
                        assert!(
                            bank.provided_power.0
                                >= rule.selection.required_power.0 - TOLERANCE
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_overall_configuration_is_suggested() {
        let study = plan();
        let overall = study.overall.expect("a feasible study must carry a suggestion");
        assert!(overall.compensation.configured().is_some());
        assert!(!overall.out_of_range);
    }

    #[test]
    fn test_identical_inputs_give_identical_output() {
        let first = serde_json::to_string(&plan()).unwrap();
        let second = serde_json::to_string(&plan()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_input_stops_the_run() {
        let mut nameplate = nameplate();
        nameplate.taps.upper.impedance_percent = -1.0;
        let losses = losses();
        let catalog = CapacitorCatalog::default();
        let error = Planner::builder()
            .nameplate(&nameplate)
            .losses(&losses)
            .catalog(&catalog)
            .build()
            .plan()
            .unwrap_err();
        assert!(error.to_string().contains("upper-impedance-percent"));
    }
}
