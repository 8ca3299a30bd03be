//! Exhaustive search over the bank switch combinations.
//!
//! Every tier exposes five reactive steps (Q1..Q5), so the whole space is
//! 31 non-empty subsets. The search is exhaustive on purpose: the switch
//! count is a hardware constant, and enumeration is both trivial and
//! provably optimal.

use std::fmt::{Display, Formatter};

use bon::Builder;
use enumset::EnumSet;
use itertools::Itertools;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::{
    catalog::{CapacitorTier, Group},
    core::{TOLERANCE, input::TransformerKind},
    quantity::{power::Megavars, voltage::Kilovolts},
};

#[derive(Debug, enumset::EnumSetType)]
pub enum SwitchModule {
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
}

impl SwitchModule {
    const fn step_index(self) -> usize {
        self as usize
    }
}

impl Display for SwitchModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.step_index() + 1)
    }
}

pub type SwitchSet = EnumSet<SwitchModule>;

/// Total reactive power of a switch subset over `unit_count` capacitor units.
pub fn subset_power(tier: &CapacitorTier, switches: SwitchSet, unit_count: usize) -> Megavars {
    let per_unit: f64 =
        switches.iter().map(|switch| tier.switch_steps[switch.step_index()].0).sum();
    Megavars(per_unit * unit_count as f64)
}

/// Maximum deliverable power of one coupling group (all switches engaged).
pub fn group_power(tier: &CapacitorTier, group: Group) -> Megavars {
    subset_power(tier, SwitchSet::all(), tier.units_in(group).count())
}

/// Whether group 1 alone covers the requirement at this tier.
pub fn group1_covers(tier: &CapacitorTier, required: Megavars) -> bool {
    required.0 <= group_power(tier, Group::One).0 + TOLERANCE
}

/// A concrete bank setup able to run one scenario.
#[derive(Clone, Debug, Serialize)]
pub struct BankConfiguration {
    pub tier_voltage: Kilovolts,

    /// Catalog correction factor of the tier, carried along for the supply
    /// current calculation.
    pub correction_factor: f64,

    /// Only group 1 is coupled in.
    pub group1_only: bool,

    #[serde(serialize_with = "serialize_switches")]
    pub switches: SwitchSet,

    /// Coupling switch names, sorted and comma-separated.
    pub coupling: String,

    pub provided_power: Megavars,
}

impl BankConfiguration {
    pub fn switch_labels(&self) -> String {
        self.switches.iter().map(|switch| switch.to_string()).join(", ")
    }
}

fn serialize_switches<S: Serializer>(switches: &SwitchSet, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(switches.iter().map(|switch| switch.to_string()))
}

/// Outcome of the combination search for one requirement.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Compensation {
    /// Requirement is zero; nothing to switch in.
    NotNeeded,

    Configured(BankConfiguration),

    /// No subset reaches the requirement; the best the tier can do is
    /// reported so the caller can show "required X, max available Y".
    Infeasible { required: Megavars, max_available: Megavars },
}

impl Compensation {
    pub const fn configured(&self) -> Option<&BankConfiguration> {
        match self {
            Self::Configured(bank) => Some(bank),
            Self::NotNeeded | Self::Infeasible { .. } => None,
        }
    }
}

#[derive(Builder)]
pub struct SwitchCombinationOptimizer<'a> {
    tier: &'a CapacitorTier,
    kind: TransformerKind,
}

impl SwitchCombinationOptimizer<'_> {
    /// Find the cheapest switch subset providing at least `required`.
    ///
    /// Smallest total power wins; equal power resolves to the subset with
    /// fewer switches engaged.
    pub fn optimize(&self, required: Megavars, restrict_to_group1: bool) -> Compensation {
        if required <= Megavars(TOLERANCE) {
            return Compensation::NotNeeded;
        }

        let group1_count = self.tier.units_in(Group::One).count();
        let use_group1 = restrict_to_group1 && group1_count > 0;
        if restrict_to_group1 && group1_count == 0 {
            warn!(
                tier = %self.tier.voltage,
                "no group 1 units in this tier, searching the full bank instead",
            );
        }
        let unit_count = if use_group1 { group1_count } else { self.tier.units.len() };

        let mut best: Option<(SwitchSet, Megavars)> = None;
        for bits in 1_u64..(1 << SwitchSet::all().len()) {
            let switches = SwitchSet::from_u64_truncated(bits);
            let power = subset_power(self.tier, switches, unit_count);
            if power.0 < required.0 - TOLERANCE {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_switches, best_power)) => {
                    power.0 < best_power.0 - TOLERANCE
                        || ((power.0 - best_power.0).abs() < TOLERANCE
                            && switches.len() < best_switches.len())
                }
            };
            if better {
                best = Some((switches, power));
            }
        }

        match best {
            Some((switches, provided_power)) => {
                debug!(
                    tier = %self.tier.voltage,
                    %required,
                    %provided_power,
                    n_switches = switches.len(),
                    "combination found",
                );
                Compensation::Configured(BankConfiguration {
                    tier_voltage: self.tier.voltage,
                    correction_factor: self.tier.correction_factor,
                    group1_only: use_group1,
                    switches,
                    coupling: self.coupling_configuration(use_group1),
                    provided_power,
                })
            }
            None => {
                let max_available = subset_power(self.tier, SwitchSet::all(), unit_count);
                warn!(
                    tier = %self.tier.voltage,
                    %required,
                    %max_available,
                    "no switch combination reaches the requirement",
                );
                Compensation::Infeasible { required, max_available }
            }
        }
    }

    /// Coupling switch names for the circuit's phase configuration.
    ///
    /// In a three-phase circuit the group 2 switches stay open when group 1
    /// alone carries the compensation.
    fn coupling_configuration(&self, group1_only: bool) -> String {
        let switches = match self.kind {
            TransformerKind::ThreePhase => &self.tier.coupling_three_phase,
            TransformerKind::SinglePhase => &self.tier.coupling_single_phase,
        };
        switches
            .iter()
            .filter(|switch| {
                !(group1_only
                    && self.kind == TransformerKind::ThreePhase
                    && switch.group == Group::Two)
            })
            .map(|switch| switch.name.as_str())
            .sorted()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{catalog::CapacitorCatalog, quantity::Zero};

    fn optimizer(catalog: &CapacitorCatalog) -> SwitchCombinationOptimizer<'_> {
        SwitchCombinationOptimizer::builder()
            .tier(&catalog.tiers()[0])
            .kind(TransformerKind::ThreePhase)
            .build()
    }

    #[test]
    fn test_zero_requirement_skips_the_search() {
        let catalog = CapacitorCatalog::default();
        assert!(matches!(
            optimizer(&catalog).optimize(Megavars::ZERO, false),
            Compensation::NotNeeded
        ));
    }

    #[test]
    fn test_single_step_requirement_engages_one_switch() {
        let catalog = CapacitorCatalog::default();
        // Q2 alone over the full bank: 0.75 · 12 = 9 MVAr.
        let compensation = optimizer(&catalog).optimize(Megavars(9.0), false);
        let bank = compensation.configured().unwrap();
        assert_eq!(bank.switches, SwitchSet::only(SwitchModule::Q2));
        assert_abs_diff_eq!(bank.provided_power.0, 9.0);
    }

    #[test]
    fn test_minimum_feasible_power_wins() {
        let catalog = CapacitorCatalog::default();
        // Group 1 (6 units): Q1=1.8, Q2=4.5, Q3=9.0, Q4=13.5, Q5=18.0.
        // For 6 MVAr the cheapest cover is Q1+Q2 = 6.3, not Q3 = 9.0.
        let compensation = optimizer(&catalog).optimize(Megavars(6.0), true);
        let bank = compensation.configured().unwrap();
        assert_eq!(bank.switches, SwitchModule::Q1 | SwitchModule::Q2);
        assert_abs_diff_eq!(bank.provided_power.0, 6.3);
    }

    #[test]
    fn test_equal_power_resolves_to_fewer_switches() {
        let catalog = CapacitorCatalog::default();
        // Q2+Q3 and Q4 both sum to 2.25 per unit; Q4 engages fewer switches.
        let compensation = optimizer(&catalog).optimize(Megavars(13.5), true);
        let bank = compensation.configured().unwrap();
        assert_eq!(bank.switches, SwitchSet::only(SwitchModule::Q4));
    }

    #[test]
    fn test_soundness_over_a_requirement_sweep() {
        let catalog = CapacitorCatalog::default();
        let optimizer = optimizer(&catalog);
        let mut required = 0.5;
        while required < 90.0 {
            match optimizer.optimize(Megavars(required), false) {
                Compensation::Configured(bank) => {
                    assert!(bank.provided_power.0 >= required - TOLERANCE);
                }
                Compensation::NotNeeded => panic!("requirement {required} is positive"),
                Compensation::Infeasible { .. } => panic!("requirement {required} is coverable"),
            }
            required += 0.5;
        }
    }

    #[test]
    fn test_infeasible_reports_the_maximum() {
        let catalog = CapacitorCatalog::default();
        let compensation = optimizer(&catalog).optimize(Megavars(100.0), false);
        match compensation {
            Compensation::Infeasible { required, max_available } => {
                assert_abs_diff_eq!(required.0, 100.0);
                // 7.8 MVAr per unit over 12 units.
                assert_abs_diff_eq!(max_available.0, 93.6);
            }
            other => panic!("expected an infeasible outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_group1_restriction_halves_the_pool() {
        let catalog = CapacitorCatalog::default();
        let compensation = optimizer(&catalog).optimize(Megavars(50.0), true);
        // Group 1 tops out at 46.8 MVAr.
        assert!(matches!(compensation, Compensation::Infeasible { .. }));
    }

    #[test]
    fn test_group1_coupling_leaves_group2_open() {
        let catalog = CapacitorCatalog::default();
        let compensation = optimizer(&catalog).optimize(Megavars(9.0), true);
        let bank = compensation.configured().unwrap();
        assert!(bank.group1_only);
        assert_eq!(bank.coupling, "CS1A1, CS1B1, CS1C1");
    }

    #[test]
    fn test_full_bank_coupling_includes_both_groups() {
        let catalog = CapacitorCatalog::default();
        let compensation = optimizer(&catalog).optimize(Megavars(60.0), false);
        let bank = compensation.configured().unwrap();
        assert_eq!(bank.coupling, "CS1A1, CS1A2, CS1B1, CS1B2, CS1C1, CS1C2");
    }

    #[test]
    fn test_determinism() {
        let catalog = CapacitorCatalog::default();
        let optimizer = optimizer(&catalog);
        let first = optimizer.optimize(Megavars(25.0), false);
        let second = optimizer.optimize(Megavars(25.0), false);
        match (first, second) {
            (Compensation::Configured(a), Compensation::Configured(b)) => {
                assert_eq!(a.switches, b.switches);
                assert_eq!(a.provided_power, b.provided_power);
            }
            other => panic!("expected configured outcomes, got {other:?}"),
        }
    }
}
