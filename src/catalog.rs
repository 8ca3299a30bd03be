//! The capacitor-bank and supply-side catalog of the test field.
//!
//! Everything in here is configuration data, not behavior: which bank
//! voltage tiers exist, which capacitor units and coupling switches belong
//! to each tier, the reactive step of each bank switch, and the step-up
//! transformer (SUT) tap range feeding the energizing power supply (EPS).
//! The built-in [`CapacitorCatalog::default`] describes the EPS field this
//! tool was written for; a replacement catalog can be loaded from TOML.

use serde::{Deserialize, Serialize};

use crate::{
    error::{StudyError, StudyResult},
    quantity::{
        current::Amperes,
        power::Megavars,
        voltage::{Kilovolts, Volts},
    },
};

/// Number of individually switchable reactive steps per bank.
pub const SWITCH_COUNT: usize = 5;

/// Coupling group of a capacitor unit or coupling switch.
///
/// Group 1 is the half of the bank that is normally engaged first; group 2
/// doubles the available reactive power when the requirement outgrows
/// group 1.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Group {
    One,
    Two,
}

/// A physical capacitor unit within a tier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BankUnit {
    pub name: String,
    pub group: Group,
}

/// A coupling (CS) switch that ties part of the bank to the test circuit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CouplingSwitch {
    pub name: String,
    pub group: Group,
}

/// One voltage tier of the capacitor bank.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapacitorTier {
    /// Nominal tier voltage.
    pub voltage: Kilovolts,

    /// Correction factor applied when the bank runs off its nominal voltage.
    pub correction_factor: f64,

    /// Reactive step of switches Q1..Q5, per capacitor unit.
    pub switch_steps: [Megavars; SWITCH_COUNT],

    pub units: Vec<BankUnit>,

    pub coupling_three_phase: Vec<CouplingSwitch>,
    pub coupling_single_phase: Vec<CouplingSwitch>,
}

impl CapacitorTier {
    pub fn units_in(&self, group: Group) -> impl Iterator<Item = &BankUnit> {
        self.units.iter().filter(move |unit| unit.group == group)
    }
}

/// Step-up test transformer and EPS limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SupplyTransformer {
    /// Nominal low-side voltage, where the EPS current is drawn.
    pub lv_voltage: Volts,

    /// High-side tap range (inclusive), an arithmetic series.
    pub hv_tap_min: Volts,
    pub hv_tap_max: Volts,
    pub hv_tap_step: Volts,

    /// EPS current limit on the low side.
    pub current_limit: Amperes,
}

impl SupplyTransformer {
    /// All positive high-side tap voltages, ascending.
    pub fn hv_taps(&self) -> Vec<Volts> {
        let mut taps = Vec::new();
        let mut tap = self.hv_tap_min.0;
        while tap <= self.hv_tap_max.0 + f64::EPSILON {
            if tap > crate::core::TOLERANCE {
                taps.push(Volts(tap));
            }
            tap += self.hv_tap_step.0;
        }
        taps
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapacitorCatalog {
    tiers: Vec<CapacitorTier>,
    pub supply: SupplyTransformer,
}

impl CapacitorCatalog {
    /// Build a catalog, sorting the tiers by ascending nominal voltage.
    pub fn new(mut tiers: Vec<CapacitorTier>, supply: SupplyTransformer) -> StudyResult<Self> {
        if tiers.is_empty() {
            return Err(StudyError::EmptyCatalog);
        }
        tiers.sort_by_key(|tier| tier.voltage);
        Ok(Self { tiers, supply })
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let catalog: Self = toml::from_str(raw)?;
        Self::new(catalog.tiers, catalog.supply).map_err(Into::into)
    }

    /// Tiers in ascending voltage order.
    pub fn tiers(&self) -> &[CapacitorTier] {
        &self.tiers
    }
}

impl Default for CapacitorCatalog {
    fn default() -> Self {
        let tiers = [(13.8, 0.25), (23.9, 0.25), (41.4, 0.75), (71.7, 0.75), (95.6, 1.0)]
            .into_iter()
            .map(|(voltage, correction_factor)| CapacitorTier {
                voltage: Kilovolts(voltage),
                correction_factor,
                switch_steps: [
                    Megavars(0.3),
                    Megavars(0.75),
                    Megavars(1.5),
                    Megavars(2.25),
                    Megavars(3.0),
                ],
                units: standard_units(),
                coupling_three_phase: coupling(&["CS1A", "CS1B", "CS1C"]),
                coupling_single_phase: coupling(&["CS1A", "CS2A"]),
            })
            .collect();
        Self {
            tiers,
            supply: SupplyTransformer {
                lv_voltage: Volts(600.0),
                hv_tap_min: Volts(14_400.0),
                hv_tap_max: Volts(144_000.0),
                hv_tap_step: Volts(7_200.0),
                current_limit: Amperes(2_000.0),
            },
        }
    }
}

/// The standard complement: two banks of three phases, in both groups.
fn standard_units() -> Vec<BankUnit> {
    let mut units = Vec::with_capacity(12);
    for (group, suffix) in [(Group::One, '1'), (Group::Two, '2')] {
        for bank in ['1', '2'] {
            for phase in ['A', 'B', 'C'] {
                units.push(BankUnit { name: format!("CP{bank}{phase}{suffix}"), group });
            }
        }
    }
    units
}

fn coupling(stems: &[&str]) -> Vec<CouplingSwitch> {
    let mut switches = Vec::with_capacity(stems.len() * 2);
    for (group, suffix) in [(Group::One, '1'), (Group::Two, '2')] {
        for stem in stems {
            switches.push(CouplingSwitch { name: format!("{stem}{suffix}"), group });
        }
    }
    switches
}
