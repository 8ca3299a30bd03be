//! Per-tap test scenarios: the quantities the supply must produce.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{
    core::{
        TOLERANCE,
        input::{LossMeasurement, Nameplate, TapPosition, TransformerKind},
    },
    error::{StudyError, StudyResult},
    quantity::{
        current::Amperes,
        power::{Kilowatts, Megavars, Megavoltamperes},
        voltage::Kilovolts,
    },
};

/// Copper resistance/temperature constant used for loss correction.
const COPPER_CONSTANT: f64 = 235.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Cold energization: the supply covers the full measured losses.
    ColdEnergization,

    /// Hot condition: load losses at the reference temperature.
    HotCondition,

    /// Reference measurement at 25 °C with nominal current.
    Reference25,

    Overload12,
    Overload14,
}

impl Display for ScenarioKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColdEnergization => write!(f, "cold energization"),
            Self::HotCondition => write!(f, "hot condition"),
            Self::Reference25 => write!(f, "25 °C"),
            Self::Overload12 => write!(f, "1.2 pu"),
            Self::Overload14 => write!(f, "1.4 pu"),
        }
    }
}

/// Test quantities of one scenario on one tap.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct TestScenario {
    pub kind: ScenarioKind,
    pub voltage: Kilovolts,
    pub current: Amperes,
    pub apparent_power: Megavoltamperes,
    pub active_power: Kilowatts,
    pub reactive_power: Megavars,
}

/// Intermediate per-tap quantities the scenarios are built from.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct TapDerivation {
    /// Short-circuit test voltage.
    pub vcc: Kilovolts,

    pub nominal_current: Amperes,

    /// Total losses minus no-load losses, at the reference temperature.
    pub load_loss: Kilowatts,

    /// Load losses corrected down to 25 °C.
    pub cold_loss: Kilowatts,
}

pub fn derive_tap(
    nameplate: &Nameplate,
    losses: &LossMeasurement,
    tap: TapPosition,
) -> StudyResult<TapDerivation> {
    let rating = nameplate.taps.get(tap);
    let total = *losses.load_total.get(tap);

    let load_loss = total - losses.no_load;
    if load_loss.0 <= TOLERANCE {
        return Err(StudyError::NonPositiveLoadLoss { tap, kilowatts: load_loss });
    }

    let temperature_factor = (COPPER_CONSTANT + 25.0)
        / (COPPER_CONSTANT + losses.reference_temperature.celsius());
    Ok(TapDerivation {
        vcc: rating.voltage / 100.0 * rating.impedance_percent,
        nominal_current: nameplate.tap_current(tap),
        load_loss,
        cold_loss: load_loss * temperature_factor,
    })
}

/// Build the scenario list for one tap.
///
/// Overload scenarios are appended only when the caller says they apply
/// (nominal rating ≥ 230 kV).
pub fn scenarios(
    kind: TransformerKind,
    derivation: &TapDerivation,
    total_loss: Kilowatts,
    with_overloads: bool,
) -> Vec<TestScenario> {
    let cold_scale = (total_loss.0 / derivation.cold_loss.0).sqrt();
    let hot_scale = (derivation.load_loss.0 / derivation.cold_loss.0).sqrt();

    let mut scenarios = vec![
        scenario(
            kind,
            ScenarioKind::ColdEnergization,
            derivation.vcc * cold_scale,
            derivation.nominal_current * cold_scale,
            total_loss,
        ),
        scenario(
            kind,
            ScenarioKind::HotCondition,
            derivation.vcc * hot_scale,
            derivation.nominal_current * hot_scale,
            derivation.load_loss,
        ),
        scenario(
            kind,
            ScenarioKind::Reference25,
            derivation.vcc,
            derivation.nominal_current,
            derivation.cold_loss,
        ),
    ];

    if with_overloads {
        for (scenario_kind, pu) in
            [(ScenarioKind::Overload12, 1.2), (ScenarioKind::Overload14, 1.4)]
        {
            scenarios.push(scenario(
                kind,
                scenario_kind,
                derivation.vcc * pu,
                derivation.nominal_current * pu,
                // Ohmic losses grow with the square of the current:
                derivation.load_loss * (pu * pu),
            ));
        }
    }

    scenarios
}

fn scenario(
    kind: TransformerKind,
    scenario_kind: ScenarioKind,
    voltage: Kilovolts,
    current: Amperes,
    active_power: Kilowatts,
) -> TestScenario {
    let apparent = voltage * current * kind.factor();
    let reactive = Megavars(
        (apparent.0 * apparent.0 - active_power.0 * active_power.0).max(0.0).sqrt() / 1000.0,
    );
    TestScenario {
        kind: scenario_kind,
        voltage,
        current,
        apparent_power: apparent.into(),
        active_power,
        reactive_power: reactive,
    }
}
