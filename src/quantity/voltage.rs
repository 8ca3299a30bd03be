use std::ops::Mul;

use crate::quantity::{current::Amperes, power::Kilovoltamperes};

quantity!(Volts, suffix: "V", precision: 0);
quantity!(Kilovolts, suffix: "kV", precision: 2);

impl From<Kilovolts> for Volts {
    fn from(kilovolts: Kilovolts) -> Self {
        Self(kilovolts.0 * 1000.0)
    }
}

impl From<Volts> for Kilovolts {
    fn from(volts: Volts) -> Self {
        Self(volts.0 / 1000.0)
    }
}

impl Mul<Amperes> for Kilovolts {
    type Output = Kilovoltamperes;

    fn mul(self, current: Amperes) -> Self::Output {
        Kilovoltamperes(self.0 * current.0)
    }
}
