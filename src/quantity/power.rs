quantity!(Kilowatts, suffix: "kW", precision: 2);
quantity!(Kilovoltamperes, suffix: "kVA", precision: 1);
quantity!(Megavoltamperes, suffix: "MVA", precision: 2);
quantity!(Megavars, suffix: "MVAr", precision: 2);

impl From<Kilovoltamperes> for Megavoltamperes {
    fn from(kilovoltamperes: Kilovoltamperes) -> Self {
        Self(kilovoltamperes.0 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megavoltamperes_from_kilovoltamperes() {
        assert_eq!(Megavoltamperes::from(Kilovoltamperes(1500.0)), Megavoltamperes(1.5));
    }
}
