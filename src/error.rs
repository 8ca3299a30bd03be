//! Typed failures of the planning pipeline.
//!
//! Only conditions that prevent a study from being computed are errors.
//! Degraded-but-usable outcomes (an out-of-range bank voltage, a switch
//! combination that cannot reach the requirement) are ordinary result
//! variants carried inside the study itself.

use thiserror::Error;

use crate::{core::input::TapPosition, quantity::power::Kilowatts};

#[derive(Error, Debug)]
pub enum StudyError {
    /// One or more required inputs are missing, non-finite, or not positive.
    #[error("invalid input, check the following fields: {}", fields.join(", "))]
    InvalidInput { fields: Vec<&'static str> },

    /// Total losses minus no-load losses must leave a positive load loss.
    #[error(
        "load losses on the {tap} tap are not positive ({kilowatts}); \
         check the total and no-load loss inputs"
    )]
    NonPositiveLoadLoss { tap: TapPosition, kilowatts: Kilowatts },

    /// The capacitor catalog carries no voltage tiers at all.
    #[error("the capacitor catalog has no voltage tiers")]
    EmptyCatalog,
}

pub type StudyResult<T> = Result<T, StudyError>;
