#[macro_use]
pub mod macros;

pub mod current;
pub mod power;
pub mod voltage;
mod zero;

pub use self::zero::Zero;
