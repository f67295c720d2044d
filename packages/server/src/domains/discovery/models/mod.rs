//! Discovery domain models.

pub mod calibration;
pub mod comparison;
pub mod report;

pub use calibration::*;
pub use comparison::*;
pub use report::*;
