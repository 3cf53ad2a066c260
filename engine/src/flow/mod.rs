//
// Verification runs: cases, statistics and the driver over operators
//
mod driver;
pub mod stats;
pub mod verify;

pub use driver::{save_reports, Driver, Report, RunConfig, Shape};
