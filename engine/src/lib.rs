pub use error::EngineError;

use crate::error::{EngineResult, Misconfig};
use crate::flow::{Driver, Report, RunConfig};
use crate::ir::operator::OperatorSpec;

pub mod analysis;
pub mod error;
pub mod flow;
pub mod ir;

/// Main entrypoint
pub fn verify(config: RunConfig, specs: &[OperatorSpec]) -> EngineResult<Vec<Report>> {
    if specs.is_empty() {
        return Err(Misconfig::EmptyOperatorSet.into());
    }
    let driver = Driver::new(config)?;
    Ok(driver.run_all(specs))
}
