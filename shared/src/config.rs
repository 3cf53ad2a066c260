use std::env;

use lazy_static::lazy_static;

/// Largest bit width accepted for an exhaustive run
pub const MAX_WIDTH: u32 = 8;

/// Bit width used when a sweep is not told otherwise
pub const DEFAULT_SWEEP_WIDTH: u32 = 4;

// common configurations
lazy_static! {
    pub static ref PARALLEL: bool = !matches!(env::var("PARALLEL"), Ok(val) if val == "0");
}
