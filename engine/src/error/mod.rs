use std::error::Error;
use std::fmt::{Display, Formatter};

/// A list of configuration mistakes detected before any enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Misconfig {
    WidthOutOfRange(u32),
    UnknownOperator(String),
    UnknownFlag(String),
    UnknownEnumerator(String),
    FlagNotApplicable { flag: String, ops: String },
    EmptyOperatorSet,
}

impl Display for Misconfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WidthOutOfRange(width) => {
                write!(f, "bit width {} is out of the supported range", width)
            }
            Self::UnknownOperator(name) => {
                write!(f, "unknown operator '{}'", name)
            }
            Self::UnknownFlag(name) => {
                write!(f, "unknown flag '{}'", name)
            }
            Self::UnknownEnumerator(name) => {
                write!(f, "unknown enumerator '{}'", name)
            }
            Self::FlagNotApplicable { flag, ops } => {
                write!(f, "flag '{}' is not applicable to any of: {}", flag, ops)
            }
            Self::EmptyOperatorSet => {
                write!(f, "no operator selected")
            }
        }
    }
}

/// A custom error message for the verification engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A lattice with overlapping or out-of-width masks
    InvalidLattice { width: u32, zero: u64, one: u64 },
    /// Malformed textual rendering of a lattice
    MalformedLattice(String),
    /// Rejected configuration
    InvalidConfig(Misconfig),
    /// Invariant violation
    InvariantViolation(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLattice { width, zero, one } => {
                write!(
                    f,
                    "[kbits::lattice] invalid i{} lattice: zero = {:#x}, one = {:#x}",
                    width, zero, one
                )
            }
            Self::MalformedLattice(text) => {
                write!(f, "[kbits::parse] malformed lattice '{}'", text)
            }
            Self::InvalidConfig(item) => {
                write!(f, "[kbits::config] {}", item)
            }
            Self::InvariantViolation(msg) => {
                write!(f, "[kbits::invariant] {}", msg)
            }
        }
    }
}

impl Error for EngineError {}

impl From<Misconfig> for EngineError {
    fn from(item: Misconfig) -> Self {
        Self::InvalidConfig(item)
    }
}
