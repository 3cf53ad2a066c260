use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, Misconfig};

use super::bits::{low_bits, BitLattice};

/// Strategy for walking the lattice space of a width
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Two wrapping counters, conflicting pairs are skipped
    Reference,
    /// Closed-form submask stepping, never visits a conflict
    Fast,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Fast
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let algorithm = match s {
            "reference" => Self::Reference,
            "fast" => Self::Fast,
            _ => return Err(Misconfig::UnknownEnumerator(s.to_string()).into()),
        };
        Ok(algorithm)
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Fast => write!(f, "fast"),
        }
    }
}

/// Enumerator state shared by both algorithms
pub struct Lattices {
    algorithm: Algorithm,
    width: u32,
    mask: u64,
    next: Option<(u64, u64)>,
}

impl Lattices {
    pub fn new(algorithm: Algorithm, width: u32) -> Self {
        Self {
            algorithm,
            width,
            mask: low_bits(width),
            next: Some((0, 0)),
        }
    }

    /// Advance `one`, `None` once it wraps around
    fn bump_one(&self, one: u64) -> Option<u64> {
        let one = one.wrapping_add(1) & self.mask;
        (one != 0).then_some(one)
    }

    fn step_reference(&self, zero: u64, one: u64) -> Option<(u64, u64)> {
        let (mut zero, mut one) = (zero, one);
        loop {
            zero = zero.wrapping_add(1) & self.mask;
            if zero == 0 {
                one = self.bump_one(one)?;
            }
            if zero & one == 0 {
                return Some((zero, one));
            }
        }
    }

    fn step_fast(&self, zero: u64, one: u64) -> Option<(u64, u64)> {
        let not_one = !one & self.mask;
        let zero = zero.wrapping_sub(not_one) & not_one;
        if zero != 0 {
            return Some((zero, one));
        }
        Some((0, self.bump_one(one)?))
    }
}

impl Iterator for Lattices {
    type Item = EngineResult<BitLattice>;

    fn next(&mut self) -> Option<Self::Item> {
        let (zero, one) = self.next?;
        self.next = match self.algorithm {
            Algorithm::Reference => self.step_reference(zero, one),
            Algorithm::Fast => self.step_fast(zero, one),
        };
        let item = BitLattice::new(self.width, zero, one).map_err(|e| {
            EngineError::InvariantViolation(format!(
                "{} enumerator produced a conflicting state: {}",
                self.algorithm, e
            ))
        });
        Some(item)
    }
}

/// Collect every lattice of the width, failing on the first invalid state
pub fn enumerate(algorithm: Algorithm, width: u32) -> EngineResult<Vec<BitLattice>> {
    Lattices::new(algorithm, width).collect()
}

/// Number of valid lattices of a width
pub fn expected_count(width: u32) -> u128 {
    3u128.pow(width)
}

/// Cross-validate the two algorithms for a width
pub fn self_check(width: u32) -> EngineResult<Vec<BitLattice>> {
    let reference = enumerate(Algorithm::Reference, width)?;
    let fast = enumerate(Algorithm::Fast, width)?;

    let expected = expected_count(width);
    for (algorithm, states) in [(Algorithm::Reference, &reference), (Algorithm::Fast, &fast)] {
        if states.len() as u128 != expected {
            return Err(EngineError::InvariantViolation(format!(
                "{} enumerator produced {} states for i{}, expecting {}",
                algorithm,
                states.len(),
                width,
                expected
            )));
        }
    }

    let set_reference: BTreeSet<_> = reference.iter().map(|l| (l.zero(), l.one())).collect();
    let set_fast: BTreeSet<_> = fast.iter().map(|l| (l.zero(), l.one())).collect();
    if set_reference.len() != reference.len() {
        return Err(EngineError::InvariantViolation(
            "reference enumerator produced duplicates".into(),
        ));
    }
    if set_reference != set_fast {
        return Err(EngineError::InvariantViolation(format!(
            "enumerators disagree on i{}",
            width
        )));
    }
    debug!("enumerators agree on {} states for i{}", expected, width);
    Ok(fast)
}
