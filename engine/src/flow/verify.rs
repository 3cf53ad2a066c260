//
// Comparison of a transfer outcome against the oracle for one case
//

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::analysis::bits::{BitLattice, BitState};
use crate::analysis::domain::AbstractDomain;
use crate::analysis::oracle::{oracle, oracle_self};
use crate::analysis::transfer::{transfer, transfer_self, Outcome};
use crate::ir::operator::OperatorSpec;

/// A soundness failure of the transfer function
#[derive(Serialize, Eq, PartialEq, Copy, Clone, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    /// The transfer function claims a bit some defined result contradicts
    WrongBit {
        index: u32,
        expected: char,
        actual: char,
    },
    /// The transfer function claims undefined while defined results exist
    SpuriousUndefined,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongBit {
                index,
                expected,
                actual,
            } => write!(f, "bit {}: expected {}, actual {}", index, expected, actual),
            Self::SpuriousUndefined => write!(f, "claims undefined but defined results exist"),
        }
    }
}

/// Everything known about one verified case
#[derive(Serialize, Clone, Debug)]
pub struct CaseResult {
    pub spec: OperatorSpec,
    pub lhs: BitLattice,
    /// `None` for `lhs op lhs`
    pub rhs: Option<BitLattice>,
    pub transfer: Outcome,
    pub oracle: Outcome,
    pub violations: Vec<Violation>,
}

impl CaseResult {
    pub fn is_sound(&self) -> bool {
        self.violations.is_empty()
    }

    /// Cases without any defined result are excluded from the statistics
    pub fn is_excluded(&self) -> bool {
        self.oracle.is_undefined()
    }

    /// Sound but strictly less informed than the oracle
    pub fn is_imprecise(&self) -> bool {
        !self.is_excluded() && self.is_sound() && self.transfer != self.oracle
    }
}

impl Display for CaseResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.rhs {
            None => write!(f, "{} {} {}", self.spec, self.lhs, self.lhs)?,
            Some(rhs) => write!(f, "{} {} {}", self.spec, self.lhs, rhs)?,
        }
        write!(f, " => transfer {}, oracle {}", self.transfer, self.oracle)
    }
}

fn compare(transfer: &Outcome, oracle: &Outcome) -> Vec<Violation> {
    match (transfer, oracle) {
        (_, Outcome::Undefined) => vec![],
        (Outcome::Undefined, Outcome::Defined(_)) => vec![Violation::SpuriousUndefined],
        (Outcome::Defined(claimed), Outcome::Defined(truth)) => {
            if claimed.subsumes(truth) {
                return vec![];
            }
            (0..claimed.width())
                .filter_map(|index| {
                    let actual = claimed.bit(index);
                    let expected = truth.bit(index);
                    if actual == BitState::Unknown || actual == expected {
                        return None;
                    }
                    Some(Violation::WrongBit {
                        index,
                        expected: expected.symbol(),
                        actual: actual.symbol(),
                    })
                })
                .collect()
        }
    }
}

/// Verify `lhs op rhs` with independent operands
pub fn check_pair(spec: &OperatorSpec, lhs: &BitLattice, rhs: &BitLattice) -> CaseResult {
    let transfer = transfer(spec, lhs, rhs);
    let oracle = oracle(spec, lhs, rhs);
    let violations = compare(&transfer, &oracle);
    CaseResult {
        spec: *spec,
        lhs: *lhs,
        rhs: Some(*rhs),
        transfer,
        oracle,
        violations,
    }
}

/// Verify `x op x`
pub fn check_self(spec: &OperatorSpec, operand: &BitLattice) -> CaseResult {
    let transfer = transfer_self(spec, operand);
    let oracle = oracle_self(spec, operand);
    let violations = compare(&transfer, &oracle);
    CaseResult {
        spec: *spec,
        lhs: *operand,
        rhs: None,
        transfer,
        oracle,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::operator::Opcode;

    fn lat(text: &str) -> BitLattice {
        text.parse().unwrap()
    }

    fn defined(text: &str) -> Outcome {
        Outcome::Defined(lat(text))
    }

    #[test]
    fn wrong_bits_are_located() {
        let found = compare(&defined("1?0"), &defined("0?1"));
        assert_eq!(
            found,
            vec![
                Violation::WrongBit {
                    index: 0,
                    expected: '1',
                    actual: '0'
                },
                Violation::WrongBit {
                    index: 2,
                    expected: '0',
                    actual: '1'
                },
            ]
        );
        // a bit the oracle leaves unknown but the transfer claims is wrong too
        assert_eq!(compare(&defined("1"), &defined("?")).len(), 1);
        assert!(compare(&defined("??"), &defined("01")).is_empty());
    }

    #[test]
    fn undefined_outcomes() {
        assert_eq!(
            compare(&Outcome::Undefined, &defined("0?")),
            vec![Violation::SpuriousUndefined]
        );
        assert!(compare(&defined("11"), &Outcome::Undefined).is_empty());
        assert!(compare(&Outcome::Undefined, &Outcome::Undefined).is_empty());
    }

    #[test]
    fn checked_cases() {
        let and = OperatorSpec::plain(Opcode::And);
        let case = check_pair(&and, &lat("0?0?"), &lat("????"));
        assert!(case.is_sound());
        assert!(!case.is_imprecise());
        assert_eq!(case.transfer.to_string(), "0?0?");

        let urem = OperatorSpec::plain(Opcode::URem);
        let case = check_pair(&urem, &lat("??"), &lat("00"));
        assert!(case.is_excluded());
        assert!(case.is_sound());

        let sub = OperatorSpec::plain(Opcode::Sub);
        let case = check_self(&sub, &lat("?1?"));
        assert_eq!(case.rhs, None);
        assert_eq!(case.transfer.to_string(), "000");
        assert_eq!(case.to_string(), "sub ?1? ?1? => transfer 000, oracle 000");
    }
}
