//
// Per-operator totals, mergeable in any order
//

use serde::{Deserialize, Serialize};

use super::verify::CaseResult;

#[derive(Serialize, Deserialize, Eq, PartialEq, Copy, Clone, Debug, Default)]
pub struct AggregateStats {
    /// Cases visited, including excluded ones
    pub cases: u64,
    /// Cases where no defined result exists
    pub undefined: u64,
    /// Known bits claimed by the transfer function over defined cases
    pub known_bits: u64,
    /// Known bits of the oracle over defined cases
    pub oracle_bits: u64,
    /// Known-bit capacity: two masks of `W` bits per defined case
    pub max_bits: u64,
    /// Sound cases strictly less informed than the oracle
    pub imprecise: u64,
    /// Cases with at least one violation
    pub unsound: u64,
}

impl AggregateStats {
    pub fn record(&mut self, case: &CaseResult) {
        self.cases += 1;
        if case.is_excluded() {
            self.undefined += 1;
            return;
        }
        self.known_bits += u64::from(case.transfer.count_known());
        self.oracle_bits += u64::from(case.oracle.count_known());
        self.max_bits += 2 * u64::from(case.lhs.width());
        if !case.is_sound() {
            self.unsound += 1;
        } else if case.is_imprecise() {
            self.imprecise += 1;
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            cases: self.cases + other.cases,
            undefined: self.undefined + other.undefined,
            known_bits: self.known_bits + other.known_bits,
            oracle_bits: self.oracle_bits + other.oracle_bits,
            max_bits: self.max_bits + other.max_bits,
            imprecise: self.imprecise + other.imprecise,
            unsound: self.unsound + other.unsound,
        }
    }

    fn ratio(num: u64, den: u64) -> f64 {
        if den == 0 {
            0.0
        } else {
            num as f64 * 100.0 / den as f64
        }
    }

    /// Transfer known bits against the capacity
    pub fn percent_known(&self) -> f64 {
        Self::ratio(self.known_bits, self.max_bits)
    }

    /// Oracle known bits against the capacity
    pub fn percent_oracle(&self) -> f64 {
        Self::ratio(self.oracle_bits, self.max_bits)
    }

    /// Transfer known bits against the oracle, full marks when nothing is knowable
    pub fn tightness(&self) -> f64 {
        if self.oracle_bits == 0 {
            100.0
        } else {
            Self::ratio(self.known_bits, self.oracle_bits)
        }
    }
}

impl<'a> FromIterator<&'a CaseResult> for AggregateStats {
    fn from_iter<T: IntoIterator<Item = &'a CaseResult>>(iter: T) -> Self {
        let mut stats = Self::default();
        for case in iter {
            stats.record(case);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bits::BitLattice;
    use crate::flow::verify::check_pair;
    use crate::ir::operator::{Opcode, OperatorSpec};

    fn lat(text: &str) -> BitLattice {
        text.parse().unwrap()
    }

    #[test]
    fn excluded_cases_only_count_as_undefined() {
        let urem = OperatorSpec::plain(Opcode::URem);
        let stats: AggregateStats = [check_pair(&urem, &lat("??"), &lat("00"))]
            .iter()
            .collect();
        assert_eq!(stats.cases, 1);
        assert_eq!(stats.undefined, 1);
        assert_eq!(stats.known_bits, 0);
        assert_eq!(stats.max_bits, 0);
        assert_eq!(stats.percent_known(), 0.0);
    }

    #[test]
    fn defined_cases_fill_capacity() {
        let and = OperatorSpec::plain(Opcode::And);
        let stats: AggregateStats = [check_pair(&and, &lat("0?0?"), &lat("????"))]
            .iter()
            .collect();
        assert_eq!(stats.known_bits, 2);
        assert_eq!(stats.oracle_bits, 2);
        assert_eq!(stats.max_bits, 8);
        assert_eq!(stats.percent_known(), 25.0);
        assert_eq!(stats.tightness(), 100.0);
        assert_eq!(stats.imprecise, 0);
    }

    #[test]
    fn merge_is_componentwise() {
        let a = AggregateStats {
            cases: 3,
            undefined: 1,
            known_bits: 4,
            oracle_bits: 5,
            max_bits: 8,
            imprecise: 1,
            unsound: 0,
        };
        let b = AggregateStats {
            cases: 2,
            undefined: 0,
            known_bits: 1,
            oracle_bits: 1,
            max_bits: 4,
            imprecise: 0,
            unsound: 1,
        };
        assert_eq!(a.merge(b), b.merge(a));
        assert_eq!(a.merge(AggregateStats::default()), a);
        assert_eq!(a.merge(b).cases, 5);
        assert_eq!(a.merge(b).max_bits, 12);
    }
}
