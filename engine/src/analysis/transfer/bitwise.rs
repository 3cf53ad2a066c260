use crate::analysis::bits::BitLattice;

pub fn and(lhs: &BitLattice, rhs: &BitLattice) -> BitLattice {
    BitLattice::raw(
        lhs.width(),
        lhs.zero() | rhs.zero(),
        lhs.one() & rhs.one(),
    )
}

pub fn or(lhs: &BitLattice, rhs: &BitLattice) -> BitLattice {
    BitLattice::raw(
        lhs.width(),
        lhs.zero() & rhs.zero(),
        lhs.one() | rhs.one(),
    )
}

pub fn xor(lhs: &BitLattice, rhs: &BitLattice) -> BitLattice {
    BitLattice::raw(
        lhs.width(),
        (lhs.zero() & rhs.zero()) | (lhs.one() & rhs.one()),
        (lhs.zero() & rhs.one()) | (lhs.one() & rhs.zero()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lat(text: &str) -> BitLattice {
        text.parse().unwrap()
    }

    #[test]
    fn per_bit_truth_tables() {
        let lhs = lat("000111???");
        let rhs = lat("01?01?01?");
        assert_eq!(and(&lhs, &rhs).to_string(), "00001?0??");
        assert_eq!(or(&lhs, &rhs).to_string(), "01?111?1?");
        assert_eq!(xor(&lhs, &rhs).to_string(), "01?10????");
    }
}
