use crate::analysis::bits::{low_bits, signed_max, BitLattice};
use crate::analysis::domain::{meet_all, AbstractDomain};
use crate::ir::operator::Flags;

use super::Outcome;

/// An exact quotient keeps `minTZ(lhs) - maxTZ(rhs)` trailing zeros
fn exact_quotient(lhs: &BitLattice, rhs: &BitLattice) -> Option<BitLattice> {
    let zeros = lhs
        .min_trailing_zeros()
        .checked_sub(rhs.max_trailing_zeros())?;
    (zeros > 0).then(|| BitLattice::raw(lhs.width(), low_bits(zeros), 0))
}

/// A divisor with `k` known trailing zeros keeps the low `k` bits of the dividend
fn remainder_low_bits(lhs: &BitLattice, rhs: &BitLattice) -> BitLattice {
    lhs.low_part(rhs.min_trailing_zeros())
}

pub fn udiv(lhs: &BitLattice, rhs: &BitLattice, flags: &Flags) -> Outcome {
    let Some(divisor_min) = rhs.umin_non_zero() else {
        return Outcome::Undefined;
    };
    let lo = lhs.umin() / rhs.umax();
    let hi = lhs.umax() / divisor_min;
    let base = BitLattice::from_range(lhs.width(), lo, hi);

    let mut facts = vec![];
    if flags.exact {
        facts.extend(exact_quotient(lhs, rhs));
    }
    meet_all(base, facts).into()
}

pub fn sdiv(lhs: &BitLattice, rhs: &BitLattice, flags: &Flags) -> Outcome {
    let width = lhs.width();
    if rhs.is_zero() {
        return Outcome::Undefined;
    }

    // the truncated quotient is monotone in each operand on either side of
    // zero, so its extremes sit on the corners of the operand ranges
    let (rmin, rmax) = (rhs.smin(), rhs.smax());
    let mut divisors = vec![];
    if rmax >= 1 {
        divisors.extend([rmin.max(1), rmax]);
    }
    if rmin <= -1 {
        divisors.extend([rmin, rmax.min(-1)]);
    }
    let quotients: Vec<i128> = [lhs.smin(), lhs.smax()]
        .into_iter()
        .flat_map(|dividend| divisors.iter().map(move |divisor| dividend / divisor))
        .collect();
    let (Some(lo), Some(hi)) = (quotients.iter().min(), quotients.iter().max()) else {
        return Outcome::Undefined;
    };

    // MIN / -1 overflows and is excluded
    let hi = (*hi).min(signed_max(width));
    if *lo > hi {
        return Outcome::Undefined;
    }
    let base = BitLattice::from_signed_range(width, *lo, hi);

    let mut facts = vec![];
    if flags.exact {
        facts.extend(exact_quotient(lhs, rhs));
    }
    meet_all(base, facts).into()
}

pub fn urem(lhs: &BitLattice, rhs: &BitLattice) -> Outcome {
    let width = lhs.width();
    let Some(divisor_min) = rhs.umin_non_zero() else {
        return Outcome::Undefined;
    };
    if lhs.umax() < divisor_min {
        return Outcome::Defined(*lhs);
    }

    let bound = lhs.umax().min(rhs.umax() - 1);
    let range = BitLattice::from_range(width, 0, bound);
    range.meet(&remainder_low_bits(lhs, rhs)).into()
}

pub fn srem(lhs: &BitLattice, rhs: &BitLattice) -> Outcome {
    let width = lhs.width();
    if rhs.is_zero() {
        return Outcome::Undefined;
    }

    // |r| < |rhs| and |r| <= |lhs|, with the sign of lhs
    let lhs_abs = lhs.smin().abs().max(lhs.smax().abs());
    let rhs_abs = rhs.smin().abs().max(rhs.smax().abs());
    let bound = lhs_abs.min(rhs_abs - 1);
    let (lo, hi) = if lhs.is_non_negative() {
        (0, bound)
    } else if lhs.is_negative() {
        (-bound, 0)
    } else {
        (-bound, bound)
    };
    let range = BitLattice::from_signed_range(width, lo, hi);
    range.meet(&remainder_low_bits(lhs, rhs)).into()
}
