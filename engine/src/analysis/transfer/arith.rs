use crate::analysis::bits::{high_bits, low_bits, BitLattice};
use crate::analysis::domain::{meet_all, AbstractDomain};
use crate::ir::operator::Flags;

use super::Outcome;

/// Carry-aware addition of two lattices and a carry-in bit
fn add_with_carry(lhs: &BitLattice, rhs: &BitLattice, carry_zero: bool, carry_one: bool) -> BitLattice {
    // largest and smallest possible sums
    let possible_sum_zero = (!lhs.zero())
        .wrapping_add(!rhs.zero())
        .wrapping_add(u64::from(!carry_zero));
    let possible_sum_one = lhs
        .one()
        .wrapping_add(rhs.one())
        .wrapping_add(u64::from(carry_one));

    // a carry into a position is known when both extreme sums agree on it
    let carry_known_zero = !(possible_sum_zero ^ lhs.zero() ^ rhs.zero());
    let carry_known_one = possible_sum_one ^ lhs.one() ^ rhs.one();

    let known = lhs.known_mask() & rhs.known_mask() & (carry_known_zero | carry_known_one);
    BitLattice::raw(
        lhs.width(),
        !possible_sum_zero & known,
        possible_sum_one & known,
    )
}

pub fn add(lhs: &BitLattice, rhs: &BitLattice, flags: &Flags) -> Outcome {
    let width = lhs.width();
    let base = add_with_carry(lhs, rhs, true, false);

    let mut facts = vec![];
    if flags.nuw {
        // no wrap: the sum is at least as large as either operand
        let ones = lhs.min_leading_ones().max(rhs.min_leading_ones());
        facts.push(BitLattice::raw(width, 0, high_bits(width, ones)));
    }
    if flags.nsw {
        if lhs.is_non_negative() && rhs.is_non_negative() {
            facts.push(BitLattice::raw(width, high_bits(width, 1), 0));
        }
        if lhs.is_negative() && rhs.is_negative() {
            facts.push(BitLattice::raw(width, 0, high_bits(width, 1)));
        }
    }
    meet_all(base, facts).into()
}

pub fn sub(lhs: &BitLattice, rhs: &BitLattice, flags: &Flags) -> Outcome {
    let width = lhs.width();
    // lhs - rhs == lhs + ~rhs + 1
    let base = add_with_carry(lhs, &rhs.complement(), false, true);

    let mut facts = vec![];
    if flags.nuw {
        // no wrap: the difference never exceeds lhs
        facts.push(BitLattice::raw(
            width,
            high_bits(width, lhs.min_leading_zeros()),
            0,
        ));
    }
    if flags.nsw {
        if lhs.is_non_negative() && rhs.is_negative() {
            facts.push(BitLattice::raw(width, high_bits(width, 1), 0));
        }
        if lhs.is_negative() && rhs.is_non_negative() {
            facts.push(BitLattice::raw(width, 0, high_bits(width, 1)));
        }
    }
    meet_all(base, facts).into()
}

pub fn mul(lhs: &BitLattice, rhs: &BitLattice) -> Outcome {
    let width = lhs.width();

    // high zeros from the largest possible product, if it does not wrap
    let umax = lhs.umax() as u128 * rhs.umax() as u128;
    let lead_zeros = if umax > low_bits(width) as u128 {
        0
    } else {
        width - (128 - umax.leading_zeros())
    };

    // the low bits only depend on the low bits of both operands, and every
    // trailing zero of an operand shifts the known window up by one
    let trail_known_lhs = lhs.trailing_known();
    let trail_known_rhs = rhs.trailing_known();
    let trail_zeros_lhs = lhs.min_trailing_zeros();
    let trail_zeros_rhs = rhs.min_trailing_zeros();
    let smallest = (trail_known_lhs - trail_zeros_lhs).min(trail_known_rhs - trail_zeros_rhs);
    let result_known = (smallest + trail_zeros_lhs + trail_zeros_rhs).min(width);

    let bottom = (lhs.one() & low_bits(trail_known_lhs))
        .wrapping_mul(rhs.one() & low_bits(trail_known_rhs));
    let window = low_bits(result_known);

    let low = BitLattice::raw(width, !bottom & window, bottom & window);
    let high = BitLattice::raw(width, high_bits(width, lead_zeros), 0);
    low.meet(&high).into()
}

/// `x + x` is `x` shifted left by one
pub fn double(operand: &BitLattice) -> BitLattice {
    BitLattice::raw(
        operand.width(),
        (operand.zero() << 1) | 1,
        operand.one() << 1,
    )
}

/// `x * x` never has bit 1 set
pub fn square(operand: &BitLattice) -> BitLattice {
    let zero = if operand.width() >= 2 { 0b10 } else { 0 };
    BitLattice::raw(operand.width(), zero, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::operator::Flag;

    fn lat(text: &str) -> BitLattice {
        text.parse().unwrap()
    }

    fn run(outcome: Outcome) -> String {
        outcome.to_string()
    }

    #[test]
    fn add_propagates_carries() {
        assert_eq!(run(add(&lat("0001"), &lat("0011"), &Flags::none())), "0100");
        assert_eq!(run(add(&lat("00?0"), &lat("0001"), &Flags::none())), "00?1");
        assert_eq!(run(add(&lat("000?"), &lat("0001"), &Flags::none())), "00??");
        assert_eq!(run(add(&lat("1111"), &lat("0001"), &Flags::none())), "0000");
    }

    #[test]
    fn sub_propagates_borrows() {
        assert_eq!(run(sub(&lat("0100"), &lat("0001"), &Flags::none())), "0011");
        assert_eq!(run(sub(&lat("0000"), &lat("0001"), &Flags::none())), "1111");
        assert_eq!(run(sub(&lat("01?0"), &lat("0000"), &Flags::none())), "01?0");
    }

    #[test]
    fn wrap_flags_refine() {
        let nuw = Flags::none().with(Flag::Nuw);
        let nsw = Flags::none().with(Flag::Nsw);
        assert_eq!(run(add(&lat("1?"), &lat("1?"), &Flags::none())), "??");
        assert_eq!(run(add(&lat("1?"), &lat("1?"), &nuw)), "1?");
        assert_eq!(run(add(&lat("0???"), &lat("0???"), &nsw)), "0???");
        assert_eq!(run(sub(&lat("00??"), &lat("????"), &nuw)), "00??");
        assert_eq!(run(sub(&lat("1???"), &lat("0???"), &nsw)), "1???");
    }

    #[test]
    fn mul_low_and_high_bits() {
        assert_eq!(run(mul(&lat("???0"), &lat("??10"))), "??00");
        assert_eq!(run(mul(&lat("0011"), &lat("0010"))), "0110");
        assert_eq!(run(mul(&lat("00??"), &lat("00??"))), "????");
        assert_eq!(run(mul(&lat("000?"), &lat("00??"))), "00??");
    }
}
