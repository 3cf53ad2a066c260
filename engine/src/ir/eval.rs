//
// Concrete two's-complement semantics, `None` stands for poison or undefined behavior
//

use crate::analysis::bits::{from_signed, low_bits, signed_max, signed_min, to_signed};
use crate::ir::operator::{Opcode, OperatorSpec};

fn in_signed_range(value: i128, width: u32) -> bool {
    (signed_min(width)..=signed_max(width)).contains(&value)
}

/// Evaluate an operator on two `width`-bit words
pub fn evaluate(spec: &OperatorSpec, width: u32, lhs: u64, rhs: u64) -> Option<u64> {
    let mask = low_bits(width);
    let (ul, ur) = (lhs as u128, rhs as u128);
    let (sl, sr) = (to_signed(lhs, width), to_signed(rhs, width));
    let flags = &spec.flags;

    let result = match spec.opcode {
        Opcode::Add => {
            if flags.nuw && ul + ur > mask as u128 {
                return None;
            }
            if flags.nsw && !in_signed_range(sl + sr, width) {
                return None;
            }
            lhs.wrapping_add(rhs)
        }
        Opcode::Sub => {
            if flags.nuw && ul < ur {
                return None;
            }
            if flags.nsw && !in_signed_range(sl - sr, width) {
                return None;
            }
            lhs.wrapping_sub(rhs)
        }
        Opcode::Mul => {
            if flags.nuw && ul * ur > mask as u128 {
                return None;
            }
            if flags.nsw && !in_signed_range(sl * sr, width) {
                return None;
            }
            lhs.wrapping_mul(rhs)
        }
        Opcode::UDiv => {
            if rhs == 0 || (flags.exact && lhs % rhs != 0) {
                return None;
            }
            lhs / rhs
        }
        Opcode::SDiv => {
            if sr == 0 || (sl == signed_min(width) && sr == -1) {
                return None;
            }
            if flags.exact && sl % sr != 0 {
                return None;
            }
            from_signed(sl / sr, width)
        }
        Opcode::URem => {
            if rhs == 0 {
                return None;
            }
            lhs % rhs
        }
        Opcode::SRem => {
            if sr == 0 || (sl == signed_min(width) && sr == -1) {
                return None;
            }
            from_signed(sl % sr, width)
        }
        Opcode::Shl => {
            if rhs >= width as u64 {
                return None;
            }
            let result = (lhs << rhs) & mask;
            if flags.nuw && result >> rhs != lhs {
                return None;
            }
            if flags.nsw && to_signed(result, width) >> rhs != sl {
                return None;
            }
            result
        }
        Opcode::LShr => {
            if rhs >= width as u64 || (flags.exact && lhs & low_bits(rhs as u32) != 0) {
                return None;
            }
            lhs >> rhs
        }
        Opcode::AShr => {
            if rhs >= width as u64 || (flags.exact && lhs & low_bits(rhs as u32) != 0) {
                return None;
            }
            from_signed(sl >> rhs, width)
        }
        Opcode::And => lhs & rhs,
        Opcode::Or => lhs | rhs,
        Opcode::Xor => lhs ^ rhs,
    };
    Some(result & mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::operator::{Flag, Flags};

    fn spec(opcode: Opcode, flags: &[Flag]) -> OperatorSpec {
        let flags = flags.iter().fold(Flags::none(), |acc, f| acc.with(*f));
        OperatorSpec::new(opcode, flags).unwrap()
    }

    #[test]
    fn wrapping_arithmetic() {
        assert_eq!(evaluate(&spec(Opcode::Add, &[]), 4, 15, 1), Some(0));
        assert_eq!(evaluate(&spec(Opcode::Sub, &[]), 4, 0, 1), Some(15));
        assert_eq!(evaluate(&spec(Opcode::Mul, &[]), 4, 5, 5), Some(9));
    }

    #[test]
    fn wrap_flags_produce_poison() {
        assert_eq!(evaluate(&spec(Opcode::Add, &[Flag::Nuw]), 4, 15, 1), None);
        assert_eq!(evaluate(&spec(Opcode::Add, &[Flag::Nsw]), 4, 15, 1), Some(0));
        assert_eq!(evaluate(&spec(Opcode::Add, &[Flag::Nsw]), 4, 7, 1), None);
        assert_eq!(evaluate(&spec(Opcode::Sub, &[Flag::Nuw]), 4, 0, 1), None);
        assert_eq!(evaluate(&spec(Opcode::Sub, &[Flag::Nsw]), 4, 8, 1), None);
        assert_eq!(evaluate(&spec(Opcode::Mul, &[Flag::Nsw]), 4, 15, 15), Some(1));
        assert_eq!(evaluate(&spec(Opcode::Mul, &[Flag::Nuw]), 4, 15, 15), None);
    }

    #[test]
    fn division_undefined_behavior() {
        assert_eq!(evaluate(&spec(Opcode::UDiv, &[]), 4, 7, 0), None);
        assert_eq!(evaluate(&spec(Opcode::URem, &[]), 4, 7, 0), None);
        assert_eq!(evaluate(&spec(Opcode::SDiv, &[]), 4, 8, 15), None);
        assert_eq!(evaluate(&spec(Opcode::SRem, &[]), 4, 8, 15), None);
        assert_eq!(evaluate(&spec(Opcode::SDiv, &[]), 4, 9, 2), Some(13));
        assert_eq!(evaluate(&spec(Opcode::SRem, &[]), 4, 9, 2), Some(15));
        assert_eq!(evaluate(&spec(Opcode::UDiv, &[Flag::Exact]), 4, 7, 2), None);
        assert_eq!(evaluate(&spec(Opcode::SDiv, &[Flag::Exact]), 4, 12, 2), Some(14));
    }

    #[test]
    fn shifts() {
        assert_eq!(evaluate(&spec(Opcode::Shl, &[]), 4, 3, 4), None);
        assert_eq!(evaluate(&spec(Opcode::Shl, &[]), 4, 3, 3), Some(8));
        assert_eq!(evaluate(&spec(Opcode::Shl, &[Flag::Nuw]), 4, 3, 3), None);
        assert_eq!(evaluate(&spec(Opcode::Shl, &[Flag::Nsw]), 4, 15, 3), Some(8));
        assert_eq!(evaluate(&spec(Opcode::Shl, &[Flag::Nsw]), 4, 3, 2), None);
        assert_eq!(evaluate(&spec(Opcode::LShr, &[]), 4, 12, 2), Some(3));
        assert_eq!(evaluate(&spec(Opcode::LShr, &[Flag::Exact]), 4, 13, 2), None);
        assert_eq!(evaluate(&spec(Opcode::AShr, &[]), 4, 8, 3), Some(15));
    }
}
