use crate::analysis::bits::{high_bits, low_bits, BitLattice};
use crate::analysis::domain::join_all;
use crate::ir::operator::{Opcode, OperatorSpec};

use super::Outcome;

fn ashr_mask(mask: u64, amount: u32, width: u32) -> u64 {
    let shifted = mask >> amount;
    if mask & (1u64 << (width - 1)) != 0 {
        shifted | high_bits(width, amount)
    } else {
        shifted
    }
}

/// Shift left by a fixed amount, `None` if the flags rule out every witness
fn shl_by(spec: &OperatorSpec, lhs: &BitLattice, amount: u32) -> Option<BitLattice> {
    let width = lhs.width();
    let mut lhs = *lhs;

    if spec.flags.nuw {
        // bits shifted out must be zero
        lhs = lhs.with_high_zeros(amount)?;
    }
    if spec.flags.nsw {
        // bits shifted out must all match the resulting sign bit
        let top = high_bits(width, amount + 1);
        let (zeros, ones) = (lhs.zero() & top, lhs.one() & top);
        if zeros != 0 && ones != 0 {
            return None;
        }
        if zeros != 0 {
            lhs = lhs.with_high_zeros(amount + 1)?;
        }
        if ones != 0 {
            lhs = lhs.with_high_ones(amount + 1)?;
        }
    }

    Some(BitLattice::raw(
        width,
        (lhs.zero() << amount) | low_bits(amount),
        lhs.one() << amount,
    ))
}

/// Shift right by a fixed amount, `None` if the flags rule out every witness
fn shr_by(spec: &OperatorSpec, lhs: &BitLattice, amount: u32) -> Option<BitLattice> {
    let width = lhs.width();
    let mut lhs = *lhs;

    if spec.flags.exact {
        // bits shifted out must be zero
        lhs = lhs.with_low_zeros(amount)?;
    }

    let shifted = match spec.opcode {
        Opcode::LShr => BitLattice::raw(
            width,
            (lhs.zero() >> amount) | high_bits(width, amount),
            lhs.one() >> amount,
        ),
        _ => BitLattice::raw(
            width,
            ashr_mask(lhs.zero(), amount, width),
            ashr_mask(lhs.one(), amount, width),
        ),
    };
    Some(shifted)
}

/// Join the shifted lhs over every shift amount the rhs admits
pub fn shift(spec: &OperatorSpec, lhs: &BitLattice, rhs: &BitLattice) -> Outcome {
    let width = lhs.width();
    let feasible = (0..width)
        .filter(|amount| rhs.contains(*amount as u64))
        .filter_map(|amount| match spec.opcode {
            Opcode::Shl => shl_by(spec, lhs, amount),
            _ => shr_by(spec, lhs, amount),
        });
    join_all(feasible).into()
}
