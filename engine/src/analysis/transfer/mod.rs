//
// Transfer functions: what is known about `lhs op rhs` given what is known about the operands
//

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ir::operator::{Opcode, OperatorSpec};

use super::bits::BitLattice;
use super::domain::AbstractDomain;

mod arith;
mod bitwise;
mod division;
mod shift;

/// Result of abstract or concrete evaluation of a case
#[derive(Serialize, Deserialize, Eq, PartialEq, Copy, Clone, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// At least one defined result exists, described by the lattice
    Defined(BitLattice),
    /// No defined result exists
    Undefined,
}

impl Outcome {
    pub fn lattice(&self) -> Option<&BitLattice> {
        match self {
            Self::Defined(lattice) => Some(lattice),
            Self::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Known bits claimed, zero for an undefined outcome
    pub fn count_known(&self) -> u32 {
        self.lattice().map_or(0, |l| l.count_known())
    }
}

impl From<Option<BitLattice>> for Outcome {
    fn from(value: Option<BitLattice>) -> Self {
        match value {
            Some(lattice) => Self::Defined(lattice),
            None => Self::Undefined,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defined(lattice) => write!(f, "{}", lattice),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// Transfer function for independent operands
pub fn transfer(spec: &OperatorSpec, lhs: &BitLattice, rhs: &BitLattice) -> Outcome {
    debug_assert_eq!(lhs.width(), rhs.width());
    let flags = &spec.flags;
    match spec.opcode {
        Opcode::Add => arith::add(lhs, rhs, flags),
        Opcode::Sub => arith::sub(lhs, rhs, flags),
        Opcode::Mul => arith::mul(lhs, rhs),
        Opcode::UDiv => division::udiv(lhs, rhs, flags),
        Opcode::SDiv => division::sdiv(lhs, rhs, flags),
        Opcode::URem => division::urem(lhs, rhs),
        Opcode::SRem => division::srem(lhs, rhs),
        Opcode::Shl | Opcode::LShr | Opcode::AShr => shift::shift(spec, lhs, rhs),
        Opcode::And => Outcome::Defined(bitwise::and(lhs, rhs)),
        Opcode::Or => Outcome::Defined(bitwise::or(lhs, rhs)),
        Opcode::Xor => Outcome::Defined(bitwise::xor(lhs, rhs)),
    }
}

/// Transfer function for `x op x`
pub fn transfer_self(spec: &OperatorSpec, operand: &BitLattice) -> Outcome {
    let width = operand.width();
    let general = match transfer(spec, operand, operand) {
        Outcome::Defined(lattice) => lattice,
        Outcome::Undefined => return Outcome::Undefined,
    };

    let identity = match spec.opcode {
        Opcode::Sub | Opcode::Xor => BitLattice::constant(width, 0),
        Opcode::And | Opcode::Or => *operand,
        Opcode::Add => arith::double(operand),
        Opcode::Mul => arith::square(operand),
        Opcode::UDiv | Opcode::SDiv | Opcode::URem | Opcode::SRem => {
            if operand.is_zero() {
                return Outcome::Undefined;
            }
            let quotient = matches!(spec.opcode, Opcode::UDiv | Opcode::SDiv);
            BitLattice::constant(width, u64::from(quotient))
        }
        Opcode::Shl | Opcode::LShr | Opcode::AShr => return Outcome::Defined(general),
    };
    general.meet(&identity).into()
}
