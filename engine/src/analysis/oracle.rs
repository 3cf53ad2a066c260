//
// Ground truth by exhaustive concrete evaluation
//

use crate::ir::eval::evaluate;
use crate::ir::operator::OperatorSpec;

use super::bits::BitLattice;
use super::domain::join_all;
use super::transfer::Outcome;

/// Known bits of `lhs op rhs` over every pair of witnesses
pub fn oracle(spec: &OperatorSpec, lhs: &BitLattice, rhs: &BitLattice) -> Outcome {
    let width = lhs.width();
    let results = lhs.witnesses().flat_map(|a| {
        rhs.witnesses()
            .filter_map(move |b| evaluate(spec, width, a, b))
    });
    join_all(results.map(|value| BitLattice::constant(width, value))).into()
}

/// Known bits of `x op x` over every witness
pub fn oracle_self(spec: &OperatorSpec, operand: &BitLattice) -> Outcome {
    let width = operand.width();
    let results = operand
        .witnesses()
        .filter_map(|x| evaluate(spec, width, x, x));
    join_all(results.map(|value| BitLattice::constant(width, value))).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::operator::Opcode;

    fn lat(text: &str) -> BitLattice {
        text.parse().unwrap()
    }

    #[test]
    fn concrete_agreement() {
        let add = OperatorSpec::plain(Opcode::Add);
        assert_eq!(oracle(&add, &lat("?"), &lat("?")).to_string(), "?");
        assert_eq!(oracle(&add, &lat("0?1"), &lat("001")).to_string(), "??0");

        let and = OperatorSpec::plain(Opcode::And);
        assert_eq!(oracle(&and, &lat("0?0?"), &lat("????")).to_string(), "0?0?");
    }

    #[test]
    fn all_excluded_is_undefined() {
        let urem = OperatorSpec::plain(Opcode::URem);
        assert_eq!(oracle(&urem, &lat("??"), &lat("00")), Outcome::Undefined);
        assert_eq!(oracle(&urem, &lat("??"), &lat("?0")).to_string(), "0?");
    }

    #[test]
    fn self_application() {
        let sub = OperatorSpec::plain(Opcode::Sub);
        assert_eq!(oracle_self(&sub, &lat("???")).to_string(), "000");
        let mul = OperatorSpec::plain(Opcode::Mul);
        assert_eq!(oracle_self(&mul, &lat("???")).to_string(), "?0?");
        let udiv = OperatorSpec::plain(Opcode::UDiv);
        assert_eq!(oracle_self(&udiv, &lat("00")), Outcome::Undefined);
    }
}
