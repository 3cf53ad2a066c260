//
// Operators under verification and their concrete semantics
//
pub mod eval;
pub mod operator;
