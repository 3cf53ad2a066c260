//
// Known-bits abstract domain and its verification machinery
//
pub mod bits;
pub mod domain;
pub mod enumerate;
pub mod oracle;
pub mod transfer;
pub mod witness;
