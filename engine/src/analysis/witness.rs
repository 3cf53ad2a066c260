use super::bits::BitLattice;

/// Iterates every concrete value consistent with a lattice
///
/// The unknown positions are walked as submasks of the unknown mask in
/// increasing numeric order, the known positions stay fixed.
pub struct Witnesses {
    one: u64,
    free: u64,
    next: Option<u64>,
}

impl Witnesses {
    pub fn new(lattice: &BitLattice) -> Self {
        Self {
            one: lattice.one(),
            free: lattice.unknown_mask(),
            next: Some(0),
        }
    }

    /// Number of witnesses, `2^popcount(unknown)`
    pub fn total(lattice: &BitLattice) -> u128 {
        1u128 << lattice.unknown_mask().count_ones()
    }
}

impl Iterator for Witnesses {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next?;
        let successor = current.wrapping_sub(self.free) & self.free;
        self.next = (successor != 0).then_some(successor);
        Some(self.one | current)
    }
}

impl BitLattice {
    /// All concrete values consistent with this lattice
    pub fn witnesses(&self) -> Witnesses {
        Witnesses::new(self)
    }
}
