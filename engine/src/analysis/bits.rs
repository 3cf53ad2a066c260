//
// Known Bits: https://github.com/llvm/llvm-project/blob/main/llvm/lib/Support/KnownBits.cpp
//

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::domain::AbstractDomain;

/// Widest lattice representable with the 64-bit masks
pub const MAX_LATTICE_WIDTH: u32 = 64;

/// Mask with the lowest `n` bits set
pub fn low_bits(n: u32) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Mask with the highest `n` bits of a `width`-bit word set
pub fn high_bits(width: u32, n: u32) -> u64 {
    low_bits(width) & !low_bits(width.saturating_sub(n))
}

/// Interpret a `width`-bit word as a two's-complement number
pub fn to_signed(value: u64, width: u32) -> i128 {
    let raw = value as i128;
    if (value >> (width - 1)) & 1 == 1 {
        raw - (1i128 << width)
    } else {
        raw
    }
}

/// Encode a number as a `width`-bit two's-complement word
pub fn from_signed(value: i128, width: u32) -> u64 {
    (value as u64) & low_bits(width)
}

pub fn signed_min(width: u32) -> i128 {
    -(1i128 << (width - 1))
}

pub fn signed_max(width: u32) -> i128 {
    (1i128 << (width - 1)) - 1
}

/// What is known about a single bit
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum BitState {
    Zero,
    One,
    Unknown,
}

impl BitState {
    pub fn symbol(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::Unknown => '?',
        }
    }
}

/// Per-bit knowledge about a `width`-bit integer
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct BitLattice {
    width: u32,
    zero: u64, // Bits known to be 0
    one: u64,  // Bits known to be 1
}

impl BitLattice {
    pub fn new(width: u32, zero: u64, one: u64) -> EngineResult<Self> {
        let in_range = (1..=MAX_LATTICE_WIDTH).contains(&width);
        if !in_range || (zero | one) & !low_bits(width) != 0 || zero & one != 0 {
            return Err(EngineError::InvalidLattice { width, zero, one });
        }
        Ok(Self { width, zero, one })
    }

    /// Build from masks that are disjoint by construction
    pub(crate) fn raw(width: u32, zero: u64, one: u64) -> Self {
        debug_assert_eq!(zero & one, 0, "conflicting i{} lattice", width);
        let mask = low_bits(width);
        Self {
            width,
            zero: zero & mask,
            one: one & mask,
        }
    }

    /// Nothing is known
    pub fn unknown(width: u32) -> Self {
        Self::raw(width, 0, 0)
    }

    /// Everything is known
    pub fn constant(width: u32, value: u64) -> Self {
        Self::raw(width, !value, value)
    }

    /// Least precise lattice containing every value of `[lo, hi]`
    pub fn from_range(width: u32, lo: u64, hi: u64) -> Self {
        debug_assert!(lo <= hi);
        let diff = lo ^ hi;
        if diff == 0 {
            return Self::constant(width, lo);
        }
        // the common prefix above the highest differing bit is shared
        let varying = low_bits(64 - diff.leading_zeros());
        Self::raw(width, !lo & !varying, lo & !varying)
    }

    /// Least precise lattice containing every value of the signed `[lo, hi]`
    pub fn from_signed_range(width: u32, lo: i128, hi: i128) -> Self {
        debug_assert!(lo <= hi);
        if lo >= 0 || hi < 0 {
            Self::from_range(width, from_signed(lo, width), from_signed(hi, width))
        } else {
            Self::unknown(width)
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn zero(&self) -> u64 {
        self.zero
    }

    pub fn one(&self) -> u64 {
        self.one
    }

    pub fn mask(&self) -> u64 {
        low_bits(self.width)
    }

    pub fn sign_bit(&self) -> u64 {
        1u64 << (self.width - 1)
    }

    pub fn known_mask(&self) -> u64 {
        self.zero | self.one
    }

    pub fn unknown_mask(&self) -> u64 {
        self.mask() & !self.known_mask()
    }

    pub fn bit(&self, index: u32) -> BitState {
        let probe = 1u64 << index;
        if self.zero & probe != 0 {
            BitState::Zero
        } else if self.one & probe != 0 {
            BitState::One
        } else {
            BitState::Unknown
        }
    }

    pub fn count_known_zeros(&self) -> u32 {
        self.zero.count_ones()
    }

    pub fn count_known_ones(&self) -> u32 {
        self.one.count_ones()
    }

    pub fn count_known(&self) -> u32 {
        self.count_known_zeros() + self.count_known_ones()
    }

    pub fn is_unknown(&self) -> bool {
        self.known_mask() == 0
    }

    pub fn as_constant(&self) -> Option<u64> {
        (self.known_mask() == self.mask()).then_some(self.one)
    }

    /// Every witness of this lattice is zero
    pub fn is_zero(&self) -> bool {
        self.zero == self.mask()
    }

    pub fn is_non_negative(&self) -> bool {
        self.zero & self.sign_bit() != 0
    }

    pub fn is_negative(&self) -> bool {
        self.one & self.sign_bit() != 0
    }

    /// Check whether a concrete value is a witness
    pub fn contains(&self, value: u64) -> bool {
        value & !self.mask() == 0 && value & self.zero == 0 && value & self.one == self.one
    }

    /// Force the known bits onto an otherwise free value
    pub fn mask_known(&self, value: u64) -> u64 {
        (value | self.one) & !self.zero & self.mask()
    }

    /// Bitwise complement of every witness
    pub fn complement(&self) -> Self {
        Self::raw(self.width, self.one, self.zero)
    }

    pub fn umin(&self) -> u64 {
        self.one
    }

    pub fn umax(&self) -> u64 {
        self.mask() & !self.zero
    }

    /// Smallest non-zero witness, `None` if the lattice only holds zero
    pub fn umin_non_zero(&self) -> Option<u64> {
        if self.one != 0 {
            Some(self.one)
        } else {
            let free = self.unknown_mask();
            (free != 0).then(|| free & free.wrapping_neg())
        }
    }

    pub fn smin(&self) -> i128 {
        let sign = self.sign_bit() & !self.zero;
        to_signed(self.one | sign, self.width)
    }

    pub fn smax(&self) -> i128 {
        let sign = self.sign_bit();
        to_signed((self.umax() & !sign) | (self.one & sign), self.width)
    }

    pub fn min_trailing_zeros(&self) -> u32 {
        self.zero.trailing_ones().min(self.width)
    }

    pub fn max_trailing_zeros(&self) -> u32 {
        self.one.trailing_zeros().min(self.width)
    }

    pub fn min_leading_zeros(&self) -> u32 {
        (self.zero << (64 - self.width)).leading_ones()
    }

    pub fn min_leading_ones(&self) -> u32 {
        (self.one << (64 - self.width)).leading_ones()
    }

    /// Number of consecutive known bits starting from the least significant one
    pub fn trailing_known(&self) -> u32 {
        self.known_mask().trailing_ones().min(self.width)
    }

    /// Keep only the knowledge about the lowest `n` bits
    pub fn low_part(&self, n: u32) -> Self {
        let keep = low_bits(n);
        Self::raw(self.width, self.zero & keep, self.one & keep)
    }

    /// Mark the highest `n` bits as known zero, `None` on conflict
    pub fn with_high_zeros(&self, n: u32) -> Option<Self> {
        self.meet(&Self::raw(self.width, high_bits(self.width, n), 0))
    }

    /// Mark the highest `n` bits as known one, `None` on conflict
    pub fn with_high_ones(&self, n: u32) -> Option<Self> {
        self.meet(&Self::raw(self.width, 0, high_bits(self.width, n)))
    }

    /// Mark the lowest `n` bits as known zero, `None` on conflict
    pub fn with_low_zeros(&self, n: u32) -> Option<Self> {
        self.meet(&Self::raw(self.width, low_bits(n.min(self.width)), 0))
    }
}

impl AbstractDomain for BitLattice {
    fn join(&self, other: &Self) -> Self {
        debug_assert_eq!(self.width, other.width);
        Self::raw(self.width, self.zero & other.zero, self.one & other.one)
    }

    fn meet(&self, other: &Self) -> Option<Self> {
        debug_assert_eq!(self.width, other.width);
        let zero = self.zero | other.zero;
        let one = self.one | other.one;
        (zero & one == 0).then(|| Self::raw(self.width, zero, one))
    }

    fn partial_order(&self, other: &Self) -> Option<Ordering> {
        if self.width != other.width {
            return None;
        }
        let below = self.zero & !other.zero == 0 && self.one & !other.one == 0;
        let above = other.zero & !self.zero == 0 && other.one & !self.one == 0;
        match (below, above) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl Display for BitLattice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for index in (0..self.width).rev() {
            write!(f, "{}", self.bit(index).symbol())?;
        }
        Ok(())
    }
}

impl FromStr for BitLattice {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let width = s.chars().count() as u32;
        let mut zero = 0u64;
        let mut one = 0u64;
        for (index, symbol) in s.chars().rev().enumerate() {
            if index as u32 >= MAX_LATTICE_WIDTH {
                return Err(EngineError::MalformedLattice(s.to_string()));
            }
            match symbol {
                '0' => zero |= 1 << index,
                '1' => one |= 1 << index,
                '?' => (),
                _ => return Err(EngineError::MalformedLattice(s.to_string())),
            }
        }
        Self::new(width, zero, one)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lat(text: &str) -> BitLattice {
        text.parse().unwrap()
    }

    #[test]
    fn conflicting_masks_are_rejected() {
        assert!(matches!(
            BitLattice::new(4, 0b0110, 0b0100),
            Err(EngineError::InvalidLattice { .. })
        ));
        assert!(BitLattice::new(4, 0b1_0000, 0).is_err());
        assert!(BitLattice::new(0, 0, 0).is_err());
        assert!(BitLattice::new(4, 0b1010, 0b0101).is_ok());
    }

    #[test]
    fn rendering_is_msb_first() {
        let l = BitLattice::new(4, 0b1010, 0b0001).unwrap();
        assert_eq!(l.to_string(), "0?01");
        assert_eq!(lat("0?01"), l);
        assert_eq!(l.bit(3), BitState::Zero);
        assert_eq!(l.bit(2), BitState::Unknown);
        assert_eq!(l.bit(0), BitState::One);
        assert!("01x".parse::<BitLattice>().is_err());
        assert!("".parse::<BitLattice>().is_err());
    }

    #[test]
    fn population_counts() {
        let l = lat("10?0");
        assert_eq!(l.count_known_zeros(), 2);
        assert_eq!(l.count_known_ones(), 1);
        assert_eq!(l.count_known(), 3);
        assert!(BitLattice::unknown(3).is_unknown());
        assert_eq!(BitLattice::constant(3, 5).as_constant(), Some(5));
    }

    #[test]
    fn bounds_from_masks() {
        let l = lat("1?0?");
        assert_eq!(l.umin(), 0b1000);
        assert_eq!(l.umax(), 0b1101);
        assert_eq!(l.smin(), -8);
        assert_eq!(l.smax(), -3);

        let u = BitLattice::unknown(4);
        assert_eq!(u.smin(), -8);
        assert_eq!(u.smax(), 7);
        assert_eq!(u.umin_non_zero(), Some(1));
        assert_eq!(lat("?00").umin_non_zero(), Some(4));
        assert_eq!(lat("000").umin_non_zero(), None);
    }

    #[test]
    fn leading_and_trailing_counts() {
        let l = lat("00?100");
        assert_eq!(l.min_leading_zeros(), 2);
        assert_eq!(l.min_trailing_zeros(), 2);
        assert_eq!(l.max_trailing_zeros(), 2);
        assert_eq!(l.trailing_known(), 3);
        assert_eq!(lat("11?0").min_leading_ones(), 2);
        assert_eq!(lat("0000").min_trailing_zeros(), 4);
        assert_eq!(lat("0000").max_trailing_zeros(), 4);
    }

    #[test]
    fn ranges_keep_common_prefix() {
        assert_eq!(BitLattice::from_range(4, 4, 7).to_string(), "01??");
        assert_eq!(BitLattice::from_range(4, 3, 3).to_string(), "0011");
        assert_eq!(BitLattice::from_range(4, 7, 8).to_string(), "????");
        assert_eq!(BitLattice::from_signed_range(4, -2, -1).to_string(), "111?");
        assert_eq!(BitLattice::from_signed_range(4, -1, 0).to_string(), "????");
    }

    #[test]
    fn lattice_operations() {
        let a = lat("01?0");
        let b = lat("0??1");
        assert_eq!(a.join(&b).to_string(), "0???");
        assert_eq!(a.meet(&lat("?1?0")), Some(a));
        assert_eq!(a.meet(&b), None);
        assert_eq!(
            BitLattice::unknown(4).partial_order(&a),
            Some(Ordering::Less)
        );
        assert_eq!(a.partial_order(&b), None);
        assert!(a.join(&b).subsumes(&a));
    }

    #[test]
    fn masked_representative_is_a_witness() {
        let l = lat("1?0?");
        for free in 0..16 {
            assert!(l.contains(l.mask_known(free)));
        }
        assert_eq!(l.mask_known(0b0110), 0b1100);
    }
}
