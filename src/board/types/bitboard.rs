//! Bitboard type and operations.
//!
//! A bitboard is a 64-bit word where bit `i` corresponds to square `i`
//! (a1=0 .. h8=63). All piece placement and attack sets are bitboards.

use super::square::Square;

/// A 64-bit bitboard representing piece positions or attack squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const FILE_A: Bitboard = Bitboard(0x0101010101010101);
    pub const FILE_H: Bitboard = Bitboard(0x8080808080808080);

    pub const RANK_1: Bitboard = Bitboard(0x00000000000000FF);
    pub const RANK_8: Bitboard = Bitboard(0xFF00000000000000);

    pub const EMPTY: Bitboard = Bitboard(0);
    pub const ALL: Bitboard = Bitboard(!0);
}

impl Bitboard {
    /// Create a bitboard with a single square set.
    #[inline]
    #[must_use]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1u64 << sq.as_index())
    }

    /// Returns a copy with the bit for index `idx` set.
    #[inline]
    #[must_use]
    pub const fn set_bit(self, idx: usize) -> Self {
        Bitboard(self.0 | (1u64 << idx))
    }

    /// Returns a copy with the bit for index `idx` cleared.
    #[inline]
    #[must_use]
    pub const fn clear_bit(self, idx: usize) -> Self {
        Bitboard(self.0 & !(1u64 << idx))
    }

    /// Index of the lowest set bit. Precondition: the bitboard is non-empty.
    #[inline]
    #[must_use]
    pub const fn first_bit(self) -> usize {
        self.0.trailing_zeros() as usize
    }

    /// Index of the highest set bit. Precondition: the bitboard is non-empty.
    #[inline]
    #[must_use]
    pub const fn last_bit(self) -> usize {
        63 - self.0.leading_zeros() as usize
    }

    /// Number of set bits (population count).
    #[inline]
    #[must_use]
    pub const fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if the bitboard is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if exactly one bit is set.
    #[inline]
    #[must_use]
    pub const fn is_single(self) -> bool {
        self.0.is_power_of_two()
    }

    /// Returns true if the given square is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, sq: Square) -> bool {
        (self.0 >> sq.as_index()) & 1 != 0
    }

    /// Returns true if the given index is set.
    #[inline]
    #[must_use]
    pub const fn contains_index(self, idx: usize) -> bool {
        (self.0 >> idx) & 1 != 0
    }

    /// Get the file mask for a given file index (0-7).
    #[inline]
    #[must_use]
    pub const fn file_mask(file: usize) -> Self {
        Bitboard(Self::FILE_A.0 << file)
    }

    /// Get the rank mask for a given rank index (0-7).
    #[inline]
    #[must_use]
    pub const fn rank_mask(rank: usize) -> Self {
        Bitboard(Self::RANK_1.0 << (rank * 8))
    }

    /// Returns an iterator over the square indices set in this bitboard,
    /// from lowest to highest.
    #[inline]
    #[must_use]
    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

/// Remove and return the lowest set bit's index.
/// Precondition: the bitboard is non-empty.
#[inline]
pub(crate) fn pop_lsb(bb: &mut Bitboard) -> usize {
    let idx = bb.0.trailing_zeros() as usize;
    bb.0 &= bb.0 - 1;
    idx
}

pub(crate) fn bit_for_square(sq: Square) -> u64 {
    1u64 << sq.as_index()
}

/// Iterator over set bits in a Bitboard, low to high.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            None
        } else {
            Some(pop_lsb(&mut self.0))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.popcount() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitboardIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clear_bit() {
        let bb = Bitboard::EMPTY.set_bit(12);
        assert!(bb.contains_index(12));
        assert_eq!(bb.popcount(), 1);
        assert!(bb.clear_bit(12).is_empty());
        // Setting an already-set bit is a no-op
        assert_eq!(bb.set_bit(12), bb);
    }

    #[test]
    fn test_first_last_bit() {
        let bb = Bitboard::EMPTY.set_bit(5).set_bit(42).set_bit(63);
        assert_eq!(bb.first_bit(), 5);
        assert_eq!(bb.last_bit(), 63);
        assert_eq!(Bitboard(1).first_bit(), 0);
        assert_eq!(Bitboard(1).last_bit(), 0);
    }

    #[test]
    fn test_iter_low_to_high() {
        let bb = Bitboard::EMPTY.set_bit(3).set_bit(17).set_bit(60);
        let indices: Vec<usize> = bb.iter().collect();
        assert_eq!(indices, vec![3, 17, 60]);
    }

    #[test]
    fn test_iter_restartable() {
        let bb = Bitboard(0x00FF00FF00FF00FF);
        let a: Vec<usize> = bb.iter().collect();
        let b: Vec<usize> = bb.iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), bb.popcount() as usize);
    }

    #[test]
    fn test_masks() {
        assert_eq!(Bitboard::file_mask(0), Bitboard::FILE_A);
        assert_eq!(Bitboard::rank_mask(0), Bitboard::RANK_1);
        assert_eq!(Bitboard::rank_mask(7), Bitboard::RANK_8);
        assert_eq!(Bitboard::file_mask(7), Bitboard::FILE_H);
    }

    #[test]
    fn test_popcount() {
        assert_eq!(Bitboard::ALL.popcount(), 64);
        assert_eq!(Bitboard::EMPTY.popcount(), 0);
        assert_eq!(Bitboard::RANK_1.popcount(), 8);
    }
}
