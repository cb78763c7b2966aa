//! Bit set over sub-board indices

use std::fmt;

use super::BOARD_SIZE;

const ALL_BITS: u16 = (1 << BOARD_SIZE) - 1;

/// Set of sub-board indices (0..9) packed into the low 9 bits of a u16.
///
/// Iteration is always ascending, which is the canonical order used for
/// move generation and fingerprinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoardSet {
    bits: u16,
}

impl BoardSet {
    /// Create empty set
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Every sub-board (free choice)
    pub const fn all() -> Self {
        Self { bits: ALL_BITS }
    }

    #[inline]
    pub fn single(board: usize) -> Self {
        debug_assert!(board < BOARD_SIZE);
        Self { bits: 1 << board }
    }

    #[inline]
    pub fn insert(&mut self, board: usize) {
        debug_assert!(board < BOARD_SIZE);
        self.bits |= 1 << board;
    }

    #[inline]
    pub fn remove(&mut self, board: usize) {
        self.bits &= !(1 << board);
    }

    #[inline]
    pub fn contains(&self, board: usize) -> bool {
        board < BOARD_SIZE && (self.bits >> board) & 1 == 1
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.bits.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub fn is_all(&self) -> bool {
        self.bits == ALL_BITS
    }

    /// Raw bits, used by the fingerprint
    #[inline]
    pub fn bits(&self) -> u16 {
        self.bits
    }

    /// The only member, if the set has exactly one
    #[inline]
    pub fn only(&self) -> Option<usize> {
        (self.len() == 1).then(|| self.bits.trailing_zeros() as usize)
    }

    /// Iterate over members in ascending order
    pub fn iter(&self) -> BoardSetIter {
        BoardSetIter { bits: self.bits }
    }
}

impl FromIterator<usize> for BoardSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BoardSet::new();
        for board in iter {
            set.insert(board);
        }
        set
    }
}

impl fmt::Display for BoardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return write!(f, "*");
        }
        for board in self.iter() {
            write!(f, "{board}")?;
        }
        Ok(())
    }
}

/// Iterator over set members
pub struct BoardSetIter {
    bits: u16,
}

impl Iterator for BoardSetIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let idx = self.bits.trailing_zeros() as usize;
        // Clear the bit we just found
        self.bits &= self.bits - 1;
        Some(idx)
    }
}
