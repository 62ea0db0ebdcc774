//! Bit-packed dependency sets.
//!
//! A [`VectorPack`] holds `n_set` sets, each a subset of `0..end`, stored as
//! contiguous runs of `u64` words. Set `i` usually belongs to tape node `i`.

use std::fmt;

const WORD_BITS: usize = 64;

/// Fixed-capacity collection of packed index sets.
#[derive(Clone, PartialEq, Eq)]
pub struct VectorPack {
    n_set: usize,
    end: usize,
    n_word: usize,
    data: Vec<u64>,
}

impl VectorPack {
    /// `n_set` empty sets over the elements `0..end`.
    pub fn new(n_set: usize, end: usize) -> Self {
        let n_word = end.div_ceil(WORD_BITS);
        VectorPack {
            n_set,
            end,
            n_word,
            data: vec![0u64; n_set * n_word],
        }
    }

    /// Number of sets.
    #[inline]
    pub fn n_set(&self) -> usize {
        self.n_set
    }

    /// Exclusive upper bound on elements.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    fn offset(&self, i: usize) -> usize {
        assert!(i < self.n_set, "set index {i} out of range ({})", self.n_set);
        i * self.n_word
    }

    #[inline]
    fn words(&self, i: usize) -> &[u64] {
        let start = self.offset(i);
        &self.data[start..start + self.n_word]
    }

    /// Insert `element` into set `i`.
    #[inline]
    pub fn add_element(&mut self, i: usize, element: usize) {
        assert!(
            element < self.end,
            "element {element} out of range ({})",
            self.end
        );
        let start = self.offset(i);
        self.data[start + element / WORD_BITS] |= 1u64 << (element % WORD_BITS);
    }

    /// Whether set `i` contains `element`.
    #[inline]
    pub fn test(&self, i: usize, element: usize) -> bool {
        assert!(
            element < self.end,
            "element {element} out of range ({})",
            self.end
        );
        let start = self.offset(i);
        self.data[start + element / WORD_BITS] & (1u64 << (element % WORD_BITS)) != 0
    }

    /// Empty set `i`.
    pub fn clear(&mut self, i: usize) {
        let start = self.offset(i);
        self.data[start..start + self.n_word].fill(0);
    }

    /// Replace set `dst` by the union of sets `a` and `b`.
    ///
    /// `dst` may alias `a` or `b`; each word is read before it is written.
    #[inline]
    pub fn union(&mut self, dst: usize, a: usize, b: usize) {
        let d = self.offset(dst);
        let a = self.offset(a);
        let b = self.offset(b);
        for k in 0..self.n_word {
            self.data[d + k] = self.data[a + k] | self.data[b + k];
        }
    }

    /// Replace set `dst` by the union of `self[a]` and `other[b]`.
    pub fn union_from(&mut self, dst: usize, a: usize, other: &VectorPack, b: usize) {
        assert_eq!(
            self.end, other.end,
            "packs must range over the same elements"
        );
        let d = self.offset(dst);
        let a = self.offset(a);
        let rhs = other.words(b);
        for (k, &w) in rhs.iter().enumerate() {
            self.data[d + k] = self.data[a + k] | w;
        }
    }

    /// Number of elements in set `i`.
    pub fn count(&self, i: usize) -> usize {
        self.words(i).iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether set `i` is empty.
    pub fn is_empty(&self, i: usize) -> bool {
        self.words(i).iter().all(|&w| w == 0)
    }

    /// Whether `self[i] ⊆ other[j]`.
    pub fn is_subset(&self, i: usize, other: &VectorPack, j: usize) -> bool {
        assert_eq!(
            self.end, other.end,
            "packs must range over the same elements"
        );
        self.words(i)
            .iter()
            .zip(other.words(j))
            .all(|(&l, &r)| l & !r == 0)
    }

    /// Elements of set `i` in increasing order.
    pub fn iter(&self, i: usize) -> SetIter<'_> {
        SetIter {
            words: self.words(i),
            word_idx: 0,
            current: 0,
            started: false,
        }
    }

    /// Elements of set `i` collected into a vector.
    pub fn to_vec(&self, i: usize) -> Vec<usize> {
        self.iter(i).collect()
    }
}

impl fmt::Debug for VectorPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries((0..self.n_set).map(|i| (i, self.to_vec(i))))
            .finish()
    }
}

/// Iterator over the elements of one packed set.
pub struct SetIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
    started: bool,
}

impl Iterator for SetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if !self.started {
            self.started = true;
            self.current = self.words.first().copied().unwrap_or(0);
        }
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1; // clear lowest set bit
                return Some(self.word_idx * WORD_BITS + bit);
            }
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_idx];
        }
    }
}
