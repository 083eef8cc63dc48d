//! A fixed-capacity ring of bits packed into `u64` words.

/// Number of bits per storage word. Analysis windows are rounded up to a
/// multiple of this.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Ring buffer of single bits. The newest bit has age `0`.
///
/// ```rust
/// use bacf_pitch::utils::bitstream::Bitstream;
///
/// let mut bits = Bitstream::new(128);
/// bits.push(true);
/// bits.push(false);
/// assert!(!bits.get(0));
/// assert!(bits.get(1));
/// assert!(!bits.get(2));
/// ```
pub struct Bitstream {
    words: Box<[u64]>,
    capacity: usize,
    // Position the next bit will be written to.
    write_pos: usize,
}

impl Bitstream {
    /// Create a bitstream holding at least `min_bits` bits, all cleared.
    pub fn new(min_bits: usize) -> Self {
        let words = min_bits.max(1).div_ceil(WORD_BITS);
        Bitstream {
            words: vec![0; words].into_boxed_slice(),
            capacity: words * WORD_BITS,
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        let word = self.write_pos / WORD_BITS;
        let mask = 1u64 << (self.write_pos % WORD_BITS);
        if bit {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }
        self.write_pos += 1;
        if self.write_pos == self.capacity {
            self.write_pos = 0;
        }
    }

    /// Bit pushed `age` pushes ago. `age` must be below the capacity.
    #[inline]
    pub fn get(&self, age: usize) -> bool {
        debug_assert!(age < self.capacity);
        let pos = (self.write_pos + self.capacity - 1 - age) % self.capacity;
        (self.words[pos / WORD_BITS] >> (pos % WORD_BITS)) & 1 == 1
    }

    /// Number of set bits in the whole ring.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Count positions `i in 0..span` where the bit of age `i` differs from
    /// the bit of age `i + lag`. This is the direct form of the sums the
    /// detector maintains incrementally.
    pub fn mismatches(&self, lag: usize, span: usize) -> u32 {
        debug_assert!(lag + span <= self.capacity);
        (0..span)
            .filter(|&i| self.get(i) != self.get(i + lag))
            .count() as u32
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_up_to_words() {
        assert_eq!(Bitstream::new(1).capacity(), 64);
        assert_eq!(Bitstream::new(64).capacity(), 64);
        assert_eq!(Bitstream::new(65).capacity(), 128);
    }

    #[test]
    fn wraps_around() {
        let mut bits = Bitstream::new(64);
        for i in 0..200 {
            bits.push(i % 3 == 0);
        }
        // Newest bit was pushed for i = 199.
        for age in 0..64 {
            let i = 199 - age;
            assert_eq!(bits.get(age), i % 3 == 0, "age {}", age);
        }
        assert_eq!(bits.count_ones(), (136..200).filter(|i| i % 3 == 0).count() as u32);
    }

    #[test]
    fn mismatches_of_periodic_bits() {
        let mut bits = Bitstream::new(256);
        for i in 0..256 {
            bits.push(i % 8 < 4);
        }
        assert_eq!(bits.mismatches(8, 64), 0);
        assert_eq!(bits.mismatches(4, 64), 64);
        assert_eq!(bits.mismatches(2, 64), 32);
    }

    #[test]
    fn clear_resets_everything() {
        let mut bits = Bitstream::new(64);
        (0..10).for_each(|_| bits.push(true));
        bits.clear();
        assert_eq!(bits.count_ones(), 0);
        assert!(!bits.get(0));
    }
}
