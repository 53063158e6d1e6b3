#![forbid(unsafe_code)]

/// Per-slot validity bits for a chunk: `1` marks a present value, `0` a null.
///
/// Bits are packed little-endian into `u64` words (bit 0 is the LSB of word 0). Bits past `len`
/// in the last word are always zero, so word-level `&` never resurrects a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVec {
    words: Vec<u64>,
    len: usize,
    ones: usize,
}

fn word_count(bits: usize) -> usize {
    (bits + 63) / 64
}

fn tail_mask(bits: usize) -> Option<u64> {
    match bits % 64 {
        0 => None,
        rem => Some((1u64 << rem) - 1),
    }
}

impl BitVec {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
            ones: 0,
        }
    }

    pub fn with_len_all_true(bits: usize) -> Self {
        let mut words = vec![u64::MAX; word_count(bits)];
        if let (Some(mask), Some(last)) = (tail_mask(bits), words.last_mut()) {
            *last = mask;
        }
        Self {
            words,
            len: bits,
            ones: bits,
        }
    }

    pub fn with_len_all_false(bits: usize) -> Self {
        Self {
            words: vec![0u64; word_count(bits)],
            len: bits,
            ones: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, value: bool) {
        let bit = self.len % 64;
        if bit == 0 {
            self.words.push(0);
        }
        if value {
            self.words[self.len / 64] |= 1u64 << bit;
            self.ones += 1;
        }
        self.len += 1;
    }

    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "BitVec index out of bounds");
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    pub fn set(&mut self, index: usize, value: bool) {
        debug_assert!(index < self.len, "BitVec index out of bounds");
        let mask = 1u64 << (index % 64);
        let word = &mut self.words[index / 64];
        let was_set = *word & mask != 0;
        if was_set == value {
            return;
        }
        if value {
            *word |= mask;
            self.ones += 1;
        } else {
            *word &= !mask;
            self.ones -= 1;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.ones
    }

    pub fn count_zeros(&self) -> usize {
        self.len - self.ones
    }

    pub fn all_true(&self) -> bool {
        self.ones == self.len
    }

    /// Intersect with `other` in place: a slot stays set only if it is set in both.
    pub fn and_inplace(&mut self, other: &BitVec) {
        debug_assert_eq!(self.len, other.len, "BitVec length mismatch");
        let mut ones = 0usize;
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w &= *o;
            ones += w.count_ones() as usize;
        }
        self.ones = ones;
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl Default for BitVec {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<bool> for BitVec {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut bits = BitVec {
            words: Vec::with_capacity(word_count(iter.size_hint().0)),
            len: 0,
            ones: 0,
        };
        for value in iter {
            bits.push(value);
        }
        bits
    }
}
