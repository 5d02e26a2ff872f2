//! Fixed-width packed cell storage used by the board implementations.
//!
//! `BitPack<W>` stores `len` unsigned fields of `W` bits each (1 ≤ W ≤ 7),
//! packed most-significant-bit first within each byte. When `W` does not
//! divide 8 a field may straddle two bytes: its high bits sit at the bottom
//! of the first byte and its low bits at the top of the next.

/// Packed array of `WIDTH`-bit values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitPack<const WIDTH: u32> {
    len: usize,
    bytes: Vec<u8>,
}

#[inline]
const fn low_bits(n: u32) -> u8 {
    ((1u16 << n) - 1) as u8
}

impl<const WIDTH: u32> BitPack<WIDTH> {
    const MASK: u8 = low_bits(WIDTH);
    const VALID_WIDTH: () = assert!(WIDTH > 0 && WIDTH < 8, "field width must be between 1 and 7 bits");

    /// Create `len` zeroed fields.
    pub fn new(len: usize) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_WIDTH;
        Self {
            len,
            bytes: vec![0; (WIDTH as usize * len).div_ceil(8)],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest value a field can hold.
    #[inline]
    pub const fn max_value() -> u8 {
        Self::MASK
    }

    /// Reset every field to zero.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Read field `index`.
    ///
    /// # Panics
    /// If `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        let (j, k) = self.locate(index);
        let w = WIDTH as usize;
        if k + w <= 8 {
            (self.bytes[j] >> (8 - w - k)) & Self::MASK
        } else {
            let s = (k + w - 8) as u32;
            ((self.bytes[j] & (Self::MASK >> s)) << s) | (self.bytes[j + 1] >> (8 - s))
        }
    }

    /// Write field `index`. Bits of `value` above the field width are dropped.
    ///
    /// # Panics
    /// If `index >= len`.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        let (j, k) = self.locate(index);
        let w = WIDTH as usize;
        let v = value & Self::MASK;
        if k + w <= 8 {
            let s = (8 - w - k) as u32;
            self.bytes[j] = (self.bytes[j] & !(Self::MASK << s)) | (v << s);
        } else {
            let s = (k + w - 8) as u32;
            let t = 8 - s;
            self.bytes[j] = (self.bytes[j] & !(Self::MASK >> s)) | (v >> s);
            self.bytes[j + 1] = (self.bytes[j + 1] & !(low_bits(s) << t)) | ((v & low_bits(s)) << t);
        }
    }

    /// Iterate over all fields in index order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Byte index and bit offset (from the most significant bit) of a field.
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        assert!(
            index < self.len,
            "index {} out of range for BitPack of length {}",
            index,
            self.len
        );
        let bit = index * WIDTH as usize;
        (bit / 8, bit % 8)
    }
}
