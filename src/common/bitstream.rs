use std::fmt::Display;
use std::mem;

use num_traits::PrimInt;

// Bit stream
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    data: Vec<u8>,
    // Bit length
    len: usize,
    // Max bit capacity
    capacity: usize,
    // Pointer to take bits
    cursor: usize,
}

impl BitStream {
    pub fn new(capacity: usize) -> Self {
        Self { data: vec![0; capacity.div_ceil(8)], len: 0, capacity, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.len.div_ceil(8)]
    }
}

// Push bits for bit stream
//------------------------------------------------------------------------------

impl BitStream {
    // Appends the lowest `size` bits of `bits`, most significant first
    pub fn push_bits<T>(&mut self, bits: T, size: usize)
    where
        T: PrimInt + Display,
    {
        let max_bits = mem::size_of::<T>() * 8;
        debug_assert!(size <= max_bits, "Bit count {size} exceeds width of type {max_bits}");
        debug_assert!(
            bits.leading_zeros() as usize + size >= max_bits,
            "Value {bits} doesn't fit in {size} bits"
        );
        debug_assert!(self.len + size <= self.capacity, "Pushing {size} bits overflows {self:?}");

        for i in (0..size).rev() {
            self.push((bits >> i) & T::one() == T::one());
        }
    }

    pub fn push(&mut self, bit: bool) {
        debug_assert!(self.len < self.capacity, "Bit stream is full at {} bits", self.capacity);

        if bit {
            self.data[self.len / 8] |= 0x80 >> (self.len % 8);
        }

        self.len += 1;
    }

    pub fn extend(&mut self, arr: &[u8]) {
        debug_assert!(self.len % 8 == 0, "Byte extension needs a byte aligned stream: {self:?}");
        debug_assert!(
            self.len + arr.len() * 8 <= self.capacity,
            "Extending by {} bytes overflows {self:?}",
            arr.len()
        );

        let start = self.len / 8;
        self.data[start..start + arr.len()].copy_from_slice(arr);
        self.len += arr.len() * 8;
    }
}

// Bit iterator
//------------------------------------------------------------------------------

impl Iterator for BitStream {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }
        let bit = self.data[self.cursor >> 3] & (0b1000_0000 >> (self.cursor & 7)) != 0;
        self.cursor += 1;
        Some(bit)
    }
}

#[cfg(test)]
mod bit_stream_tests {
    use super::BitStream;

    #[test]
    fn test_len() {
        let mut bs = BitStream::new(152);
        assert_eq!(bs.len(), 0);
        bs.push_bits(0u8, 0);
        assert_eq!(bs.len(), 0);
        bs.push_bits(0b1000u8, 4);
        assert_eq!(bs.len(), 4);
        bs.push_bits(0b1000u8, 8);
        assert_eq!(bs.len(), 12);
        bs.push_bits(0b1000u8, 4);
        assert_eq!(bs.len(), 16);
        bs.push_bits(0b1111111u8, 7);
        assert_eq!(bs.len(), 23);
    }

    #[test]
    fn test_push() {
        let mut bs = BitStream::new(2);
        bs.push(false);
        assert_eq!(bs.data(), [0b00000000]);
        bs.push(true);
        assert_eq!(bs.data(), [0b01000000]);
    }

    #[test]
    fn test_push_bits_across_bytes() {
        let mut bs = BitStream::new(32);
        bs.push_bits(0b0100u8, 4);
        bs.push_bits(0b0000_0101u16, 8);
        bs.push_bits(0b1_0101_0101u16, 9);
        assert_eq!(bs.len(), 21);
        assert_eq!(bs.data(), [0b0100_0000, 0b0101_1010, 0b1010_1000]);
    }

    #[test]
    fn test_extend() {
        let mut bs = BitStream::new(24);
        bs.push_bits(0xABu8, 8);
        bs.extend(&[0xCD, 0xEF]);
        assert_eq!(bs.len(), 24);
        assert_eq!(bs.data(), [0xAB, 0xCD, 0xEF]);
    }

    #[test]
    fn test_iter() {
        let mut bs = BitStream::new(8);
        bs.push_bits(0b101u8, 3);
        let bits: Vec<bool> = bs.collect();
        assert_eq!(bits, [true, false, true]);
    }

    #[test]
    #[should_panic]
    fn test_push_bits_capacity_overflow() {
        let mut bs = BitStream::new(8);
        bs.push_bits(0xFFu8, 8);
        bs.push_bits(1u8, 1);
    }
}
