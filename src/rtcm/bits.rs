//! MSB-first bit packing over a growable byte buffer.

/// MSB-first bit writer. Fields of up to 64 bits are appended in wire
/// order; the length field of a sealed frame is backfilled in place.
#[derive(Debug, Clone, Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Appends the `bits` low-order bits of `value`, MSB first.
    pub fn push_unsigned(&mut self, value: u64, bits: usize) {
        for shift in (0..bits).rev() {
            let bit = (value >> shift) & 1;
            let byte_index = self.bit_len / 8;
            if byte_index == self.bytes.len() {
                self.bytes.push(0);
            }
            if bit != 0 {
                self.bytes[byte_index] |= 0x80 >> (self.bit_len % 8);
            }
            self.bit_len += 1;
        }
    }

    /// Appends a two's-complement signed field.
    pub fn push_signed(&mut self, value: i64, bits: usize) {
        self.push_unsigned(value as u64, bits);
    }

    /// Zero-pads to the next byte boundary.
    pub fn pad_to_byte(&mut self) {
        let rem = self.bit_len % 8;
        if rem != 0 {
            self.push_unsigned(0, 8 - rem);
        }
    }

    /// Overwrites `bits` already-written bits starting at `bit_offset`.
    pub fn overwrite_unsigned(&mut self, bit_offset: usize, value: u64, bits: usize) {
        debug_assert!(bit_offset + bits <= self.bit_len);

        for (i, shift) in (0..bits).rev().enumerate() {
            let position = bit_offset + i;
            let mask = 0x80 >> (position % 8);
            let byte = &mut self.bytes[position / 8];

            if (value >> shift) & 1 != 0 {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }
}
