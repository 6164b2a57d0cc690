//! RTCM3 frame layer: preamble, backfilled length, CRC24Q trailer.
use crate::prelude::Error;

use super::{bits::BitWriter, crc::crc24q};

/// Frame sync byte
const PREAMBLE: u8 = 0xD3;

/// Bit offset of the 10-bit length field
const LENGTH_OFFSET_BITS: usize = 14;

/// Maximum message body, bytes (10-bit length field)
const MAX_BODY_BYTES: usize = 1023;

#[derive(Debug, PartialEq, Eq)]
enum FrameState {
    /// Transport header written, body still empty
    Header,
    /// At least one body field written
    Body,
}

/// Single-message frame under construction. The transport header is
/// written up front with a zero length, the body is streamed through
/// [Frame::body], and sealing pads, backfills the true length and
/// appends the checksum.
#[derive(Debug)]
pub(crate) struct Frame {
    writer: BitWriter,
    state: FrameState,
}

impl Frame {
    pub fn new() -> Self {
        let mut writer = BitWriter::new();
        writer.push_unsigned(PREAMBLE as u64, 8);
        writer.push_unsigned(0, 6);
        writer.push_unsigned(0, 10); // length, backfilled on seal

        Self {
            writer,
            state: FrameState::Header,
        }
    }

    /// Body bit writer; message encoders append their fields here.
    pub fn body(&mut self) -> &mut BitWriter {
        self.state = FrameState::Body;
        &mut self.writer
    }

    /// Pads to a byte boundary, backfills the length field and appends
    /// the CRC24Q trailer. Fails on an empty body or one that exceeds
    /// the 10-bit length capacity.
    pub fn seal(mut self) -> Result<Vec<u8>, Error> {
        if self.state != FrameState::Body {
            return Err(Error::EncoderState);
        }

        self.writer.pad_to_byte();

        let body_bytes = self.writer.bit_len() / 8 - 3;
        if body_bytes > MAX_BODY_BYTES {
            return Err(Error::EncodeOverflow {
                bits: body_bytes * 8,
            });
        }

        self.writer
            .overwrite_unsigned(LENGTH_OFFSET_BITS, body_bytes as u64, 10);

        let crc = crc24q(self.writer.as_bytes());
        self.writer.push_unsigned(crc as u64, 24);

        Ok(self.writer.into_bytes())
    }
}
