//! CRC24Q frame checksum (RTCM 10403 polynomial 0x1864CFB).

const POLYNOMIAL: u32 = 0x1864CFB;

/// Byte-indexed lookup table, built at compile time.
const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut index = 0;
    while index < 256 {
        let mut crc = (index as u32) << 16;
        let mut bit = 0;
        while bit < 8 {
            crc <<= 1;
            if crc & 0x100_0000 != 0 {
                crc ^= POLYNOMIAL;
            }
            bit += 1;
        }
        table[index] = crc & 0xFF_FFFF;
        index += 1;
    }
    table
}

/// 24-bit checksum over `data`, zero initial value.
pub(crate) fn crc24q(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |crc, &byte| {
        ((crc << 8) & 0xFF_FFFF) ^ TABLE[(((crc >> 16) ^ byte as u32) & 0xFF) as usize]
    })
}

#[cfg(test)]
mod test {
    use super::{crc24q, TABLE};

    #[test]
    fn table_head() {
        assert_eq!(TABLE[0], 0x000000);
        assert_eq!(TABLE[1], 0x864CFB);
        assert_eq!(TABLE[2], 0x8AD50D);
        assert_eq!(TABLE[3], 0x0C99F6);
    }

    #[test]
    fn known_vectors() {
        assert_eq!(crc24q(&[]), 0);
        // reveng catalog check value
        assert_eq!(crc24q(b"123456789"), 0xCDE703);
    }
}
