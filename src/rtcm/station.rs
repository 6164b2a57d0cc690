//! Type 1005: stationary antenna reference point coordinates.
use nalgebra::Vector3;

use super::bits::BitWriter;

/// Coordinate resolution: 0.1 mm
const COORD_LSB_M: f64 = 0.0001;

/// Writes the 1005 body: reference station id and the antenna
/// reference point in ECEF, 38-bit fields at 0.1 mm. GPS and GLONASS
/// service flags are asserted, oscillator is declared single.
pub(crate) fn encode_1005(writer: &mut BitWriter, station_id: u16, reference_ecef_m: Vector3<f64>) {
    writer.push_unsigned(1005, 12);
    writer.push_unsigned(station_id as u64, 12);
    writer.push_unsigned(0, 6); // ITRF realization year
    writer.push_unsigned(1, 1); // GPS service
    writer.push_unsigned(1, 1); // GLONASS service
    writer.push_unsigned(0, 1); // Galileo service
    writer.push_unsigned(0, 1); // reference station indicator

    push_38bit_coordinate(writer, reference_ecef_m[0]);
    writer.push_unsigned(1, 1); // single receiver oscillator
    writer.push_unsigned(0, 1); // reserved
    push_38bit_coordinate(writer, reference_ecef_m[1]);
    writer.push_unsigned(0, 2); // quarter cycle indicator
    push_38bit_coordinate(writer, reference_ecef_m[2]);
}

/// 38-bit signed coordinate, split as a signed 32-bit upper word and a
/// 6-bit remainder.
fn push_38bit_coordinate(writer: &mut BitWriter, coordinate_m: f64) {
    let value = coordinate_m / COORD_LSB_M;
    let word_h = (value / 64.0).floor();
    let word_l = (value - word_h * 64.0) as u64;

    writer.push_signed(word_h as i64, 32);
    writer.push_unsigned(word_l, 6);
}

#[cfg(test)]
mod test {
    use super::{encode_1005, push_38bit_coordinate};
    use crate::rtcm::bits::BitWriter;
    use nalgebra::Vector3;

    fn read_bits(bytes: &[u8], offset: usize, bits: usize) -> u64 {
        (0..bits).fold(0, |acc, i| {
            let position = offset + i;
            let bit = (bytes[position / 8] >> (7 - position % 8)) & 1;
            (acc << 1) | bit as u64
        })
    }

    fn read_38bit(bytes: &[u8], offset: usize) -> f64 {
        let word_h = read_bits(bytes, offset, 32) as u32 as i32 as i64;
        let word_l = read_bits(bytes, offset + 32, 6) as i64;
        (word_h * 64 + word_l) as f64 * 0.0001
    }

    #[test]
    fn coordinate_split() {
        for coordinate in [-4691596.883, -2455314.231, 3543996.389, 0.0] {
            let mut writer = BitWriter::new();
            push_38bit_coordinate(&mut writer, coordinate);
            writer.pad_to_byte();

            let decoded = read_38bit(writer.as_bytes(), 0);
            assert!(
                (decoded - coordinate).abs() < 0.0001,
                "{coordinate} decoded as {decoded}"
            );
        }
    }

    #[test]
    fn reference_point_layout() {
        let reference = Vector3::new(-2455314.231, -4691596.883, 3543996.389);

        let mut writer = BitWriter::new();
        encode_1005(&mut writer, 902, reference);
        writer.pad_to_byte();
        let bytes = writer.as_bytes();

        assert_eq!(read_bits(bytes, 0, 12), 1005);
        assert_eq!(read_bits(bytes, 12, 12), 902);
        assert_eq!(read_bits(bytes, 30, 1), 1); // GPS flag

        // X | osc+reserved | Y | quarter-cycle | Z
        assert!((read_38bit(bytes, 34) - reference[0]).abs() < 0.0001);
        assert!((read_38bit(bytes, 74) - reference[1]).abs() < 0.0001);
        assert!((read_38bit(bytes, 114) - reference[2]).abs() < 0.0001);
    }
}
