//! MSM4 observation messages (1074 / 1094 / 1124).
use log::debug;

use crate::{
    constants::RANGE_1MS_M,
    prelude::{Constellation, Epoch, Error, ObservationRecord, TimeScale},
};

use super::bits::BitWriter;

/// Fine pseudorange resolution, ms
const P2_24: f64 = 5.960_464_477_539_063E-8;

/// Rough pseudorange resolution, ms
const P2_10: f64 = 9.765_625E-4;

/// Fine pseudorange saturation (meters)
const FINE_RANGE_LIMIT_M: f64 = 292.7;

/// Fine pseudorange absent marker (15-bit)
const FINE_RANGE_ABSENT: i64 = -16384;

/// Fine phase-range absent marker (22-bit): carrier phase is never
/// synthesized
const PHASE_RANGE_ABSENT: i64 = -2097152;

/// MSM cell mask capacity
const MAX_CELLS: usize = 64;

/// One MSM4 message worth of context.
pub(crate) struct MsmMessage<'a> {
    /// Message number (1074 / 1094 / 1124)
    pub msm_type: u16,

    /// Reference station id
    pub station_id: u16,

    /// [Constellation] the observations belong to
    pub constellation: Constellation,

    /// More messages follow within this epoch
    pub multiple_message: bool,

    /// Issue of data station, 3-bit rolling sequence
    pub sequence: u8,

    /// Observations of this constellation only
    pub observations: &'a [&'a ObservationRecord],
}

/// Writes one full MSM4 body: header, satellite/signal/cell masks,
/// satellite rough ranges, then the field-major cell blocks.
pub(crate) fn encode_msm4(
    writer: &mut BitWriter,
    epoch: Epoch,
    message: &MsmMessage,
) -> Result<(), Error> {
    // dense 1-based satellite and signal indices, two-pass
    let mut sat_present = [false; 64];
    let mut sig_present = [false; 32];

    for obs in message.observations {
        let Some(msm_id) = obs.signal.msm_id(message.constellation) else {
            debug!("{}({}) - {} has no msm slot", epoch, obs.sv, obs.signal);
            continue;
        };
        if (1..=64).contains(&obs.sv.prn) {
            sat_present[obs.sv.prn as usize - 1] = true;
            sig_present[msm_id as usize - 1] = true;
        }
    }

    let sats: Vec<u8> = (1..=64u8).filter(|&p| sat_present[p as usize - 1]).collect();
    let sigs: Vec<u8> = (1..=32u8).filter(|&s| sig_present[s as usize - 1]).collect();

    let cells = sats.len() * sigs.len();
    if cells > MAX_CELLS {
        return Err(Error::CellMaskOverflow { cells });
    }

    // cell grid in satellite-major order
    let mut grid: Vec<Option<&ObservationRecord>> = vec![None; cells];
    for obs in message.observations {
        let Some(msm_id) = obs.signal.msm_id(message.constellation) else {
            continue;
        };
        let (Ok(si), Ok(gi)) = (
            sats.binary_search(&obs.sv.prn),
            sigs.binary_search(&msm_id),
        ) else {
            continue;
        };
        grid[si * sigs.len() + gi] = Some(*obs);
    }

    // header
    writer.push_unsigned(message.msm_type as u64, 12);
    writer.push_unsigned(message.station_id as u64, 12);
    writer.push_unsigned(epoch_field_ms(epoch, message.constellation), 30);
    writer.push_unsigned(message.multiple_message as u64, 1);
    writer.push_unsigned((message.sequence & 0x7) as u64, 3);
    writer.push_unsigned(0, 7); // reserved
    writer.push_unsigned(0, 2); // clock steering
    writer.push_unsigned(0, 2); // external clock
    writer.push_unsigned(0, 1); // divergence-free smoothing
    writer.push_unsigned(0, 3); // smoothing interval

    for p in 1..=64u8 {
        writer.push_unsigned(sat_present[p as usize - 1] as u64, 1);
    }
    for s in 1..=32u8 {
        writer.push_unsigned(sig_present[s as usize - 1] as u64, 1);
    }
    for si in 0..sats.len() {
        for gi in 0..sigs.len() {
            writer.push_unsigned(grid[si * sigs.len() + gi].is_some() as u64, 1);
        }
    }

    // per-satellite rough range, from the first present signal
    let rough_m: Vec<f64> = (0..sats.len())
        .map(|si| {
            let pseudorange = (0..sigs.len())
                .find_map(|gi| grid[si * sigs.len() + gi])
                .map(|obs| obs.pseudorange_m)
                .unwrap_or(0.0);
            round_u(pseudorange / RANGE_1MS_M / P2_10) as f64 * RANGE_1MS_M * P2_10
        })
        .collect();

    for &rough in &rough_m {
        let int_ms = if rough <= 0.0 || rough >= 255.0 * RANGE_1MS_M {
            255
        } else {
            round_u(rough / RANGE_1MS_M / P2_10) >> 10
        };
        writer.push_unsigned(int_ms, 8);
    }
    for &rough in &rough_m {
        writer.push_unsigned(round_u(rough / RANGE_1MS_M / P2_10) & 0x3FF, 10);
    }

    // cell fields, field-major
    for (index, obs) in grid.iter().enumerate().filter(|(_, c)| c.is_some()) {
        let obs = obs.unwrap();
        let fine_m = obs.pseudorange_m - rough_m[index / sigs.len()];
        let field = if fine_m == 0.0 || fine_m.abs() > FINE_RANGE_LIMIT_M {
            FINE_RANGE_ABSENT
        } else {
            round_i(fine_m / RANGE_1MS_M / P2_24)
        };
        writer.push_signed(field, 15);
    }
    for _ in grid.iter().filter(|c| c.is_some()) {
        writer.push_signed(PHASE_RANGE_ABSENT, 22);
    }
    for _ in grid.iter().filter(|c| c.is_some()) {
        writer.push_unsigned(0, 4); // lock time
    }
    for _ in grid.iter().filter(|c| c.is_some()) {
        writer.push_unsigned(0, 1); // half-cycle ambiguity
    }
    for obs in grid.iter().filter(|c| c.is_some()) {
        let obs = obs.unwrap();
        let cnr = round_u(obs.snr_0p25_dbhz as f64 * 0.25).min(63);
        writer.push_unsigned(cnr, 6);
    }

    Ok(())
}

/// 30-bit epoch field: GPS time-of-week milliseconds, except BDS which
/// reports in its own time scale.
fn epoch_field_ms(epoch: Epoch, constellation: Constellation) -> u64 {
    let scale = match constellation {
        Constellation::BeiDou => TimeScale::BDT,
        _ => TimeScale::GPST,
    };

    let (_, tow_ns) = epoch.to_time_scale(scale).to_time_of_week();
    tow_ns / 1_000_000
}

fn round_u(value: f64) -> u64 {
    (value + 0.5).floor().max(0.0) as u64
}

fn round_i(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod test {
    use super::{encode_msm4, epoch_field_ms, MsmMessage, P2_10, P2_24};
    use crate::constants::RANGE_1MS_M;
    use crate::prelude::{Constellation, Epoch, ObservationRecord, SignalCode, TimeScale, SV};

    use crate::rtcm::bits::BitWriter;

    fn read_bits(bytes: &[u8], offset: usize, bits: usize) -> u64 {
        (0..bits).fold(0, |acc, i| {
            let position = offset + i;
            let bit = (bytes[position / 8] >> (7 - position % 8)) & 1;
            (acc << 1) | bit as u64
        })
    }

    fn obs(prn: u8, signal: SignalCode, pseudorange_m: f64) -> ObservationRecord {
        ObservationRecord {
            sv: SV::new(Constellation::GPS, prn),
            signal,
            pseudorange_m,
            snr_0p25_dbhz: 180,
        }
    }

    #[test]
    fn bds_epoch_leads_gps() {
        let t0 = Epoch::from_time_of_week(2290, 3600 * 1_000_000_000, TimeScale::GPST);
        let gps_ms = epoch_field_ms(t0, Constellation::GPS);
        let bds_ms = epoch_field_ms(t0, Constellation::BeiDou);

        assert_eq!(gps_ms, 3_600_000);
        // BDT runs 14 s behind GPST
        assert_eq!(bds_ms, 3_600_000 - 14_000);
    }

    #[test]
    fn masks_and_ranges() {
        let t0 = Epoch::from_time_of_week(2290, 0, TimeScale::GPST);

        let o1 = obs(4, SignalCode::C1C, 2.2E7);
        let o2 = obs(4, SignalCode::C2W, 2.2E7 + 5.0);
        let o3 = obs(17, SignalCode::C1C, 2.4E7);
        let observations = [&o1, &o2, &o3];

        let mut writer = BitWriter::new();
        encode_msm4(
            &mut writer,
            t0,
            &MsmMessage {
                msm_type: 1074,
                station_id: 902,
                constellation: Constellation::GPS,
                multiple_message: true,
                sequence: 5,
                observations: &observations,
            },
        )
        .unwrap();
        writer.pad_to_byte();
        let bytes = writer.as_bytes();

        assert_eq!(read_bits(bytes, 0, 12), 1074);
        assert_eq!(read_bits(bytes, 12, 12), 902);
        assert_eq!(read_bits(bytes, 54, 1), 1); // multiple message
        assert_eq!(read_bits(bytes, 55, 3), 5); // sequence

        // satellite mask: PRN 4 and 17 only
        let sat_mask = read_bits(bytes, 73, 64);
        assert_eq!(sat_mask, (1 << 60) | (1 << 47));

        // signal mask: ids 2 (C1C) and 10 (C2W)
        let sig_mask = read_bits(bytes, 137, 32);
        assert_eq!(sig_mask, (1 << 30) | (1 << 22));

        // cell mask: PRN 4 carries both signals, PRN 17 only C1C
        assert_eq!(read_bits(bytes, 169, 4), 0b1110);

        // rough + fine range reconstructs the PRN 4 pseudorange
        let int_ms = read_bits(bytes, 173, 8) as f64;
        let mod_ms = read_bits(bytes, 173 + 16, 10) as f64;
        let rough_m = (int_ms + mod_ms * P2_10) * RANGE_1MS_M;

        let fine = read_bits(bytes, 173 + 36, 15) as i64;
        let fine = (fine << 49) >> 49; // sign extend
        let reconstructed = rough_m + fine as f64 * P2_24 * RANGE_1MS_M;
        assert!((reconstructed - 2.2E7).abs() < 0.02, "{reconstructed}");

        // phase range is marked absent on every cell
        let phase_offset = 173 + 36 + 3 * 15;
        let phase = read_bits(bytes, phase_offset, 22) as i64;
        assert_eq!((phase << 42) >> 42, -2097152);
    }
}
