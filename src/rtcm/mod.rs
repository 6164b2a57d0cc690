//! RTCM3 wire encoding: transport framing, the 1005 reference point
//! message and per-constellation MSM4 observation messages.
use log::{debug, warn};
use nalgebra::Vector3;

use crate::prelude::{Constellation, ConstellationCapabilities, EpochBatch, Error};

mod bits;
mod crc;
mod frame;
mod msm;
mod station;

use frame::Frame;
use msm::MsmMessage;

/// Broadcast order of the served constellations.
const CONSTELLATION_ORDER: [Constellation; 3] = [
    Constellation::GPS,
    Constellation::Galileo,
    Constellation::BeiDou,
];

/// Ready-to-broadcast frames of one epoch: the 1005 reference point
/// first, then one MSM4 frame per constellation that produced
/// observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtcmEpochFrames {
    pub frames: Vec<Vec<u8>>,
}

impl RtcmEpochFrames {
    /// All frames back to back, the byte stream a caster forwards.
    pub fn concatenated(&self) -> Vec<u8> {
        self.frames.concat()
    }

    /// Total stream length in bytes.
    pub fn stream_len(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }
}

/// Stateful RTCM3 encoder for one virtual reference station: station
/// id, antenna reference point, and the rolling 3-bit issue-of-data
/// sequence shared by the MSM frames of each epoch.
#[derive(Debug, Clone)]
pub struct Rtcm3Encoder {
    /// Reference station id (12-bit)
    station_id: u16,

    /// Antenna reference point (ECEF, meters)
    reference_ecef_m: Vector3<f64>,

    /// Rolling epoch sequence, 3-bit
    sequence: u8,
}

impl Rtcm3Encoder {
    pub fn new(station_id: u16, reference_ecef_m: Vector3<f64>) -> Self {
        Self {
            station_id,
            reference_ecef_m,
            sequence: 0,
        }
    }

    /// Encodes one epoch batch. The multiple-message flag stays
    /// asserted on every MSM frame except the last of the epoch; a
    /// constellation whose message fails to encode is dropped without
    /// affecting its siblings.
    pub fn encode_epoch(&mut self, batch: &EpochBatch) -> Result<RtcmEpochFrames, Error> {
        let mut output = RtcmEpochFrames::default();

        let mut frame = Frame::new();
        station::encode_1005(frame.body(), self.station_id, self.reference_ecef_m);
        output.frames.push(frame.seal()?);

        let groups: Vec<_> = CONSTELLATION_ORDER
            .iter()
            .filter_map(|&constellation| {
                let observations = batch.for_constellation(constellation);
                if observations.is_empty() {
                    None
                } else {
                    Some((constellation, observations))
                }
            })
            .collect();

        let last = groups.len().saturating_sub(1);

        for (index, (constellation, observations)) in groups.iter().enumerate() {
            let Some(caps) = ConstellationCapabilities::from_constellation(*constellation) else {
                continue;
            };

            let mut frame = Frame::new();
            let message = MsmMessage {
                msm_type: caps.msm4_type,
                station_id: self.station_id,
                constellation: *constellation,
                multiple_message: index < last,
                sequence: self.sequence,
                observations,
            };

            let sealed = msm::encode_msm4(frame.body(), batch.epoch, &message)
                .and_then(|()| frame.seal());

            match sealed {
                Ok(bytes) => {
                    debug!(
                        "{} - {} msm4: {} observations, {} bytes",
                        batch.epoch,
                        constellation,
                        observations.len(),
                        bytes.len()
                    );
                    output.frames.push(bytes);
                },
                Err(e) => {
                    warn!("{} - {} msm4 dropped: {}", batch.epoch, constellation, e);
                },
            }
        }

        self.sequence = (self.sequence + 1) & 0x7;
        Ok(output)
    }
}
