//! Per-epoch synthesis of corrected pseudorange observations.
use itertools::Itertools;
use log::{debug, warn};
use nalgebra::Vector3;

use crate::{
    attitude::ElevationAzimuth,
    constants::{ELEVATION_MASK_RAD, SPEED_OF_LIGHT_M_S},
    prelude::{
        ConstellationCapabilities, Constellation, CorrectionSnapshot, Epoch, Error,
        EphemerisPropagator, IonosphereModel, SignalCode, TropoGrid, TroposphereModel, SV,
    },
};

/// Minimum usable vehicle count: below this, the epoch yields nothing
const MIN_SATELLITES: usize = 4;

/// Signals to serve for one constellation. The first entry is the
/// primary signal: its code bias must exist for a vehicle to qualify
/// at all, and its carrier anchors the ionosphere evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationSelection {
    /// Served [Constellation]
    pub constellation: Constellation,

    /// Served [SignalCode]s, primary first
    pub signals: Vec<SignalCode>,
}

impl ConstellationSelection {
    pub fn new(constellation: Constellation, signals: Vec<SignalCode>) -> Self {
        Self {
            constellation,
            signals,
        }
    }
}

/// One synthesized pseudorange pseudo-observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationRecord {
    /// [SV]
    pub sv: SV,

    /// Observed [SignalCode]
    pub signal: SignalCode,

    /// Corrected pseudorange (meters)
    pub pseudorange_m: f64,

    /// Synthetic carrier-to-noise ratio, 0.25 dB-Hz units
    pub snr_0p25_dbhz: u16,
}

/// All observations synthesized for one epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpochBatch {
    /// Reception [Epoch] (GPST)
    pub epoch: Epoch,

    /// Synthesized observations, grouped by constellation in
    /// selection order
    pub observations: Vec<ObservationRecord>,
}

impl EpochBatch {
    /// Observations of one constellation, in synthesis order.
    pub fn for_constellation(&self, constellation: Constellation) -> Vec<&ObservationRecord> {
        self.observations
            .iter()
            .filter(|obs| obs.sv.constellation == constellation)
            .collect()
    }

    /// Distinct vehicles across all constellations.
    pub fn satellite_count(&self) -> usize {
        self.observations.iter().map(|obs| obs.sv).unique().count()
    }

    /// Distinct vehicle count per constellation, in batch order.
    pub fn counts_by_constellation(&self) -> Vec<(Constellation, usize)> {
        let mut counts: Vec<(Constellation, usize)> = Vec::new();
        for sv in self.observations.iter().map(|obs| obs.sv).unique() {
            match counts.iter_mut().find(|(c, _)| *c == sv.constellation) {
                Some((_, count)) => *count += 1,
                None => counts.push((sv.constellation, 1)),
            }
        }
        counts
    }
}

/// Builds one [EpochBatch] per call from the current correction
/// snapshot: vehicle qualification, orbit/clock propagation at the
/// solved transmission time, atmospheric terms, corrected pseudorange
/// and synthetic SNR.
#[derive(Debug, Clone)]
pub struct EpochSynthesizer {
    /// Virtual user position (ECEF, meters)
    user_ecef_m: Vector3<f64>,

    /// Served constellations and signals
    selections: Vec<ConstellationSelection>,

    /// Elevation mask (radians)
    elevation_mask_rad: f64,
}

impl EpochSynthesizer {
    /// Synthesizer for one virtual user position, serving `selections`
    /// with the default 10° elevation mask.
    pub fn new(user_ecef_m: Vector3<f64>, selections: Vec<ConstellationSelection>) -> Self {
        Self {
            user_ecef_m,
            selections,
            elevation_mask_rad: ELEVATION_MASK_RAD,
        }
    }

    /// Custom elevation mask (radians).
    pub fn with_elevation_mask(mut self, mask_rad: f64) -> Self {
        self.elevation_mask_rad = mask_rad;
        self
    }

    /// Synthesizes the batch for reception epoch `now`.
    /// Fails only when fewer than 4 vehicles qualify overall; per
    /// vehicle rejections simply thin the batch.
    pub fn synthesize(
        &self,
        now: Epoch,
        snapshot: &CorrectionSnapshot,
        tropo_grid: &TropoGrid,
    ) -> Result<EpochBatch, Error> {
        let mut batch = EpochBatch {
            epoch: now,
            ..Default::default()
        };

        let tropo = TroposphereModel::new(tropo_grid);

        // fresh VTEC or a zero ionosphere term, reported once per epoch
        let iono = snapshot.vtec.as_ref().map(IonosphereModel::new);
        let iono = match iono {
            Some(model) => match model.freshness(now) {
                Ok(()) => Some(model),
                Err(e) => {
                    warn!("{} - ionosphere disabled: {}", now, e);
                    None
                }
            },
            None => {
                warn!("{} - ionosphere disabled: no vtec model", now);
                None
            }
        };

        for selection in &self.selections {
            let Some(caps) = ConstellationCapabilities::from_constellation(selection.constellation)
            else {
                warn!("{} - {} is not served", now, selection.constellation);
                continue;
            };

            let mut qualified = 0;

            for prn in 1..=caps.max_prn {
                let sv = SV::new(selection.constellation, prn);
                if caps.is_excluded_geo(sv) {
                    continue;
                }

                match self.synthesize_sv(now, sv, selection, &caps, snapshot, &iono, &tropo) {
                    Ok(observations) => {
                        qualified += 1;
                        batch.observations.extend(observations);
                    },
                    Err(Error::BelowElevationMask) => {
                        debug!("{}({}) - below elevation mask", now, sv);
                    },
                    Err(Error::IodMismatch) => {
                        warn!(
                            "{}({}) - no ephemeris for orbit iod (retained: {:?})",
                            now,
                            sv,
                            snapshot.ephemerides.retained_iodes(sv)
                        );
                    },
                    Err(Error::DegenerateRange) => {
                        warn!("{}({}) - degenerate range, excluded", now, sv);
                    },
                    Err(e) => {
                        debug!("{}({}) - skipped: {}", now, sv, e);
                    },
                }
            }

            debug!(
                "{} - {}: {} vehicles qualified",
                now, selection.constellation, qualified
            );
        }

        let satellites = batch.satellite_count();
        if satellites < MIN_SATELLITES {
            return Err(Error::InsufficientSatellites {
                qualified: satellites,
            });
        }

        Ok(batch)
    }

    /// One vehicle through the full qualification and synthesis chain.
    #[allow(clippy::too_many_arguments)]
    fn synthesize_sv(
        &self,
        now: Epoch,
        sv: SV,
        selection: &ConstellationSelection,
        caps: &ConstellationCapabilities,
        snapshot: &CorrectionSnapshot,
        iono: &Option<IonosphereModel>,
        tropo: &TroposphereModel,
    ) -> Result<Vec<ObservationRecord>, Error> {
        let orbit = snapshot.ssr.select_orbit(sv, now)?;
        let clock = snapshot.ssr.select_clock(sv, now)?;

        let primary = *selection.signals.first().ok_or(Error::NoSignalSelected)?;
        let primary_bias_m = snapshot
            .code_biases
            .value(sv, primary)
            .ok_or(Error::MissingBias)?;

        let ephemeris = snapshot
            .ephemerides
            .matching_iod(sv, orbit.iod)
            .ok_or(Error::IodMismatch)?;
        ephemeris.usability(now)?;

        let state =
            EphemerisPropagator::new(now, orbit, clock, ephemeris, *caps).resolve(self.user_ecef_m);

        let range_m = (self.user_ecef_m - state.precise_position_ecef_m).norm();
        if range_m.is_nan() {
            return Err(Error::DegenerateRange);
        }

        let azel = ElevationAzimuth::new(self.user_ecef_m, state.precise_position_ecef_m);
        if azel.elevation_rad < self.elevation_mask_rad {
            return Err(Error::BelowElevationMask);
        }

        let f1_hz = caps.f1.frequency_hz();
        let iono_primary_m = iono
            .as_ref()
            .map(|model| model.slant_delay_m(now, self.user_ecef_m, &azel, f1_hz))
            .unwrap_or(0.0);

        let tropo_m = tropo.slant_delay_m(now, self.user_ecef_m, azel.elevation_rad);

        let snr_0p25_dbhz = synthetic_snr(azel.elevation_rad);
        let geometric_m = range_m - state.clock_bias_m() + tropo_m;

        let mut observations = Vec::with_capacity(selection.signals.len());

        for &signal in &selection.signals {
            let bias_m = if signal == primary {
                primary_bias_m
            } else {
                // secondary signal rides along only when its bias exists
                match snapshot.code_biases.value(sv, signal) {
                    Some(value) => value,
                    None => {
                        debug!("{}({}) - no {} bias, signal dropped", now, sv, signal);
                        continue;
                    },
                }
            };

            let f_signal = signal.carrier().frequency_hz();
            let iono_m = IonosphereModel::scale_to_frequency(iono_primary_m, f1_hz, f_signal);

            // group delay is broadcast against the primary frequency
            let tgd_shift_m = if (f_signal - f1_hz).abs() > 1.0 {
                (ephemeris.tgd_scaled_s(f1_hz, f_signal) - ephemeris.tgd_s) * SPEED_OF_LIGHT_M_S
            } else {
                0.0
            };

            observations.push(ObservationRecord {
                sv,
                signal,
                pseudorange_m: geometric_m + bias_m + iono_m + tgd_shift_m,
                snr_0p25_dbhz,
            });
        }

        debug!(
            "{}({}) - el: {:.1}° iono: {:.3} m tropo: {:.3} m",
            now,
            sv,
            azel.elevation_rad.to_degrees(),
            iono_primary_m,
            tropo_m
        );

        Ok(observations)
    }
}

/// Elevation-shaped synthetic SNR, in 0.25 dB-Hz units: ramps from
/// 41 dB-Hz at the horizon, saturating at 50 dB-Hz.
fn synthetic_snr(elevation_rad: f64) -> u16 {
    let steps = (72.0 * elevation_rad / (3.0 * std::f64::consts::PI)).floor() as i64 + 41;
    ((steps * 4).min(200)) as u16
}

#[cfg(test)]
mod test {
    use super::{synthetic_snr, ConstellationSelection, EpochBatch, ObservationRecord};
    use crate::prelude::{Constellation, SignalCode, SV};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn snr_shaping() {
        // horizon floor at 41 dB-Hz
        assert_eq!(synthetic_snr(0.0), 164);
        // zenith saturates at 50 dB-Hz
        assert_eq!(synthetic_snr(FRAC_PI_2), 200);
        // monotonic in between
        assert!(synthetic_snr(0.5) < synthetic_snr(1.0));
    }

    #[test]
    fn batch_grouping() {
        let mut batch = EpochBatch::default();
        for (constellation, prn) in [
            (Constellation::GPS, 4),
            (Constellation::GPS, 9),
            (Constellation::Galileo, 11),
        ] {
            for signal in [SignalCode::C1C, SignalCode::C2W] {
                batch.observations.push(ObservationRecord {
                    sv: SV::new(constellation, prn),
                    signal,
                    pseudorange_m: 2.2E7,
                    snr_0p25_dbhz: 180,
                });
            }
        }

        assert_eq!(batch.satellite_count(), 3);
        assert_eq!(batch.for_constellation(Constellation::GPS).len(), 4);
        assert_eq!(batch.for_constellation(Constellation::Galileo).len(), 2);
        assert!(batch.for_constellation(Constellation::BeiDou).is_empty());

        assert_eq!(
            batch.counts_by_constellation(),
            vec![(Constellation::GPS, 2), (Constellation::Galileo, 1)]
        );
    }

    #[test]
    fn selection_primary_first() {
        let selection = ConstellationSelection::new(
            Constellation::GPS,
            vec![SignalCode::C1C, SignalCode::C2W],
        );
        assert_eq!(selection.signals[0], SignalCode::C1C);
    }
}
