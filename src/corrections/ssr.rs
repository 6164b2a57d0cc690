use std::collections::HashMap;

use nalgebra::Vector3;

use crate::{
    constants::SSR_STALENESS_S,
    error::CorrectionKind,
    prelude::{Duration, Epoch, Error, SV},
};

/// Retained SSR correction versions per vehicle, newest first.
pub(crate) const MAX_SSR_VERSIONS: usize = 3;

/// Per-vehicle SSR orbit correction: position delta and delta-rate in
/// the radial/along-track/cross-track frame, tied to one broadcast
/// ephemeris version through its IOD.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct OrbitCorrection {
    /// [SV]
    pub sv: SV,

    /// IOD of the [super::Ephemeris] this delta was computed against
    pub iod: u16,

    /// Correction reference epoch (GPST)
    pub epoch: Epoch,

    /// RAC position delta (meters)
    pub dx_rac_m: Vector3<f64>,

    /// RAC delta rate (m/s)
    pub dv_rac_m_s: Vector3<f64>,
}

/// Per-vehicle SSR clock correction, quadratic in time since the
/// reference epoch (seconds, s/s, s/s²). The polynomial evaluates in
/// meters of range in the SSR convention, divided by c downstream.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClockCorrection {
    /// [SV]
    pub sv: SV,

    /// IOD tag
    pub iod: u16,

    /// Correction reference epoch (GPST)
    pub epoch: Epoch,

    /// c0, c1, c2 polynomial coefficients
    pub coefficients: (f64, f64, f64),
}

impl ClockCorrection {
    /// Polynomial evaluated at `t` seconds past the reference epoch.
    pub(crate) fn evaluate(&self, dt_s: f64) -> f64 {
        let (c0, c1, c2) = self.coefficients;
        c0 + c1 * dt_s + c2 * dt_s * dt_s
    }
}

/// Versioned orbit/clock correction storage, newest version first.
/// Selection scans in retention order and keeps the first version
/// fresh enough, not the closest match.
#[derive(Debug, Clone, Default)]
pub struct SsrCorrections {
    orbits: HashMap<SV, Vec<OrbitCorrection>>,
    clocks: HashMap<SV, Vec<ClockCorrection>>,
}

impl SsrCorrections {
    /// Inserts a new orbit correction version for its vehicle.
    pub fn insert_orbit(&mut self, correction: OrbitCorrection) {
        let versions = self.orbits.entry(correction.sv).or_default();
        versions.insert(0, correction);
        versions.truncate(MAX_SSR_VERSIONS);
    }

    /// Inserts a new clock correction version for its vehicle.
    pub fn insert_clock(&mut self, correction: ClockCorrection) {
        let versions = self.clocks.entry(correction.sv).or_default();
        versions.insert(0, correction);
        versions.truncate(MAX_SSR_VERSIONS);
    }

    /// Newest orbit correction within the staleness bound, or the age
    /// of the newest retained version on rejection.
    pub fn select_orbit(&self, sv: SV, now: Epoch) -> Result<&OrbitCorrection, Error> {
        Self::select(self.orbits.get(&sv), now, CorrectionKind::Orbit)
    }

    /// Newest clock correction within the staleness bound.
    pub fn select_clock(&self, sv: SV, now: Epoch) -> Result<&ClockCorrection, Error> {
        Self::select(self.clocks.get(&sv), now, CorrectionKind::Clock)
    }

    fn select<T: Versioned>(
        versions: Option<&Vec<T>>,
        now: Epoch,
        kind: CorrectionKind,
    ) -> Result<&T, Error> {
        let versions = versions.ok_or(Error::StaleCorrection {
            kind,
            age: Duration::MAX,
        })?;

        versions
            .iter()
            .find(|version| (now - version.epoch()).to_seconds() < SSR_STALENESS_S)
            .ok_or_else(|| Error::StaleCorrection {
                kind,
                age: versions
                    .first()
                    .map(|v| now - v.epoch())
                    .unwrap_or(Duration::MAX),
            })
    }
}

trait Versioned {
    fn epoch(&self) -> Epoch;
}

impl Versioned for OrbitCorrection {
    fn epoch(&self) -> Epoch {
        self.epoch
    }
}

impl Versioned for ClockCorrection {
    fn epoch(&self) -> Epoch {
        self.epoch
    }
}

#[cfg(test)]
mod test {
    use super::{OrbitCorrection, SsrCorrections};
    use crate::prelude::{Constellation, Epoch, Error, TimeScale, SV};
    use hifitime::Unit;

    #[test]
    fn first_fresh_selection() {
        let sv = SV::new(Constellation::Galileo, 11);
        let t0 = Epoch::from_time_of_week(2290, 0, TimeScale::GPST);

        let mut ssr = SsrCorrections::default();
        for age_s in [400.0, 250.0, 100.0] {
            ssr.insert_orbit(OrbitCorrection {
                sv,
                iod: age_s as u16,
                epoch: t0 - age_s * Unit::Second,
                ..Default::default()
            });
        }

        // newest version (100 s old) matches first
        let selected = ssr.select_orbit(sv, t0).unwrap();
        assert_eq!(selected.iod, 100);

        // 250 s later, every retained version exceeds the bound
        assert!(matches!(
            ssr.select_orbit(sv, t0 + 250.0 * Unit::Second),
            Err(Error::StaleCorrection { .. })
        ));

        // unknown vehicle reports unavailable, not panic
        assert!(ssr
            .select_orbit(SV::new(Constellation::GPS, 1), t0)
            .is_err());
    }
}
