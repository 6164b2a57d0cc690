use std::collections::HashMap;

use crate::{
    constants::EPHEMERIS_STALENESS_S,
    prelude::{Duration, Epoch, Error, SV},
};

/// Retained ephemeris versions per vehicle, newest first.
pub(crate) const MAX_EPHEMERIS_VERSIONS: usize = 10;

/// Broadcast orbital elements, one version as decoded from the
/// navigation message. Immutable once received; superseded versions
/// are retained (up to [MAX_EPHEMERIS_VERSIONS]) so SSR corrections
/// referencing an older IODE stay usable.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Ephemeris {
    /// [SV]
    pub sv: SV,

    /// GPS week number
    pub week: u32,

    /// Time of Ephemeris (GPST)
    pub toe: Epoch,

    /// Time of Clock (GPST)
    pub toc: Epoch,

    /// ToE in seconds of week, as broadcast
    pub toe_seconds_of_week: f64,

    /// Clock bias (s), drift (s/s), drift rate (s/s²)
    pub af: (f64, f64, f64),

    /// Mean anomaly at reference time (radians)
    pub m0_rad: f64,

    /// Eccentricity
    pub eccentricity: f64,

    /// Mean motion difference (radians/s)
    pub delta_n_rad_s: f64,

    /// Square root of semi-major axis (√m)
    pub sqrt_a: f64,

    /// Longitude of ascending node (radians)
    pub omega0_rad: f64,

    /// Inclination at reference time (radians)
    pub i0_rad: f64,

    /// Argument of perigee (radians)
    pub omega_rad: f64,

    /// Rate of right ascension (radians/s)
    pub omega_dot_rad_s: f64,

    /// Rate of inclination (radians/s)
    pub idot_rad_s: f64,

    /// Sine / Cosine argument-of-latitude corrections (radians)
    pub cus_cuc_rad: (f64, f64),

    /// Sine / Cosine inclination corrections (radians)
    pub cis_cic_rad: (f64, f64),

    /// Sine / Cosine radius corrections (meters)
    pub crs_crc_m: (f64, f64),

    /// Group delay, L1-referenced (seconds).
    /// BDS: TGD1 B1/B3, GAL: BGD E5a/E1.
    pub tgd_s: f64,

    /// Second group delay (seconds).
    /// BDS: TGD2 B2/B3, GAL: BGD E5b/E1.
    pub tgd2_s: f64,

    /// SV health flag, 0 = usable
    pub health: u32,

    /// Issue of Data, Ephemeris
    pub iode: u16,

    /// Issue of Data, Clock
    pub iodc: u16,

    /// SV accuracy (meters)
    pub sv_accuracy_m: f64,
}

impl Ephemeris {
    /// Verifies health flag and clock-epoch fit interval against `now`.
    pub fn usability(&self, now: Epoch) -> Result<(), Error> {
        if self.health != 0 {
            return Err(Error::EphemerisUnhealthy);
        }

        let dtoc = now - self.toc;
        if dtoc.abs() > Duration::from_seconds(EPHEMERIS_STALENESS_S) {
            return Err(Error::EphemerisStale(dtoc));
        }

        Ok(())
    }

    /// Group delay scaled to the secondary frequency:
    /// tgd₂ = (f₁/f₂)² · tgd
    pub fn tgd_scaled_s(&self, f1_hz: f64, f2_hz: f64) -> f64 {
        (f1_hz / f2_hz).powi(2) * self.tgd_s
    }
}

/// Versioned ephemeris storage, newest version first per vehicle.
#[derive(Debug, Clone, Default)]
pub struct EphemerisSet {
    inner: HashMap<SV, Vec<Ephemeris>>,
}

impl EphemerisSet {
    /// Inserts a freshly decoded version for its vehicle; oldest
    /// retained version is discarded past [MAX_EPHEMERIS_VERSIONS].
    pub fn insert(&mut self, ephemeris: Ephemeris) {
        let versions = self.inner.entry(ephemeris.sv).or_default();
        versions.insert(0, ephemeris);
        versions.truncate(MAX_EPHEMERIS_VERSIONS);
    }

    /// Newest retained version for this vehicle.
    pub fn latest(&self, sv: SV) -> Option<&Ephemeris> {
        self.inner.get(&sv)?.first()
    }

    /// Version whose IODE matches the SSR orbit correction tag,
    /// scanning newest first.
    pub fn matching_iod(&self, sv: SV, iod: u16) -> Option<&Ephemeris> {
        self.inner
            .get(&sv)?
            .iter()
            .find(|ephemeris| ephemeris.iode == iod)
    }

    /// Retained IODEs for this vehicle (newest first), for diagnostics.
    pub fn retained_iodes(&self, sv: SV) -> Vec<u16> {
        self.inner
            .get(&sv)
            .map(|versions| versions.iter().map(|e| e.iode).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::{Ephemeris, EphemerisSet, MAX_EPHEMERIS_VERSIONS};
    use crate::prelude::{Constellation, Epoch, Error, TimeScale, SV};
    use hifitime::Unit;

    fn eph(sv: SV, iode: u16) -> Ephemeris {
        Ephemeris {
            sv,
            iode,
            ..Default::default()
        }
    }

    #[test]
    fn version_retention() {
        let sv = SV::new(Constellation::GPS, 7);
        let mut set = EphemerisSet::default();

        for iode in 0..15 {
            set.insert(eph(sv, iode));
        }

        assert_eq!(set.latest(sv).unwrap().iode, 14);
        assert_eq!(set.retained_iodes(sv).len(), MAX_EPHEMERIS_VERSIONS);

        // oldest versions discarded
        assert!(set.matching_iod(sv, 2).is_none());
        assert!(set.matching_iod(sv, 5).is_some());
    }

    #[test]
    fn usability_window() {
        let toc = Epoch::from_time_of_week(2290, 345_600 * 1_000_000_000, TimeScale::GPST);

        let mut ephemeris = eph(SV::new(Constellation::GPS, 1), 33);
        ephemeris.toc = toc;

        assert!(ephemeris.usability(toc + 7200.0 * Unit::Second).is_ok());
        assert!(matches!(
            ephemeris.usability(toc + 7500.0 * Unit::Second),
            Err(Error::EphemerisStale(_))
        ));

        ephemeris.health = 1;
        assert_eq!(ephemeris.usability(toc), Err(Error::EphemerisUnhealthy));
    }
}
