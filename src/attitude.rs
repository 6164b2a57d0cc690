//! ECEF attitude helpers shared by the synthesizer and the
//! ionosphere pierce-point geometry.
use nalgebra::Vector3;

use crate::constants::{EARTH_FLATTENING_WGS84, EARTH_SEMI_MAJOR_AXIS_WGS84};

/// Elevation/azimuth pair of a vehicle seen from the user position,
/// with respect to a spherical local frame (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationAzimuth {
    pub elevation_rad: f64,
    pub azimuth_rad: f64,
}

/// ECEF (m) to geodetic (lat rad, lon rad, ellipsoidal height m),
/// fixed-point iteration on the WGS84 ellipsoid.
pub(crate) fn ecef_to_geodetic(r: Vector3<f64>) -> (f64, f64, f64) {
    let e2 = EARTH_FLATTENING_WGS84 * (2.0 - EARTH_FLATTENING_WGS84);
    let r2 = r[0] * r[0] + r[1] * r[1];

    let mut z = r[2];
    let mut zk = 0.0_f64;
    let mut v = EARTH_SEMI_MAJOR_AXIS_WGS84;

    while (z - zk).abs() >= 1E-4 {
        zk = z;
        let sinp = z / (r2 + z * z).sqrt();
        v = EARTH_SEMI_MAJOR_AXIS_WGS84 / (1.0 - e2 * sinp * sinp).sqrt();
        z = r[2] + v * e2 * sinp;
    }

    let lat = if r2 > 1E-12 {
        (z / r2.sqrt()).atan()
    } else if r[2] > 0.0 {
        std::f64::consts::FRAC_PI_2
    } else {
        -std::f64::consts::FRAC_PI_2
    };

    let lon = if r2 > 1E-12 { r[1].atan2(r[0]) } else { 0.0 };
    let height = (r2 + z * z).sqrt() - v;

    (lat, lon, height)
}

/// Rotates an ECEF offset into the local North/East/Up frame at
/// (lat, lon) radians.
pub(crate) fn ecef_to_neu(lat: f64, lon: f64, xyz: Vector3<f64>) -> Vector3<f64> {
    let (sin_phi, cos_phi) = lat.sin_cos();
    let (sin_lam, cos_lam) = lon.sin_cos();

    Vector3::new(
        -sin_phi * cos_lam * xyz[0] - sin_phi * sin_lam * xyz[1] + cos_phi * xyz[2],
        -sin_lam * xyz[0] + cos_lam * xyz[1],
        cos_phi * cos_lam * xyz[0] + cos_phi * sin_lam * xyz[1] + sin_phi * xyz[2],
    )
}

impl ElevationAzimuth {
    /// Elevation and azimuth of `sat_ecef_m` seen from `user_ecef_m`,
    /// through a plain ECEF→NEU rotation (no ellipsoidal correction of
    /// the line of sight).
    pub fn new(user_ecef_m: Vector3<f64>, sat_ecef_m: Vector3<f64>) -> Self {
        let rho_v = sat_ecef_m - user_ecef_m;
        let rho = rho_v.norm();

        let (lat, lon, _) = ecef_to_geodetic(user_ecef_m);
        let neu = ecef_to_neu(lat, lon, rho_v);

        let mut elevation_rad = ((neu[0] * neu[0] + neu[1] * neu[1]).sqrt() / rho).acos();
        if neu[2] < 0.0 {
            elevation_rad = -elevation_rad;
        }

        Self {
            elevation_rad,
            azimuth_rad: neu[1].atan2(neu[0]),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ecef_to_geodetic, ElevationAzimuth};
    use nalgebra::Vector3;

    #[test]
    fn geodetic_equator() {
        let (lat, lon, h) = ecef_to_geodetic(Vector3::new(6378137.0, 0.0, 0.0));
        assert!(lat.abs() < 1E-9);
        assert!(lon.abs() < 1E-9);
        assert!(h.abs() < 1E-3);
    }

    #[test]
    fn zenith_vehicle() {
        // user on the equator, vehicle 20000 km straight up
        let user = Vector3::new(6378137.0, 0.0, 0.0);
        let sat = Vector3::new(26378137.0, 0.0, 0.0);
        let elaz = ElevationAzimuth::new(user, sat);
        assert!((elaz.elevation_rad - std::f64::consts::FRAC_PI_2).abs() < 1E-6);
    }

    #[test]
    fn horizon_vehicle() {
        let user = Vector3::new(6378137.0, 0.0, 0.0);
        // due north, same radius: close to the horizon
        let sat = Vector3::new(6378137.0, 0.0, 20200_000.0);
        let elaz = ElevationAzimuth::new(user, sat);
        assert!(elaz.elevation_rad < 0.5);
        assert!(elaz.azimuth_rad.abs() < 1E-6); // due north
    }
}
