//! Slant ionospheric delay from the SSR spherical-harmonic VTEC model.
use log::debug;

use crate::{
    attitude::{ecef_to_geodetic, ElevationAzimuth},
    constants::{IONO_MEAN_EARTH_RADIUS_M, TECU_TO_DELAY_M_HZ2, VTEC_STALENESS_S},
    error::CorrectionKind,
    prelude::{Epoch, Error, Vector3, VtecCorrection},
};

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Sun-fixed longitude pivot: 14h00 local, in seconds of day
const SUN_FIXED_PIVOT_S: f64 = 50_400.0;

/// Slant ionospheric code delay evaluated from one [VtecCorrection]:
/// single-layer pierce point, Sun-fixed longitude, normalized
/// associated Legendre expansion, thin-shell obliquity.
#[derive(Debug, Clone, Copy)]
pub struct IonosphereModel<'a> {
    vtec: &'a VtecCorrection,
}

impl<'a> IonosphereModel<'a> {
    pub fn new(vtec: &'a VtecCorrection) -> Self {
        Self { vtec }
    }

    /// Verifies the model reference epoch against `now`.
    pub fn freshness(&self, now: Epoch) -> Result<(), Error> {
        let age = now - self.vtec.epoch;
        if age.to_seconds().abs() > VTEC_STALENESS_S {
            return Err(Error::StaleCorrection {
                kind: CorrectionKind::Vtec,
                age,
            });
        }
        Ok(())
    }

    /// Slant group delay (meters) on frequency `f1_hz`, for one user
    /// position and one line of sight.
    pub fn slant_delay_m(
        &self,
        now: Epoch,
        user_ecef_m: Vector3<f64>,
        azel: &ElevationAzimuth,
        f1_hz: f64,
    ) -> f64 {
        let (lat_rad, lon_rad, _) = ecef_to_geodetic(user_ecef_m);
        let el = azel.elevation_rad;
        let az = azel.azimuth_rad;

        // single-layer pierce point
        let shell_radius = IONO_MEAN_EARTH_RADIUS_M + self.vtec.height_m;
        let q = user_ecef_m.norm() / shell_radius;
        let psi = FRAC_PI_2 - el - (q * el.cos()).asin();

        let lat_pp = (lat_rad.sin() * psi.cos() + lat_rad.cos() * psi.sin() * az.cos()).asin();

        // pole crossing check
        let crosses_pole = (lat_rad > 0.0
            && psi.tan() * az.cos() > (FRAC_PI_2 - lat_rad).tan())
            || (lat_rad < 0.0 && -psi.tan() * az.cos() > (FRAC_PI_2 + lat_rad).tan());

        let dlon = (psi.sin() * az.sin() / lat_pp.cos()).asin();
        let lon_pp = if crosses_pole {
            lon_rad + PI - dlon
        } else {
            lon_rad + dlon
        };

        // Sun-fixed longitude of the pierce point
        let seconds_of_day = gpst_seconds_of_day(now);
        let lon_s = (lon_pp + (seconds_of_day - SUN_FIXED_PIVOT_S) * PI / 43_200.0) % TAU;

        let vtec = self.evaluate_tecu(lat_pp, lon_s);

        // thin-shell obliquity
        let stec = vtec / (el + psi).sin();
        let delay = stec * TECU_TO_DELAY_M_HZ2 / (f1_hz * f1_hz);

        debug!(
            "iono - vtec: {:.2} TECu stec: {:.2} TECu delay: {:.3} m",
            vtec, stec, delay
        );

        delay
    }

    /// Scales a delay from `f1_hz` to `f2_hz`: d₂ = d₁·(f₁/f₂)².
    pub fn scale_to_frequency(delay_f1_m: f64, f1_hz: f64, f2_hz: f64) -> f64 {
        delay_f1_m * (f1_hz / f2_hz).powi(2)
    }

    /// Spherical harmonic expansion at the pierce point, clamped to
    /// non-negative TECu.
    fn evaluate_tecu(&self, lat_pp_rad: f64, lon_s_rad: f64) -> f64 {
        let t = lat_pp_rad.sin();
        let mut vtec = 0.0;

        for n in 0..=self.vtec.degree {
            for m in 0..=n.min(self.vtec.order) {
                let (sin_ml, cos_ml) = (m as f64 * lon_s_rad).sin_cos();
                let harmonic = self.vtec.cos_coefficients[n][m] * cos_ml
                    + self.vtec.sin_coefficients[n][m] * sin_ml;
                vtec += harmonic * normalized_legendre(n, m, t);
            }
        }

        vtec.max(0.0)
    }
}

/// GPS seconds of day at `now`.
fn gpst_seconds_of_day(now: Epoch) -> f64 {
    let (_, tow_ns) = now.to_time_of_week();
    (tow_ns as f64 * 1E-9) % 86_400.0
}

/// Fully normalized associated Legendre function P̃nm(t), via the
/// closed-form sum. Degrees in the VTEC product stay small (≤16), well
/// inside f64 factorial range.
fn normalized_legendre(n: usize, m: usize, t: f64) -> f64 {
    let mut sum = 0.0;
    for k in 0..=((n - m) / 2) {
        sum += (-1.0_f64).powi(k as i32) * factorial(2 * n - 2 * k)
            / (factorial(k) * factorial(n - k) * factorial(n - m - 2 * k))
            * t.powi((n - m - 2 * k) as i32);
    }

    let unnormalized = 0.5_f64.powi(n as i32) * (1.0 - t * t).powf(m as f64 / 2.0) * sum;

    let norm = if m == 0 {
        (2.0 * n as f64 + 1.0).sqrt()
    } else {
        (2.0 * (2.0 * n as f64 + 1.0) * factorial(n - m) / factorial(n + m)).sqrt()
    };

    norm * unnormalized
}

fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

#[cfg(test)]
mod test {
    use super::{factorial, normalized_legendre, IonosphereModel};
    use crate::prelude::{Epoch, TimeScale, Vector3, VtecCorrection};
    use crate::tests::init_logger;
    use hifitime::Unit;

    #[test]
    fn legendre_low_degrees() {
        // P̃00 = 1, P̃10 = √3·t, P̃11 = √3·√(1−t²)
        for t in [-0.9, -0.3, 0.0, 0.5, 0.99] {
            assert!((normalized_legendre(0, 0, t) - 1.0).abs() < 1E-12);
            assert!((normalized_legendre(1, 0, t) - 3.0_f64.sqrt() * t).abs() < 1E-12);
            assert!(
                (normalized_legendre(1, 1, t) - 3.0_f64.sqrt() * (1.0 - t * t).sqrt()).abs()
                    < 1E-12
            );
        }

        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(5), 120.0);
    }

    #[test]
    fn uniform_model_zenith() {
        init_logger();

        let t0 = Epoch::from_time_of_week(2290, 0, TimeScale::GPST);
        let vtec = VtecCorrection::uniform(t0, 450_000.0, 10.0);
        let model = IonosphereModel::new(&vtec);

        // straight-up geometry: obliquity factor collapses to 1
        let user = Vector3::new(6_378_137.0, 0.0, 0.0);
        let azel = crate::attitude::ElevationAzimuth {
            elevation_rad: std::f64::consts::FRAC_PI_2,
            azimuth_rad: 0.0,
        };

        let f1 = 1575.42E6;
        let delay = model.slant_delay_m(t0, user, &azel, f1);
        let expected = 10.0 * 40.3E16 / (f1 * f1);
        assert!((delay - expected).abs() < 1E-4, "delay {delay}");

        // quadratic frequency scaling
        let f2 = 1227.60E6;
        let scaled = IonosphereModel::scale_to_frequency(delay, f1, f2);
        assert!(scaled > delay);
        assert!((scaled / delay - (f1 / f2).powi(2)).abs() < 1E-12);
    }

    #[test]
    fn negative_vtec_clamped() {
        let t0 = Epoch::from_time_of_week(2290, 0, TimeScale::GPST);
        let vtec = VtecCorrection::uniform(t0, 450_000.0, -4.0);
        let model = IonosphereModel::new(&vtec);

        let user = Vector3::new(6_378_137.0, 0.0, 0.0);
        let azel = crate::attitude::ElevationAzimuth {
            elevation_rad: 0.8,
            azimuth_rad: 1.0,
        };

        assert_eq!(model.slant_delay_m(t0, user, &azel, 1575.42E6), 0.0);
    }

    #[test]
    fn staleness_window() {
        let t0 = Epoch::from_time_of_week(2290, 0, TimeScale::GPST);
        let vtec = VtecCorrection::uniform(t0, 450_000.0, 5.0);
        let model = IonosphereModel::new(&vtec);

        assert!(model.freshness(t0 + 300.0 * Unit::Second).is_ok());
        assert!(model.freshness(t0 + 700.0 * Unit::Second).is_err());
    }
}
