//! Empirical zenith troposphere from a global 2.5° coefficient grid,
//! with annual and semi-annual harmonics and a height expansion.
use log::debug;

use crate::{
    attitude::ecef_to_geodetic,
    constants::TROPO_GRID_SPACING_DEG,
    prelude::{Epoch, Error, Vector3},
};

use std::f64::consts::TAU;

/// Grid shape: parameter sets × height coefficients × lat × lon
const N_PARAMS: usize = 5;
const N_HEIGHT_COEFFS: usize = 6;
const N_LAT: usize = 73;
const N_LON: usize = 144;

/// Global 2.5° × 2.5° coefficient grid. For each node, 5 parameter
/// rows of 6 height-polynomial coefficients: the mean zenith delay,
/// then the annual/semi-annual cosine and sine amplitudes.
#[derive(Debug, Clone)]
pub struct TropoGrid {
    coefficients: Vec<f32>,
}

impl TropoGrid {
    /// Wraps a flat coefficient blob, ordered parameter-major then
    /// height coefficient, latitude, longitude.
    pub fn from_flat(coefficients: Vec<f32>) -> Result<Self, Error> {
        let expected = N_PARAMS * N_HEIGHT_COEFFS * N_LAT * N_LON;
        if coefficients.len() != expected {
            return Err(Error::TropoGridShape {
                expected,
                got: coefficients.len(),
            });
        }
        Ok(Self { coefficients })
    }

    /// Node value: parameter row, height coefficient, 1-based lat and
    /// lon node indices.
    fn node(&self, param: usize, coeff: usize, lat_node: usize, lon_node: usize) -> f64 {
        let index =
            ((param * N_HEIGHT_COEFFS + coeff) * N_LAT + (lat_node - 1)) * N_LON + (lon_node - 1);
        self.coefficients[index] as f64
    }

    /// Zenith delay (meters) at one grid node, for height `h_km` and
    /// annual phase `t_rad`.
    fn node_zenith_delay_m(&self, lat_node: usize, lon_node: usize, h_km: f64, t_rad: f64) -> f64 {
        // mean term: a₀·exp(Σ aₖ·hᵏ) + a₅
        let mut exponent = 0.0;
        for k in 1..=4 {
            exponent += self.node(0, k, lat_node, lon_node) * h_km.powi(k as i32);
        }
        let mean = self.node(0, 0, lat_node, lon_node) * exponent.exp()
            + self.node(0, 5, lat_node, lon_node);

        // four seasonal amplitudes, each a degree-5 height polynomial
        let mut amplitude = [0.0; 4];
        for (n, a) in amplitude.iter_mut().enumerate() {
            for k in 0..N_HEIGHT_COEFFS {
                *a += self.node(n + 1, k, lat_node, lon_node) * h_km.powi(k as i32);
            }
        }

        mean + amplitude[0] * t_rad.cos()
            + amplitude[1] * t_rad.sin()
            + amplitude[2] * (2.0 * t_rad).cos()
            + amplitude[3] * (2.0 * t_rad).sin()
    }
}

/// Zenith delay interpolation over a [TropoGrid], plus the flat-Earth
/// obliquity mapping to slant delay.
#[derive(Debug, Clone, Copy)]
pub struct TroposphereModel<'a> {
    grid: &'a TropoGrid,
}

impl<'a> TroposphereModel<'a> {
    pub fn new(grid: &'a TropoGrid) -> Self {
        Self { grid }
    }

    /// Bilinear zenith delay (meters) at `user_ecef_m` for the day of
    /// year of `now`.
    pub fn zenith_delay_m(&self, now: Epoch, user_ecef_m: Vector3<f64>) -> f64 {
        let (lat_rad, lon_rad, height_m) = ecef_to_geodetic(user_ecef_m);
        let lat_deg = lat_rad.to_degrees();
        let lon_deg = lon_rad.to_degrees();
        let h_km = height_m * 1E-3;

        // grid longitude runs westward from the prime meridian
        let grid_lon_deg = if lon_deg <= 0.0 {
            -lon_deg
        } else {
            360.0 - lon_deg
        };

        let ix = grid_lon_deg / TROPO_GRID_SPACING_DEG + 1.0;
        let iy = -(lat_deg - 90.0) / TROPO_GRID_SPACING_DEG + 1.0;

        let t_rad = TAU * now.day_of_year() / 365.25;

        // four surrounding nodes, eastward bit then southward row
        let lon_bit = [0, 1, 0, 1];
        let mut corner = [0.0; 4];
        for (i, y) in corner.iter_mut().enumerate() {
            let lon_node = (ix.trunc() as usize + lon_bit[i] - 1) % N_LON + 1;
            let lat_node = (iy.trunc() as usize + i / 2).min(N_LAT);
            *y = self.grid.node_zenith_delay_m(lat_node, lon_node, h_km, t_rad);
        }

        let p = ix - ix.trunc();
        let q = iy - iy.trunc();

        let zenith = (1.0 - p) * (1.0 - q) * corner[0]
            + (1.0 - q) * p * corner[1]
            + (1.0 - p) * q * corner[2]
            + p * q * corner[3];

        debug!("tropo - zenith: {:.3} m", zenith);
        zenith
    }

    /// Slant delay (meters) through the obliquity mapping
    /// 1.001 / √(0.002001 + sin²el).
    pub fn slant_delay_m(&self, now: Epoch, user_ecef_m: Vector3<f64>, elevation_rad: f64) -> f64 {
        let sin_el = elevation_rad.sin();
        self.zenith_delay_m(now, user_ecef_m) * 1.001 / (0.002001 + sin_el * sin_el).sqrt()
    }
}
