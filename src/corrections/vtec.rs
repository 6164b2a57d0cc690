use crate::prelude::Epoch;

/// Spherical-harmonic VTEC model, replaced wholesale on each update
/// from the SSR stream. Coefficient matrices are indexed
/// `[degree][order]` with `order <= degree`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VtecCorrection {
    /// Model reference epoch (GPST)
    pub epoch: Epoch,

    /// Ionospheric single-layer height (meters)
    pub height_m: f64,

    /// Spherical harmonic degree N
    pub degree: usize,

    /// Spherical harmonic order M
    pub order: usize,

    /// Cosine coefficients, (N+1) × (M+1), TECU
    pub cos_coefficients: Vec<Vec<f64>>,

    /// Sine coefficients, (N+1) × (M+1), TECU
    pub sin_coefficients: Vec<Vec<f64>>,
}

impl VtecCorrection {
    /// Constant-VTEC model (degree/order 0), mostly useful in tests
    /// and as a smoke product.
    pub fn uniform(epoch: Epoch, height_m: f64, tecu: f64) -> Self {
        Self {
            epoch,
            height_m,
            degree: 0,
            order: 0,
            cos_coefficients: vec![vec![tecu]],
            sin_coefficients: vec![vec![0.0]],
        }
    }
}
