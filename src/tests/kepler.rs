use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::f64::consts::TAU;

use crate::propagator::kepler_anomaly;

#[test]
fn anomaly_residual_sweep() {
    // navigation-grade eccentricities across the full revolution
    let mut rng = SmallRng::seed_from_u64(0x0E57);

    for _ in 0..500 {
        let eccentricity = rng.random_range(0.0..0.05);
        let mean_anomaly = rng.random_range(0.0..TAU);

        let e_k = kepler_anomaly(eccentricity, mean_anomaly);
        let residual = e_k - eccentricity * e_k.sin() - mean_anomaly;

        assert!(
            residual.abs() < 1E-12,
            "e={eccentricity} M={mean_anomaly}: residual {residual}"
        );
    }
}

#[test]
fn anomaly_grows_with_eccentricity() {
    // first-quadrant M: E > M for any e > 0
    let m = 1.0;
    let mut previous = kepler_anomaly(0.0, m);

    for e in [0.001, 0.01, 0.02, 0.03] {
        let e_k = kepler_anomaly(e, m);
        assert!(e_k > previous);
        previous = e_k;
    }
}
