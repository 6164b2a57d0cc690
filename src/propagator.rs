//! Broadcast + SSR orbit/clock propagation at solved transmission time.
use hifitime::Unit;
use log::debug;
use nalgebra::Vector3;

use crate::{
    constants::{EARTH_ANGULAR_VEL_RAD, SPEED_OF_LIGHT_M_S},
    prelude::{ClockCorrection, ConstellationCapabilities, Ephemeris, Epoch, OrbitCorrection},
};

/// Kepler equation Newton-Raphson tolerance (radians)
const KEPLER_TOLERANCE_RAD: f64 = 1E-13;

/// Kepler equation iteration cap
const KEPLER_MAX_ITER: usize = 25;

/// Transmission-time solver convergence threshold (seconds)
const TAU_TOLERANCE_S: f64 = 1E-10;

/// Transmission-time solver iteration cap
const TAU_MAX_ITER: usize = 20;

/// sin(-5°), cos(-5°): BeiDou GEO orbital plane tilt
const SIN_NEG_5_DEG: f64 = -0.0871557427476582;
const COS_NEG_5_DEG: f64 = 0.9961946980917456;

/// Fully propagated vehicle state at its solved transmission time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagatedState {
    /// Broadcast-only ECEF position, Earth-rotation corrected (m)
    pub broadcast_position_ecef_m: Vector3<f64>,

    /// SSR-corrected ECEF position, Earth-rotation corrected (m)
    pub precise_position_ecef_m: Vector3<f64>,

    /// SSR-corrected ECEF position at transmit time, before the
    /// Earth-rotation correction (m)
    pub position_at_tx_ecef_m: Vector3<f64>,

    /// ECEF velocity at transmit time (m/s)
    pub velocity_ecef_m_s: Vector3<f64>,

    /// Total clock bias (s), signed so that
    /// pseudorange = range − clock_bias·c
    pub clock_bias_s: f64,

    /// Solved transmission [Epoch]
    pub tx_epoch: Epoch,

    /// Signal propagation time, τ + clock bias (s)
    pub propagation_time_s: f64,
}

impl PropagatedState {
    /// Clock bias in meters of range.
    pub fn clock_bias_m(&self) -> f64 {
        self.clock_bias_s * SPEED_OF_LIGHT_M_S
    }
}

/// One-shot propagator: broadcast Kepler elements plus SSR orbit and
/// clock deltas, resolved at the transmission time solved against one
/// user position. Degenerate user/vehicle geometry (zero range) is
/// excluded upstream by the caller's masks; the solver assumes a
/// physically sensible pair.
#[derive(Debug, Clone, Copy)]
pub struct EphemerisPropagator<'a> {
    /// Reception [Epoch] (GPST)
    rx_epoch: Epoch,

    /// SSR orbit delta
    orbit: &'a OrbitCorrection,

    /// SSR clock polynomial
    clock: &'a ClockCorrection,

    /// Matched broadcast [Ephemeris] version
    ephemeris: &'a Ephemeris,

    /// Constellation parameter table
    caps: ConstellationCapabilities,
}

/// Broadcast orbital state at one transmit epoch.
struct KeplerState {
    position_m: Vector3<f64>,
    velocity_m_s: Vector3<f64>,
    sin_eccentric_anomaly: f64,
}

impl<'a> EphemerisPropagator<'a> {
    pub fn new(
        rx_epoch: Epoch,
        orbit: &'a OrbitCorrection,
        clock: &'a ClockCorrection,
        ephemeris: &'a Ephemeris,
        caps: ConstellationCapabilities,
    ) -> Self {
        Self {
            rx_epoch,
            orbit,
            clock,
            ephemeris,
            caps,
        }
    }

    /// Solves the transmission time against `user_ecef_m` and returns
    /// the propagated state. Newton iteration on the range residual:
    /// range(user, sat(t_rx − τ)) + sagnac(τ) = c·(τ + clock), with
    /// the full orbit/clock computation re-evaluated at each updated
    /// transmit time.
    pub fn resolve(&self, user_ecef_m: Vector3<f64>) -> PropagatedState {
        let eph = self.ephemeris;
        let omega_e = self.caps.omega_earth_rad_s;
        let relativistic_f = self.caps.relativistic_f();

        // initial guess: MEO shell distance over c
        let mut tau_s = 2.5E7 / SPEED_OF_LIGHT_M_S;

        let mut clock_bias_s = 0.0;
        let mut state = KeplerState {
            position_m: Vector3::zeros(),
            velocity_m_s: Vector3::zeros(),
            sin_eccentric_anomaly: 0.0,
        };
        let mut precise_m = Vector3::zeros();

        for _ in 0..TAU_MAX_ITER {
            let mut tx_epoch = self.rx_epoch - tau_s * Unit::Second;

            // broadcast clock polynomial at transmit time, group delay
            // referenced to the primary frequency
            let dt_toc = (tx_epoch - eph.toc).to_seconds();
            let (af0, af1, af2) = eph.af;
            let mut dt_clk = af0 + af1 * dt_toc + af2 * dt_toc * dt_toc - eph.tgd_s;

            // SSR clock polynomial (meters of range over c)
            let dt_ssr = (tx_epoch - self.clock.epoch).to_seconds();
            let dt_clk_precise = self.clock.evaluate(dt_ssr) / SPEED_OF_LIGHT_M_S;

            tx_epoch = tx_epoch - dt_clk * Unit::Second;

            state = self.kepler_state(tx_epoch);

            // relativistic clock correction F·e·√A·sin(E)
            dt_clk += relativistic_f * eph.eccentricity * eph.sqrt_a * state.sin_eccentric_anomaly;

            // SSR orbit delta, linearized at transmit time, rotated
            // RAC → ECEF and subtracted from the broadcast position
            let dt_orbit = (tx_epoch - self.orbit.epoch).to_seconds();
            let drac = self.orbit.dx_rac_m + self.orbit.dv_rac_m_s * dt_orbit;
            precise_m = state.position_m - rac_to_ecef(drac, state.position_m, state.velocity_m_s);

            dt_clk += dt_clk_precise;
            clock_bias_s = dt_clk;

            let range_v = precise_m - user_ecef_m;
            let range = range_v.norm();

            let sagnac = omega_e * (precise_m[0] * user_ecef_m[1] - precise_m[1] * user_ecef_m[0])
                / SPEED_OF_LIGHT_M_S;

            // residual and its derivative along τ
            let h = range + sagnac - (tau_s + dt_clk) * SPEED_OF_LIGHT_M_S;
            let dh_dt = -state.velocity_m_s.dot(&range_v) / range
                - omega_e / SPEED_OF_LIGHT_M_S
                    * (state.velocity_m_s[0] * user_ecef_m[1]
                        - state.velocity_m_s[1] * user_ecef_m[0])
                - SPEED_OF_LIGHT_M_S;

            let tau_next = tau_s - h / dh_dt;
            let converged = (tau_next - tau_s).abs() < TAU_TOLERANCE_S;
            tau_s = tau_next;

            if converged {
                break;
            }
        }

        let position_at_tx = precise_m;
        let tx_epoch = self.rx_epoch - tau_s * Unit::Second;
        let propagation_time_s = tau_s + clock_bias_s;

        debug!(
            "{}({}) - tau: {:.9} s clock: {:.3} m",
            tx_epoch,
            eph.sv,
            tau_s,
            clock_bias_s * SPEED_OF_LIGHT_M_S
        );

        PropagatedState {
            broadcast_position_ecef_m: earth_rotation(state.position_m, propagation_time_s),
            precise_position_ecef_m: earth_rotation(precise_m, propagation_time_s),
            position_at_tx_ecef_m: position_at_tx,
            velocity_ecef_m_s: state.velocity_m_s,
            clock_bias_s,
            tx_epoch,
            propagation_time_s,
        }
    }

    /// Broadcast Kepler elements resolved at `tx_epoch`: in-plane
    /// position with second-harmonic corrections, rotated to ECEF
    /// (generic, or the BeiDou GEO 5° tilt sequence).
    fn kepler_state(&self, tx_epoch: Epoch) -> KeplerState {
        let eph = self.ephemeris;
        let omega_e = self.caps.omega_earth_rad_s;

        let a = eph.sqrt_a * eph.sqrt_a;
        let e = eph.eccentricity;
        let t_k = (tx_epoch - eph.toe).to_seconds();

        let n0 = (self.caps.mu_m3_s2 / (a * a * a)).sqrt();
        let n = n0 + eph.delta_n_rad_s;
        let m_k = eph.m0_rad + n * t_k;

        let e_k = kepler_anomaly(e, m_k);
        let (sin_e_k, cos_e_k) = e_k.sin_cos();

        let v_k = ((1.0 - e * e).sqrt() * sin_e_k).atan2(cos_e_k - e);
        let phi_k = v_k + eph.omega_rad;
        let (sin_2phi, cos_2phi) = (2.0 * phi_k).sin_cos();

        let (cus, cuc) = eph.cus_cuc_rad;
        let (cis, cic) = eph.cis_cic_rad;
        let (crs, crc) = eph.crs_crc_m;

        let u_k = phi_k + cus * sin_2phi + cuc * cos_2phi;
        let r_k = a * (1.0 - e * cos_e_k) + crs * sin_2phi + crc * cos_2phi;
        let i_k = eph.i0_rad + cis * sin_2phi + cic * cos_2phi + eph.idot_rad_s * t_k;

        let (sin_u, cos_u) = u_k.sin_cos();
        let (sin_i, cos_i) = i_k.sin_cos();

        // in-plane coordinates
        let x_p = r_k * cos_u;
        let y_p = r_k * sin_u;

        let geo = self.caps.uses_geo_rotation(eph.sv);

        let (position_m, sin_om, cos_om) = if geo {
            // BeiDou GEO: node rotated without Earth-rate on t_k, then
            // tilted -5° and spun back through ω⊕·t_k
            let omega_k =
                eph.omega0_rad + eph.omega_dot_rad_s * t_k - omega_e * eph.toe_seconds_of_week;
            let (sin_om, cos_om) = omega_k.sin_cos();

            let xg = x_p * cos_om - y_p * cos_i * sin_om;
            let yg = x_p * sin_om + y_p * cos_i * cos_om;
            let zg = y_p * sin_i;

            let (sin_o, cos_o) = (omega_e * t_k).sin_cos();
            let position = Vector3::new(
                xg * cos_o + yg * sin_o * COS_NEG_5_DEG + zg * sin_o * SIN_NEG_5_DEG,
                -xg * sin_o + yg * cos_o * COS_NEG_5_DEG + zg * cos_o * SIN_NEG_5_DEG,
                -yg * SIN_NEG_5_DEG + zg * COS_NEG_5_DEG,
            );
            (position, sin_om, cos_om)
        } else {
            let omega_k = eph.omega0_rad + (eph.omega_dot_rad_s - omega_e) * t_k
                - omega_e * eph.toe_seconds_of_week;
            let (sin_om, cos_om) = omega_k.sin_cos();

            let position = Vector3::new(
                x_p * cos_om - y_p * cos_i * sin_om,
                x_p * sin_om + y_p * cos_i * cos_om,
                y_p * sin_i,
            );
            (position, sin_om, cos_om)
        };

        // analytic derivative chain (generic rotation terms)
        let e_k_dot = n / (1.0 - e * cos_e_k);
        let phi_k_dot = ((1.0 - e * e).sqrt() / (1.0 - e * cos_e_k)) * e_k_dot;
        let u_k_dot = (1.0 + 2.0 * cus * cos_2phi - 2.0 * cuc * sin_2phi) * phi_k_dot;
        let r_k_dot = 2.0 * (crs * cos_2phi - crc * sin_2phi) * phi_k_dot + a * e * sin_e_k * e_k_dot;
        let i_k_dot = 2.0 * (cis * cos_2phi - cic * sin_2phi) * phi_k_dot + eph.idot_rad_s;

        let x_p_dot = r_k_dot * cos_u - r_k * sin_u * u_k_dot;
        let y_p_dot = r_k_dot * sin_u + r_k * cos_u * u_k_dot;

        let omega_k_dot = eph.omega_dot_rad_s - omega_e;

        let velocity_m_s = Vector3::new(
            x_p_dot * cos_om - y_p_dot * cos_i * sin_om + y_p * sin_i * sin_om * i_k_dot
                - position_m[1] * omega_k_dot,
            x_p_dot * sin_om + y_p_dot * cos_i * cos_om - y_p * sin_i * cos_om * i_k_dot
                + position_m[0] * omega_k_dot,
            y_p_dot * sin_i + y_p * cos_i * i_k_dot,
        );

        KeplerState {
            position_m,
            velocity_m_s,
            sin_eccentric_anomaly: sin_e_k,
        }
    }
}

/// Solves E − e·sin(E) = M by Newton-Raphson, starting from M.
/// Bounded iteration: always terminates.
pub(crate) fn kepler_anomaly(eccentricity: f64, mean_anomaly_rad: f64) -> f64 {
    let mut e_k = mean_anomaly_rad;

    for _ in 0..KEPLER_MAX_ITER {
        let delta = (e_k - eccentricity * e_k.sin() - mean_anomaly_rad)
            / (1.0 - eccentricity * e_k.cos());
        e_k -= delta;
        if delta.abs() < KEPLER_TOLERANCE_RAD {
            break;
        }
    }

    e_k
}

/// Rotates an orbit delta from the radial/along-track/cross-track
/// frame to ECEF. Basis: along = v̂, cross = (p × v)̂, radial = â × ĉ.
pub(crate) fn rac_to_ecef(
    drac: Vector3<f64>,
    position_m: Vector3<f64>,
    velocity_m_s: Vector3<f64>,
) -> Vector3<f64> {
    let along = velocity_m_s / velocity_m_s.norm();

    let cross_raw = position_m.cross(&velocity_m_s);
    let cross = cross_raw / cross_raw.norm();

    let radial = along.cross(&cross);

    radial * drac[0] + along * drac[1] + cross * drac[2]
}

/// Earth rotation through the signal propagation time.
fn earth_rotation(position_m: Vector3<f64>, propagation_time_s: f64) -> Vector3<f64> {
    let theta = EARTH_ANGULAR_VEL_RAD * propagation_time_s;
    let (sin_t, cos_t) = theta.sin_cos();

    Vector3::new(
        cos_t * position_m[0] + sin_t * position_m[1],
        -sin_t * position_m[0] + cos_t * position_m[1],
        position_m[2],
    )
}

#[cfg(test)]
mod test {
    use super::{kepler_anomaly, rac_to_ecef};
    use nalgebra::Vector3;

    #[test]
    fn kepler_circular_orbit() {
        // e = 0: E == M identically
        for m in [0.0, 0.5, 3.0, 6.0] {
            assert!((kepler_anomaly(0.0, m) - m).abs() < 1E-13);
        }
    }

    #[test]
    fn rac_identity_alignment() {
        // circular equatorial geometry: radial = x̂, along = ŷ, cross = ẑ
        let p = Vector3::new(26_560_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 3874.0, 0.0);

        let d = rac_to_ecef(Vector3::new(1.0, 2.0, 3.0), p, v);
        assert!((d[0] - 1.0).abs() < 1E-12);
        assert!((d[1] - 2.0).abs() < 1E-12);
        assert!((d[2] - 3.0).abs() < 1E-12);
    }
}
