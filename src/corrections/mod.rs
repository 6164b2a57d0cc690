//! Correction data model: the read-only snapshot handed to the
//! synthesizer once per epoch by the ingestion subsystem.
mod bias;
mod ephemeris;
mod ssr;
mod vtec;

pub use bias::{BiasCorrection, BiasTable};
pub use ephemeris::{Ephemeris, EphemerisSet};
pub use ssr::{ClockCorrection, OrbitCorrection, SsrCorrections};
pub use vtec::VtecCorrection;

/// One coherent, immutable view of every correction product, cloned
/// out of the ingestion side. The core never mutates it; version
/// retention and synchronization are entirely the producer's business.
#[derive(Debug, Clone, Default)]
pub struct CorrectionSnapshot {
    /// Retained broadcast [Ephemeris] versions
    pub ephemerides: EphemerisSet,

    /// Retained SSR orbit/clock correction versions
    pub ssr: SsrCorrections,

    /// Current code biases, per (vehicle, signal)
    pub code_biases: BiasTable,

    /// Current phase biases, per (vehicle, signal)
    pub phase_biases: BiasTable,

    /// Current VTEC model, replaced wholesale on update
    pub vtec: Option<VtecCorrection>,
}
