#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod attitude;
mod bias;
mod carrier;
mod constants;
mod constellation;
mod corrections;
mod error;
mod propagator;
mod rtcm;
mod signal;
mod synthesizer;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::attitude::ElevationAzimuth;
    pub use crate::bias::{IonosphereModel, TropoGrid, TroposphereModel};
    pub use crate::carrier::Carrier;
    pub use crate::constellation::ConstellationCapabilities;
    pub use crate::corrections::{
        BiasCorrection, BiasTable, ClockCorrection, CorrectionSnapshot, Ephemeris, EphemerisSet,
        OrbitCorrection, SsrCorrections, VtecCorrection,
    };
    pub use crate::error::{CorrectionKind, Error};
    pub use crate::propagator::{EphemerisPropagator, PropagatedState};
    pub use crate::rtcm::{Rtcm3Encoder, RtcmEpochFrames};
    pub use crate::signal::SignalCode;
    pub use crate::synthesizer::{
        ConstellationSelection, EpochBatch, EpochSynthesizer, ObservationRecord,
    };
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}
