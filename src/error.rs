use thiserror::Error;

use crate::prelude::Duration;

/// Correction family, used when reporting freshness rejections.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CorrectionKind {
    /// SSR orbit correction (radial/along/cross deltas)
    Orbit,
    /// SSR clock correction polynomial
    Clock,
    /// Spherical harmonic VTEC model
    Vtec,
}

impl std::fmt::Display for CorrectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::Orbit => write!(f, "orbit"),
            Self::Clock => write!(f, "clock"),
            Self::Vtec => write!(f, "vtec"),
        }
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// Correction exists but its reference epoch is outside the
    /// type-specific staleness bound: the satellite (or the ionosphere
    /// term) is skipped for this epoch.
    #[error("stale {kind} correction (age: {age})")]
    StaleCorrection {
        kind: CorrectionKind,
        age: Duration,
    },

    /// No retained ephemeris version carries the IODE the orbit
    /// correction was computed against.
    #[error("orbit correction IOD does not match any ephemeris version")]
    IodMismatch,

    /// Broadcast ephemeris flags the vehicle unhealthy.
    #[error("unhealthy ephemeris")]
    EphemerisUnhealthy,

    /// Broadcast ephemeris clock epoch is too far from current time.
    #[error("ephemeris out of fit interval (dtoc: {0})")]
    EphemerisStale(Duration),

    /// Steady-state condition, not logged as an error by callers.
    #[error("below elevation mask")]
    BelowElevationMask,

    /// No code bias value for the primary signal of this vehicle.
    #[error("missing code bias")]
    MissingBias,

    /// Geometric range came out NaN (bad SSR payload upstream).
    /// The vehicle is excluded rather than wire-encoded.
    #[error("degenerate (NaN) geometric range")]
    DegenerateRange,

    /// 3 or fewer usable vehicles: the epoch produces no RTCM output
    /// and the caller simply retries next period.
    #[error("insufficient satellites ({qualified} usable)")]
    InsufficientSatellites { qualified: usize },

    /// Encoded payload would exceed the 1023 byte RTCM3 frame capacity.
    /// The message is dropped; sibling messages of the same epoch are
    /// unaffected.
    #[error("rtcm payload overflow ({bits} bits)")]
    EncodeOverflow { bits: usize },

    /// Message body written out of state machine order (internal misuse).
    #[error("rtcm encoder state error")]
    EncoderState,

    /// Requested constellation carries no serviceable signal selection.
    #[error("no primary signal selected for constellation")]
    NoSignalSelected,

    /// Satellite × signal cell mask exceeds the 64-cell MSM limit;
    /// the constellation message is dropped for this epoch.
    #[error("msm cell mask overflow ({cells} cells)")]
    CellMaskOverflow { cells: usize },

    /// Troposphere coefficient blob does not carry the expected
    /// grid shape.
    #[error("troposphere grid shape mismatch (expected {expected} values, got {got})")]
    TropoGridShape { expected: usize, got: usize },
}
