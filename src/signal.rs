use crate::prelude::{Carrier, Constellation};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Observation code of a synthesized pseudorange, one entry per
/// signal the correction products actually cover. Replaces the
/// RTCM "xxC/xxW/.." string tables with typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignalCode {
    /// GPS L1 C/A
    C1C,
    /// GPS L1 P(Y)
    C1W,
    /// GPS L2 C/A
    C2C,
    /// GPS L2 P(Y) semi-codeless
    C2W,
    /// GPS L2C(L)
    C2L,
    /// Galileo E1C
    E1C,
    /// Galileo E1B+C
    E1X,
    /// Galileo E5b(Q)
    E5bQ,
    /// Galileo E5b(I+Q)
    E5bX,
    /// BDS B1I
    B2I,
    /// BDS B3I
    B6I,
    /// BDS B2I (GEO/IGSO band, PRN ≤ 18)
    B7I,
    /// BDS B2b (MEO band, PRN > 18)
    B7Z,
}

impl std::fmt::Display for SignalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::C1C => write!(f, "1C"),
            Self::C1W => write!(f, "1W"),
            Self::C2C => write!(f, "2C"),
            Self::C2W => write!(f, "2W"),
            Self::C2L => write!(f, "2L"),
            Self::E1C => write!(f, "1C"),
            Self::E1X => write!(f, "1X"),
            Self::E5bQ => write!(f, "7Q"),
            Self::E5bX => write!(f, "7X"),
            Self::B2I => write!(f, "2I"),
            Self::B6I => write!(f, "6I"),
            Self::B7I => write!(f, "7I"),
            Self::B7Z => write!(f, "7Z"),
        }
    }
}

impl SignalCode {
    /// Associated [Carrier] frequency.
    pub fn carrier(&self) -> Carrier {
        match self {
            Self::C1C | Self::C1W => Carrier::L1,
            Self::C2C | Self::C2W | Self::C2L => Carrier::L2,
            Self::E1C | Self::E1X => Carrier::E1,
            Self::E5bQ | Self::E5bX => Carrier::E5B,
            Self::B2I => Carrier::B1I,
            Self::B6I => Carrier::B3,
            Self::B7I | Self::B7Z => Carrier::B2iB2b,
        }
    }

    /// 1-based MSM signal id for this code within its constellation's
    /// signal mask (RTCM 10403 tables 3.5-91/99/108). `None` when the
    /// constellation has no MSM slot for it.
    pub fn msm_id(&self, constellation: Constellation) -> Option<u8> {
        match constellation {
            Constellation::GPS => match self {
                Self::C1C => Some(2),
                Self::C1W => Some(4),
                Self::C2C => Some(8),
                Self::C2W => Some(10),
                Self::C2L => Some(16),
                _ => None,
            },
            Constellation::Galileo => match self {
                Self::E1C => Some(2),
                Self::E1X => Some(5),
                Self::E5bQ => Some(15),
                Self::E5bX => Some(16),
                _ => None,
            },
            Constellation::BeiDou => match self {
                Self::B2I => Some(2),
                Self::B6I => Some(8),
                Self::B7I => Some(14),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::SignalCode;
    use crate::prelude::Constellation;

    #[test]
    fn msm_slots() {
        assert_eq!(SignalCode::C1C.msm_id(Constellation::GPS), Some(2));
        assert_eq!(SignalCode::C2W.msm_id(Constellation::GPS), Some(10));
        assert_eq!(SignalCode::E5bQ.msm_id(Constellation::Galileo), Some(15));
        assert_eq!(SignalCode::B2I.msm_id(Constellation::BeiDou), Some(2));
        // B2b has no MSM slot in the BDS table
        assert_eq!(SignalCode::B7Z.msm_id(Constellation::BeiDou), None);
        // cross-constellation lookup is absent, not aliased
        assert_eq!(SignalCode::C1C.msm_id(Constellation::Galileo), None);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&SignalCode::C2W).unwrap();
        assert_eq!(json, "\"C2W\"");

        let parsed: SignalCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, SignalCode::C2W);
    }
}
