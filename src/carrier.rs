use crate::constants::SPEED_OF_LIGHT_M_S;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Carrier frequencies served by the synthetic observation stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Carrier {
    /// L1 (GPS) same frequency as E1
    #[default]
    L1,
    /// L2 (GPS)
    L2,
    /// E1 (Galileo)
    E1,
    /// E5B (Galileo) same frequency as B2iB2b
    E5B,
    /// B1I (BDS)
    B1I,
    /// B2I/B2B (BDS) same frequency as E5b
    B2iB2b,
    /// B3 (BDS)
    B3,
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::E1 => write!(f, "E1"),
            Self::E5B => write!(f, "E5B"),
            Self::B1I => write!(f, "B1I"),
            Self::B2iB2b => write!(f, "B2I/B2B"),
            Self::B3 => write!(f, "B3"),
        }
    }
}

impl Carrier {
    pub fn frequency_hz(&self) -> f64 {
        match self {
            Self::L1 | Self::E1 => 1575.42E6_f64,
            Self::L2 => 1227.60E6_f64,
            Self::E5B | Self::B2iB2b => 1207.14E6_f64,
            Self::B1I => 1561.098E6_f64,
            Self::B3 => 1268.52E6_f64,
        }
    }

    pub fn wavelength_m(&self) -> f64 {
        SPEED_OF_LIGHT_M_S / self.frequency_hz()
    }
}
