//! Atmospheric delay modeling: spherical-harmonic ionosphere from the
//! SSR VTEC product, and a gridded empirical troposphere.
mod iono;
mod tropo;

pub use iono::IonosphereModel;
pub use tropo::{TropoGrid, TroposphereModel};
