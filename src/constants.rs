/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// WGS84 Earth Frame Ellipsoid semi-major axis
pub const EARTH_SEMI_MAJOR_AXIS_WGS84: f64 = 6378137.0_f64;

/// WGS84 Earth Frame Ellipsoid flattening
pub const EARTH_FLATTENING_WGS84: f64 = 1.0 / 298.257223563;

/// Mean Earth radius used by the thin-shell ionosphere geometry (meters)
pub const IONO_MEAN_EARTH_RADIUS_M: f64 = 6_370_000.0;

/// TECU to meters of L-band delay, scaled by 1/f² (Hz)
pub const TECU_TO_DELAY_M_HZ2: f64 = 40.3E16;

/// Elevation mask applied to every synthesized observation (radians, 10°)
pub const ELEVATION_MASK_RAD: f64 = 0.1745329251994;

/// SSR orbit and clock corrections older than this are unusable (seconds)
pub const SSR_STALENESS_S: f64 = 200.0;

/// VTEC models older than this are unusable (seconds)
pub const VTEC_STALENESS_S: f64 = 600.0;

/// Broadcast ephemeris whose clock epoch is further than this from "now"
/// is unusable (seconds, 2 h fit interval plus margin)
pub const EPHEMERIS_STALENESS_S: f64 = 7320.0;

/// Tropospheric coefficient grid spacing (degrees)
pub const TROPO_GRID_SPACING_DEG: f64 = 2.5;

/// One millisecond of light travel (RTCM rough-range unit, meters)
pub const RANGE_1MS_M: f64 = SPEED_OF_LIGHT_M_S * 0.001;
