//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Heading change applied per cycle while a steer control is held.
    ///
    /// Units: degrees/cycle
    pub steer_rate_deg: f64,

    /// Speed change applied per cycle while a throttle control is held.
    ///
    /// Units: pixels/cycle^2
    pub accel_step_px: f64,

    /// Maximum speed in manual mode.
    ///
    /// Units: pixels/cycle
    pub max_speed_px: f64,

    /// Fixed speed set on entering a path-following mode.
    ///
    /// Units: pixels/cycle
    pub follow_speed_px: f64,

    /// Half-width of the generated figure-of-eight.
    ///
    /// Units: pixels
    pub figure_size_px: f64,

    /// Number of samples in the generated figure-of-eight.
    pub figure_num_points: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            steer_rate_deg: 2.0,
            accel_step_px: 0.2,
            max_speed_px: 10.0,
            follow_speed_px: 5.0,
            figure_size_px: 300.0,
            figure_num_points: 200,
        }
    }
}
