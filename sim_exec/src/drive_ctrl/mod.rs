//! # Drive control module
//!
//! This module owns the vehicle's pose, speed and drive mode, and advances
//! them once per cycle. The vehicle is driven in one of three modes:
//!
//! - `Manual` - steering and throttle demands from the held control inputs
//! - `Figure8` - driving a generated figure-of-eight path indefinitely
//! - `TraceFollow` - driving an extracted trace path once, then stopping
//!
//! Mode entries are explicit operations triggered by the presentation layer,
//! the per-cycle processing itself never enters an automatic mode.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Cannot follow a trace path of {0} points, at least 2 are required")]
    TracePathTooShort(usize),

    #[error("The trace path contains non-finite coordinates")]
    TracePathNotFinite,
}
