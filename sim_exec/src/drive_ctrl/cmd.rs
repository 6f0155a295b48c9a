//! Commands and control inputs passed into DriveCtrl

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The held control inputs, written by the presentation layer and read once
/// per cycle.
///
/// These are transient demands: a flag is true for exactly as long as the
/// corresponding control is held.
#[derive(Clone, Copy, Default, Debug)]
pub struct ControlInputs {
    /// Steer anticlockwise
    pub left: bool,

    /// Steer clockwise
    pub right: bool,

    /// Increase speed
    pub accel: bool,

    /// Decrease speed
    pub decel: bool,

    /// Stop immediately
    pub brake: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command to switch the drive mode.
#[derive(Clone, Copy, Debug)]
pub enum DriveCmd {
    /// Begin driving the parametric figure-of-eight from the current pose.
    Figure8,

    /// Begin following the most recently extracted trace path.
    FollowTrace,

    /// Stop and re-initialise the vehicle at the origin.
    Init,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlInputs {
    /// Returns true if any control is currently held.
    pub fn any_held(&self) -> bool {
        self.left || self.right || self.accel || self.decel || self.brake
    }
}
