//! # Data Store

use crate::{
    drive_ctrl::{self, DriveCmd},
    path::Path,
    trajectory::TrajectoryRecorder,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Simulation elapsed time
    pub sim_time_s: f64,

    // DriveCtrl
    pub drive_ctrl: drive_ctrl::DriveCtrl,
    pub drive_ctrl_input: drive_ctrl::InputData,
    pub drive_ctrl_output: drive_ctrl::OutputData,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    /// Pending mode-switch command for DriveCtrl
    pub drive_cmd: Option<DriveCmd>,

    // Trace
    /// The most recently extracted trace path, unaligned, awaiting a
    /// FollowTrace command
    pub trace_path: Option<Path>,

    // Trajectory
    /// History of visited positions for trail rendering
    pub trajectory: TrajectoryRecorder,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}
