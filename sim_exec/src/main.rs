//! Main simulator executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Trace worker result polling
//!         - Mode-switch command processing
//!         - Drive control processing
//!         - Trajectory recording
//!
//! The loop runs at a fixed 30 Hz cycle rate, matching the presentation
//! layer's frame timer. Trace extraction runs on a background worker so a
//! large raster never stalls the cycle.
//!
//! # Usage
//!
//! With no arguments the executable drives a demonstration scenario: a short
//! manual drive followed by the figure of eight. With a single argument the
//! argument is taken as the path to an image of a drawn curve, which is
//! extracted and followed.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use sim_lib::{
    data_store::DataStore,
    drive_ctrl::{ControlInputs, DriveCmd},
    trace::{self, TraceMgr, TraceResult},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{error, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 1.0 / 30.0;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: u128 = 30;

/// The trajectory is recorded once every this many cycles.
const TRAJ_RECORD_CYCLES: u128 = 3;

/// Number of cycles the demonstration scenario runs for.
const DEMO_NUM_CYCLES: u128 = 600;

/// Limit on the number of cycles when following an extracted trace, in case
/// the extraction never produces a followable path.
const TRACE_NUM_CYCLES_LIMIT: u128 = 18000;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("sim_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Autodrive Simulator Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let trace_params: trace::Params =
        util::params::load("trace.toml").wrap_err("Could not load trace params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.drive_ctrl
        .init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    let mut trace_mgr = TraceMgr::new(trace_params);
    info!("Trace worker started");

    info!("Module initialisation complete\n");

    // ---- IMAGE INPUT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    let mut demo_mode = false;

    match args.len() {
        1 => {
            info!("No trace image provided, driving the demonstration scenario\n");
            demo_mode = true;
        }
        2 => {
            info!("Loading trace image from \"{}\"", &args[1]);

            // Decoding is the presentation side's responsibility: a failure
            // here is reported and leaves the simulation state untouched
            match image::open(&args[1]) {
                Ok(img) => {
                    let raster = img.to_luma8();
                    info!(
                        "Trace image decoded ({}x{} px), extraction started\n",
                        raster.width(),
                        raster.height()
                    );
                    trace_mgr.request_extract(raster);
                }
                Err(e) => {
                    error!("Could not decode trace image \"{}\": {}", &args[1], e);
                    info!("Falling back to the demonstration scenario\n");
                    demo_mode = true;
                }
            }
        }
        _ => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                args.len() - 1
            ))
        }
    }

    let num_cycles_limit = if demo_mode {
        DEMO_NUM_CYCLES
    } else {
        TRACE_NUM_CYCLES_LIMIT
    };

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    loop {
        let cycle_start = Instant::now();

        // ---- CYCLE MANAGEMENT ----

        ds.num_cycles += 1;
        ds.sim_time_s += CYCLE_PERIOD_S;
        ds.is_1_hz_cycle = ds.num_cycles % CYCLE_FREQUENCY_HZ == 0;

        // ---- TRACE WORKER POLLING ----

        if let Some(result) = trace_mgr.poll() {
            match result {
                TraceResult::Complete(path) if path.is_empty() => {
                    warn!("Trace extraction found no usable curve in the image");
                    if !demo_mode {
                        info!("Nothing to follow, ending simulation");
                        break;
                    }
                }
                TraceResult::Complete(path) => {
                    info!("Trace extraction complete, {} waypoints", path.num_points());
                    ds.trace_path = Some(path);
                    ds.drive_cmd = Some(DriveCmd::FollowTrace);
                }
                TraceResult::Cancelled => info!("Trace extraction cancelled"),
            }
        }

        // ---- SCENARIO ----

        // The demonstration scenario stands in for the presentation layer's
        // buttons: a short manual drive, a hard stop, then the figure of
        // eight until the demo ends
        ds.drive_ctrl_input.controls = ControlInputs::default();

        if demo_mode {
            match ds.num_cycles {
                30..=89 => ds.drive_ctrl_input.controls.accel = true,
                120 => ds.drive_ctrl_input.controls.brake = true,
                140 => ds.drive_cmd = Some(DriveCmd::Init),
                150 => ds.drive_cmd = Some(DriveCmd::Figure8),
                _ => (),
            }
        }

        // ---- COMMAND PROCESSING ----

        if let Some(cmd) = ds.drive_cmd.take() {
            match cmd {
                DriveCmd::Figure8 => {
                    ds.drive_ctrl.enter_figure8();
                    session::save_with_timestamp(
                        "paths/active_path.json",
                        ds.drive_ctrl.active_path().clone(),
                    );
                }
                DriveCmd::FollowTrace => match ds.trace_path {
                    Some(ref trace) => match ds.drive_ctrl.follow_trace(trace) {
                        Ok(_) => session::save_with_timestamp(
                            "paths/active_path.json",
                            ds.drive_ctrl.active_path().clone(),
                        ),
                        Err(e) => {
                            warn!("Trace follow rejected: {}", e);
                            if !demo_mode {
                                info!("No followable trace, ending simulation");
                                break;
                            }
                        }
                    },
                    None => warn!("No trace path available to follow"),
                },
                DriveCmd::Init => {
                    ds.drive_ctrl.reset();
                    ds.trajectory.clear();
                    info!("Vehicle re-initialised");
                }
            }
        }

        // ---- DRIVE PROCESSING ----

        let (output, status_rpt) = ds
            .drive_ctrl
            .proc(&ds.drive_ctrl_input)
            .wrap_err("DriveCtrl processing failed")?;

        ds.drive_ctrl_output = output;
        ds.drive_ctrl_status_rpt = status_rpt;

        // ---- TRAJECTORY RECORDING ----

        if ds.num_cycles % TRAJ_RECORD_CYCLES == 0 {
            ds.trajectory.record(output.pose.position_px);
        }

        // ---- STATUS ----

        if status_rpt.follow_finished {
            info!("Trace follow finished, vehicle halted");
        }

        if ds.is_1_hz_cycle {
            info!(
                "[{:7.1} s] mode: {:?}, pos: ({:8.1}, {:8.1}) px, heading: {:5.1} deg, \
                 speed: {:4.1} px/cycle, trail: {} points",
                ds.sim_time_s,
                output.mode,
                output.pose.position_px.x,
                output.pose.position_px.y,
                output.pose.heading_wrapped_deg(),
                output.speed_px,
                ds.trajectory.len()
            );
        }

        // ---- EXIT CONDITIONS ----

        if ds.num_cycles >= num_cycles_limit {
            info!("Cycle limit reached, ending simulation");
            break;
        }

        if !demo_mode && status_rpt.follow_finished {
            break;
        }

        // ---- CYCLE SLEEP ----

        let elapsed_s = cycle_start.elapsed().as_secs_f64();

        if elapsed_s < CYCLE_PERIOD_S {
            ds.num_consec_cycle_overruns = 0;
            thread::sleep(Duration::from_secs_f64(CYCLE_PERIOD_S - elapsed_s));
        } else {
            ds.num_consec_cycle_overruns += 1;
            warn!(
                "Cycle overran by {:.3} s ({} consecutive overruns)",
                elapsed_s - CYCLE_PERIOD_S,
                ds.num_consec_cycle_overruns
            );
        }
    }

    // ---- SHUTDOWN ----

    session.save("trajectory.json", ds.trajectory.snapshot());

    info!(
        "Simulation complete after {} cycles ({:.1} s simulated)",
        ds.num_cycles, ds.sim_time_s
    );

    trace_mgr.stop();
    session.exit();

    Ok(())
}
