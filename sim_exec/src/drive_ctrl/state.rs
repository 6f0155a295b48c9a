//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use nalgebra::{Point2, Vector2};
use serde::Serialize;

// Internal
use super::{ControlInputs, DriveCtrlError, Params};
use crate::figure;
use crate::path::Path;
use util::{maths, module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state.
///
/// This is the single owner of the mutable simulation state, the
/// presentation layer only reads it through [`OutputData`] and mutates it
/// through the defined mode entry operations and [`ControlInputs`].
#[derive(Default)]
pub struct DriveCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// Current pose of the vehicle.
    pose: Pose,

    /// Current speed of the vehicle.
    ///
    /// Units: pixels/cycle
    speed_px: f64,

    /// The active drive mode.
    mode: DriveMode,

    /// The path being followed in an automatic mode.
    path: Path,

    /// Index of the next waypoint to drive to within the path.
    path_index: usize,
}

/// The vehicle's placement in the scene.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct Pose {
    /// Position of the centre of the vehicle.
    ///
    /// Units: pixels
    pub position_px: Point2<f64>,

    /// Heading measured anticlockwise from the +x axis.
    ///
    /// The heading accumulates without wrapping, use
    /// [`Pose::heading_wrapped_deg`] when presenting it.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

/// Input data to drive control.
#[derive(Default, Clone, Copy)]
pub struct InputData {
    /// The control inputs currently held.
    pub controls: ControlInputs,
}

/// Output of one cycle of drive control processing.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// Pose of the vehicle after this cycle's update.
    pub pose: Pose,

    /// Speed of the vehicle.
    ///
    /// Units: pixels/cycle
    pub speed_px: f64,

    /// The active drive mode.
    pub mode: DriveMode,
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The followed path wrapped back to its start this cycle (Figure8 only).
    pub path_wrapped: bool,

    /// A trace follow reached the end of its path this cycle and the vehicle
    /// was handed back to manual control.
    pub follow_finished: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The active control regime of the vehicle.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Debug)]
pub enum DriveMode {
    /// Steering and throttle come from the held control inputs.
    Manual,

    /// Driving the generated figure-of-eight path, looping indefinitely.
    Figure8,

    /// Driving an extracted trace path once.
    TraceFollow,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        // The vehicle starts in manual mode, stationary at the origin, which
        // is the default state, so there's nothing else to set up here.

        Ok(())
    }

    /// Perform cyclic processing of drive control.
    ///
    /// The update is total over the state space, all error conditions are
    /// handled at the mode entry operations instead.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Any manual control takes the vehicle out of an automatic mode
        if input_data.controls.any_held() && self.mode != DriveMode::Manual {
            info!("Manual control input, leaving {:?} mode", self.mode);
            self.mode = DriveMode::Manual;
        }

        match self.mode {
            DriveMode::Manual => self.update_manual(&input_data.controls),
            DriveMode::Figure8 | DriveMode::TraceFollow => self.update_follow(),
        }

        Ok((
            OutputData {
                pose: self.pose,
                speed_px: self.speed_px,
                mode: self.mode,
            },
            self.report,
        ))
    }
}

impl DriveCtrl {
    /// Enter Figure8 mode, driving a fresh figure-of-eight anchored at the
    /// vehicle's current pose.
    pub fn enter_figure8(&mut self) {
        let mut path = figure::generate(
            self.params.figure_size_px,
            self.params.figure_num_points,
        );

        // Anchor the figure at the vehicle: rotate it so its first segment is
        // tangent to +x, then transform it onto the current pose
        path.normalize_tangent();
        path.place_at_pose(&self.pose.position_px, self.pose.heading_deg);

        self.path = path;
        self.path_index = 1;
        self.speed_px = self.params.follow_speed_px;
        self.mode = DriveMode::Figure8;

        info!(
            "Entering Figure8 mode, {} waypoints anchored at ({:.1}, {:.1}) px",
            self.path.num_points(),
            self.pose.position_px.x,
            self.pose.position_px.y
        );
    }

    /// Enter TraceFollow mode on the given extracted trace path.
    ///
    /// The trace is aligned to the vehicle's current pose before following.
    /// Traces with fewer than 2 points or non-finite coordinates are refused
    /// and the current mode is kept.
    pub fn follow_trace(&mut self, trace: &Path) -> Result<(), DriveCtrlError> {
        if trace.num_points() < 2 {
            return Err(DriveCtrlError::TracePathTooShort(trace.num_points()));
        }
        if !trace.is_finite() {
            return Err(DriveCtrlError::TracePathNotFinite);
        }

        let mut path = trace.clone();
        path.normalize_tangent();
        path.place_at_pose(&self.pose.position_px, self.pose.heading_deg);

        self.path = path;
        self.path_index = 1;
        self.speed_px = self.params.follow_speed_px;
        self.mode = DriveMode::TraceFollow;

        info!(
            "Entering TraceFollow mode, {} waypoints anchored at ({:.1}, {:.1}) px",
            self.path.num_points(),
            self.pose.position_px.x,
            self.pose.position_px.y
        );

        Ok(())
    }

    /// Re-initialise the vehicle: stationary at the origin, heading 0, in
    /// manual mode with no active path.
    pub fn reset(&mut self) {
        self.pose = Pose::default();
        self.speed_px = 0.0;
        self.mode = DriveMode::Manual;
        self.path = Path::new_empty();
        self.path_index = 0;
    }

    /// Get the path being followed, for preview rendering.
    ///
    /// Empty when no automatic mode has been entered since the last reset.
    pub fn active_path(&self) -> &Path {
        &self.path
    }

    /// Manual mode update: integrate the held control inputs into the pose.
    fn update_manual(&mut self, controls: &ControlInputs) {
        if controls.left {
            self.pose.heading_deg -= self.params.steer_rate_deg;
        }
        if controls.right {
            self.pose.heading_deg += self.params.steer_rate_deg;
        }

        if controls.accel {
            self.speed_px += self.params.accel_step_px;
        }
        if controls.decel {
            self.speed_px -= self.params.accel_step_px;
        }
        self.speed_px = maths::clamp(&self.speed_px, &0.0, &self.params.max_speed_px);

        // Brake overrides any throttle adjustment made this cycle
        if controls.brake {
            self.speed_px = 0.0;
        }

        let heading_rad = self.pose.heading_deg.to_radians();
        self.pose.position_px +=
            self.speed_px * Vector2::new(heading_rad.cos(), heading_rad.sin());
    }

    /// Path following update: step to the next waypoint, deriving the heading
    /// from the waypoint delta rather than integrating it. The heading can
    /// therefore jump between samples.
    fn update_follow(&mut self) {
        if self.path_index < self.path.num_points() {
            let next = self.path.points_px[self.path_index];
            let delta = next - self.pose.position_px;

            self.pose.heading_deg = delta.y.atan2(delta.x).to_degrees();
            self.pose.position_px = next;
            self.path_index += 1;

            // Figure8 drives the loop indefinitely, wrapping at the end
            if self.path_index >= self.path.num_points() && self.mode == DriveMode::Figure8 {
                self.path_index = 0;
                self.report.path_wrapped = true;
            }
        } else {
            // TraceFollow is a one-shot traversal, hand back manual control
            warn!("End of trace path reached, stopping");
            self.mode = DriveMode::Manual;
            self.speed_px = 0.0;
            self.report.follow_finished = true;
        }
    }
}

impl Pose {
    /// The heading wrapped into [0, 360) for presentation.
    pub fn heading_wrapped_deg(&self) -> f64 {
        maths::wrap_deg_360(self.heading_deg)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position_px: Point2::origin(),
            heading_deg: 0.0,
        }
    }
}

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Manual
    }
}

impl Default for OutputData {
    fn default() -> Self {
        Self {
            pose: Pose::default(),
            speed_px: 0.0,
            mode: DriveMode::Manual,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    /// Step the controller with the given controls held.
    fn tick(ctrl: &mut DriveCtrl, controls: ControlInputs) -> (OutputData, StatusReport) {
        ctrl.proc(&InputData { controls }).unwrap()
    }

    fn tick_idle(ctrl: &mut DriveCtrl) -> (OutputData, StatusReport) {
        tick(ctrl, ControlInputs::default())
    }

    #[test]
    fn test_manual_accel() {
        let mut ctrl = DriveCtrl::default();

        let accel = ControlInputs {
            accel: true,
            ..Default::default()
        };

        // Holding accel for k cycles gives speed min(10, 0.2k)
        for k in 1..=60 {
            let (output, _) = tick(&mut ctrl, accel);
            assert_relative_eq!(
                output.speed_px,
                (0.2 * k as f64).min(10.0),
                epsilon = 1e-9
            );
        }

        // Releasing the control holds the speed constant
        let (output, _) = tick_idle(&mut ctrl);
        assert_relative_eq!(output.speed_px, 10.0);

        // Decel reduces speed again
        let (output, _) = tick(
            &mut ctrl,
            ControlInputs {
                decel: true,
                ..Default::default()
            },
        );
        assert_relative_eq!(output.speed_px, 9.8, epsilon = 1e-9);
    }

    #[test]
    fn test_manual_brake() {
        let mut ctrl = DriveCtrl::default();

        let accel = ControlInputs {
            accel: true,
            ..Default::default()
        };
        for _ in 0..20 {
            tick(&mut ctrl, accel);
        }

        // Brake zeroes the speed on the cycle it's issued, even if accel is
        // still held
        let (output, _) = tick(
            &mut ctrl,
            ControlInputs {
                accel: true,
                brake: true,
                ..Default::default()
            },
        );
        assert_eq!(output.speed_px, 0.0);
        assert_eq!(output.mode, DriveMode::Manual);
    }

    #[test]
    fn test_manual_steering_and_motion() {
        let mut ctrl = DriveCtrl::default();

        // Three cycles of left steer at 2 deg/cycle
        let left = ControlInputs {
            left: true,
            ..Default::default()
        };
        for _ in 0..3 {
            tick(&mut ctrl, left);
        }

        let (output, _) = tick_idle(&mut ctrl);
        assert_relative_eq!(output.pose.heading_deg, -6.0, epsilon = 1e-9);

        // Headings are not wrapped in state, only for display
        assert_relative_eq!(
            output.pose.heading_wrapped_deg(),
            354.0,
            epsilon = 1e-9
        );

        // With heading fixed, accelerating moves the vehicle along the
        // heading direction by the speed each cycle
        let before = output.pose.position_px;
        let (output, _) = tick(
            &mut ctrl,
            ControlInputs {
                accel: true,
                ..Default::default()
            },
        );

        let heading_rad = (-6f64).to_radians();
        assert_relative_eq!(
            output.pose.position_px,
            before + 0.2 * Vector2::new(heading_rad.cos(), heading_rad.sin()),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_figure8_entry() {
        let mut ctrl = DriveCtrl::default();
        ctrl.enter_figure8();

        assert_eq!(ctrl.mode, DriveMode::Figure8);
        assert_eq!(ctrl.path_index, 1);
        assert_relative_eq!(ctrl.speed_px, 5.0);
        assert_eq!(ctrl.active_path().num_points(), 200);

        // Anchored at the origin with heading 0 the first segment of the
        // aligned path points along +x
        assert_relative_eq!(
            ctrl.active_path().heading_to_deg(1).unwrap(),
            0.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            ctrl.active_path().points_px[0],
            Point2::new(0.0, 0.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_figure8_lap() {
        let mut ctrl = DriveCtrl::default();
        ctrl.enter_figure8();

        let start = ctrl.active_path().points_px[0];

        // One full lap returns the vehicle to the first waypoint and stays in
        // Figure8 mode, with the wrap reported on the lap's final cycle
        let mut wrapped = false;
        for _ in 0..200 {
            let (_, report) = tick_idle(&mut ctrl);
            wrapped |= report.path_wrapped;
        }

        assert!(wrapped);
        assert_eq!(ctrl.mode, DriveMode::Figure8);
        assert_relative_eq!(ctrl.pose.position_px, start, epsilon = 1e-6);

        // And it keeps going, there's no automatic exit
        for _ in 0..250 {
            tick_idle(&mut ctrl);
        }
        assert_eq!(ctrl.mode, DriveMode::Figure8);
    }

    #[test]
    fn test_manual_input_leaves_figure8() {
        let mut ctrl = DriveCtrl::default();
        ctrl.enter_figure8();

        let (output, _) = tick(
            &mut ctrl,
            ControlInputs {
                right: true,
                ..Default::default()
            },
        );

        assert_eq!(output.mode, DriveMode::Manual);
        // The follow speed is kept when dropping to manual control
        assert_relative_eq!(output.speed_px, 5.0);
    }

    #[test]
    fn test_trace_follow_one_shot() {
        let mut ctrl = DriveCtrl::default();

        let trace = Path::from_points(
            (0..5).map(|i| Point2::new(i as f64 * 10.0, 0.0)).collect(),
        );
        ctrl.follow_trace(&trace).unwrap();
        assert_eq!(ctrl.mode, DriveMode::TraceFollow);

        // 4 cycles to consume waypoints 1..=4
        for _ in 0..4 {
            let (output, report) = tick_idle(&mut ctrl);
            assert_eq!(output.mode, DriveMode::TraceFollow);
            assert!(!report.follow_finished);
        }
        assert_relative_eq!(ctrl.pose.position_px, Point2::new(40.0, 0.0));

        // The next cycle hands back manual control with the vehicle halted
        let (output, report) = tick_idle(&mut ctrl);
        assert!(report.follow_finished);
        assert_eq!(output.mode, DriveMode::Manual);
        assert_eq!(output.speed_px, 0.0);
    }

    #[test]
    fn test_trace_follow_rejects_bad_paths() {
        let mut ctrl = DriveCtrl::default();

        // Too short
        assert!(matches!(
            ctrl.follow_trace(&Path::new_empty()),
            Err(DriveCtrlError::TracePathTooShort(0))
        ));
        assert!(matches!(
            ctrl.follow_trace(&Path::from_points(vec![Point2::new(1.0, 1.0)])),
            Err(DriveCtrlError::TracePathTooShort(1))
        ));

        // Non-finite coordinates
        let bad = Path::from_points(vec![
            Point2::new(0.0, 0.0),
            Point2::new(f64::INFINITY, 0.0),
        ]);
        assert!(matches!(
            ctrl.follow_trace(&bad),
            Err(DriveCtrlError::TracePathNotFinite)
        ));

        // The rejections left the controller untouched
        assert_eq!(ctrl.mode, DriveMode::Manual);
        assert_eq!(ctrl.speed_px, 0.0);
        assert!(ctrl.active_path().is_empty());
    }

    #[test]
    fn test_trace_follow_anchors_at_pose() {
        let mut ctrl = DriveCtrl::default();

        // Drive the vehicle away from the origin and turn it round
        let accel = ControlInputs {
            accel: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut ctrl, accel);
        }
        for _ in 0..45 {
            tick(
                &mut ctrl,
                ControlInputs {
                    right: true,
                    ..Default::default()
                },
            );
        }

        let pose = ctrl.pose;

        let trace = Path::from_points(
            (0..5).map(|i| Point2::new(i as f64, 0.0)).collect(),
        );
        ctrl.follow_trace(&trace).unwrap();

        // The aligned path starts at the vehicle and its first segment points
        // along the vehicle's heading
        assert_relative_eq!(
            ctrl.active_path().points_px[0],
            pose.position_px,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            ctrl.active_path().heading_to_deg(1).unwrap(),
            90.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_reset() {
        let mut ctrl = DriveCtrl::default();
        ctrl.enter_figure8();
        for _ in 0..10 {
            tick_idle(&mut ctrl);
        }

        ctrl.reset();

        assert_eq!(ctrl.mode, DriveMode::Manual);
        assert_eq!(ctrl.speed_px, 0.0);
        assert_relative_eq!(ctrl.pose.position_px, Point2::origin());
        assert_eq!(ctrl.pose.heading_deg, 0.0);
        assert!(ctrl.active_path().is_empty());
    }
}
