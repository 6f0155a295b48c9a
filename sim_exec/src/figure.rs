//! # Figure generator
//!
//! Produces the closed parametric figure-of-eight (lemniscate) curve used by
//! the Figure8 drive mode.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;

// Internal
use crate::path::Path;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a figure-of-eight path centred on the origin.
///
/// The curve is sampled at `num_points` values of t in [0, 2pi), so the final
/// sample approaches but never reaches the start point. `size_px` sets the
/// half-width of the figure; a non-positive size produces a degenerate point
/// cloud, which is the caller's responsibility to avoid.
pub fn generate(size_px: f64, num_points: usize) -> Path {
    let mut points_px = Vec::with_capacity(num_points);

    for i in 0..num_points {
        let t = 2.0 * std::f64::consts::PI * i as f64 / num_points as f64;
        let denom = 1.0 + t.cos().powi(2);

        points_px.push(Point2::new(
            size_px * t.sin() / denom,
            size_px * t.sin() * t.cos() / denom,
        ));
    }

    Path::from_points(points_px)
}
