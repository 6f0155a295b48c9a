//! # Path
//!
//! This module defines the waypoint path used by the drive system, along with
//! the transforms which anchor a generated or extracted path onto the
//! vehicle's current pose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path defining a sequence of waypoints for the vehicle to drive through.
///
/// Points are in scene coordinates with units of pixels.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct Path {
    pub points_px: Vec<Point2<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Create a new empty path
    pub fn new_empty() -> Self {
        Path {
            points_px: Vec::new(),
        }
    }

    /// Create a path from an existing sequence of points
    pub fn from_points(points_px: Vec<Point2<f64>>) -> Self {
        Path { points_px }
    }

    /// Get the number of points in the path
    pub fn num_points(&self) -> usize {
        self.points_px.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_px.is_empty()
    }

    /// Returns true if every coordinate in the path is finite.
    ///
    /// Paths which fail this check must not be followed.
    pub fn is_finite(&self) -> bool {
        self.points_px
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Return the length of the path in pixels, treating it as an open curve
    /// (no closing segment between the last and first points).
    ///
    /// If the path has fewer than 2 points then `None` is returned.
    pub fn arc_length_px(&self) -> Option<f64> {
        if self.points_px.len() < 2 {
            return None;
        }

        Some(
            self.points_px
                .windows(2)
                .map(|seg| (seg[1] - seg[0]).norm())
                .sum(),
        )
    }

    /// Return the heading, in degrees from the +x axis, of the segment
    /// arriving at the point with the given index.
    ///
    /// `None` if the index is 0 or beyond the end of the path.
    pub fn heading_to_deg(&self, target_index: usize) -> Option<f64> {
        if target_index == 0 || target_index >= self.points_px.len() {
            return None;
        }

        let delta = self.points_px[target_index] - self.points_px[target_index - 1];

        Some(delta.y.atan2(delta.x).to_degrees())
    }

    /// Rotate the path about the origin so that the segment from point 0 to
    /// point 1 lies along the +x axis.
    ///
    /// If the path has fewer than 2 points, or the leading points are
    /// coincident, the direction of the tangent is undefined and the path is
    /// left unrotated.
    pub fn normalize_tangent(&mut self) {
        if self.points_px.len() < 2 {
            return;
        }

        let tangent = self.points_px[1] - self.points_px[0];

        if tangent.norm() == 0.0 {
            return;
        }

        let rot = Rotation2::new(-tangent.y.atan2(tangent.x));

        for point in self.points_px.iter_mut() {
            *point = rot * *point;
        }
    }

    /// Transform the path onto the given pose, rotating each point by the
    /// heading and then translating it to the position.
    pub fn place_at_pose(&mut self, position_px: &Point2<f64>, heading_deg: f64) {
        let rot = Rotation2::new(heading_deg.to_radians());
        let translation: Vector2<f64> = position_px.coords;

        for point in self.points_px.iter_mut() {
            *point = rot * *point + translation;
        }
    }

    /// Reduce the density of the path by keeping only every `step`th point,
    /// starting from the first.
    ///
    /// A step of 0 or 1 leaves the path unchanged.
    pub fn resample(&mut self, step: usize) {
        if step < 2 {
            return;
        }

        self.points_px = self
            .points_px
            .iter()
            .copied()
            .step_by(step)
            .collect();
    }
}
