//! # Trace extraction module
//!
//! Converts a grayscale raster of a hand-drawn or photographed curve into a
//! waypoint path. The pipeline is:
//!
//! 1. Binarise the raster, treating darker-than-threshold pixels as the curve
//! 2. Thin the binary mask to a 1-pixel skeleton by iterative morphological
//!    erosion
//! 3. Select the longest outer contour of the skeleton
//! 4. Smooth the contour's coordinate series with a small Gaussian kernel
//! 5. Resample the contour down to waypoint density
//!
//! Extraction cost scales with the raster area, so it is run on a background
//! worker ([`TraceMgr`]) rather than inside the cyclic executive.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod extract;
mod params;
mod worker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use extract::*;
pub use params::*;
pub use worker::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during trace extraction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TraceError {
    #[error("The extraction was cancelled")]
    Cancelled,
}
