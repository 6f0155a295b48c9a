//! Parameters structure for trace extraction

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trace extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Binarisation threshold. Pixels darker than this are treated as part
    /// of the drawn curve.
    pub threshold: u8,

    /// Width of the Gaussian kernel used to smooth the extracted contour.
    pub smooth_kernel_width: usize,

    /// Standard deviation of the smoothing kernel.
    pub smooth_sigma: f64,

    /// Keep every Nth contour point when resampling down to waypoints.
    pub resample_step: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            threshold: 100,
            smooth_kernel_width: 5,
            smooth_sigma: 1.5,
            resample_step: 5,
        }
    }
}
