//! Trace extraction pipeline

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::threshold;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};
use log::warn;
use nalgebra::Point2;
use std::sync::atomic::{AtomicBool, Ordering};

// Internal
use super::{Params, TraceError};
use crate::path::Path;
use util::maths;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Extract a waypoint path from a grayscale raster of a drawn curve.
///
/// Rasters with no curve darker than the binarisation threshold, or whose
/// skeleton has no contours, produce an empty path rather than an error.
pub fn extract(raster: &GrayImage, params: &Params) -> Path {
    // Extraction without a cancel flag cannot fail
    match extract_with_cancel(raster, params, &AtomicBool::new(false)) {
        Ok(path) => path,
        Err(TraceError::Cancelled) => unreachable!(),
    }
}

/// As [`extract`], but polling the given cancel flag between pipeline stages
/// and thinning iterations.
pub fn extract_with_cancel(
    raster: &GrayImage,
    params: &Params,
    cancel: &AtomicBool,
) -> Result<Path, TraceError> {
    check_cancelled(cancel)?;

    // Binarise, inverting so that pixels darker than the threshold become
    // the foreground
    let mut mask = threshold(raster, params.threshold);
    imageops::invert(&mut mask);

    // Thin the mask down to its 1-pixel skeleton
    let (skeleton, _) = skeletonize(&mask, cancel)?;

    check_cancelled(cancel)?;

    // The drawn curve is the longest outer contour of the skeleton
    let contour = match longest_outer_contour(&skeleton) {
        Some(c) => c,
        None => return Ok(Path::new_empty()),
    };

    check_cancelled(cancel)?;

    // Smooth the x and y series separately to remove pixel staircase noise.
    // The contour is treated as open-ended: no wrap-around blending, even
    // for visually closed shapes.
    let kernel = maths::gaussian_kernel(params.smooth_kernel_width, params.smooth_sigma);

    let xs: Vec<f64> = contour.points_px.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = contour.points_px.iter().map(|p| p.y).collect();

    let xs = maths::smooth_open(&xs, &kernel);
    let ys = maths::smooth_open(&ys, &kernel);

    let mut path = Path::from_points(
        xs.into_iter()
            .zip(ys)
            .map(|(x, y)| Point2::new(x, y))
            .collect(),
    );

    // Thin the contour down to waypoint density
    path.resample(params.resample_step);

    if !path.is_finite() {
        warn!("Extracted trace contains non-finite coordinates, discarding");
        return Ok(Path::new_empty());
    }

    Ok(path)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Thin a binary mask to its 1-pixel morphological skeleton.
///
/// Each iteration peels one erosion layer off the mask and accumulates the
/// layer's ridge into the skeleton. The erosion uses a cross-shaped
/// structuring element, so the iteration count is bounded by half the
/// smaller mask dimension; the returned count is used by the tests to check
/// that bound.
pub(crate) fn skeletonize(
    mask: &GrayImage,
    cancel: &AtomicBool,
) -> Result<(GrayImage, usize), TraceError> {
    let mut mask = mask.clone();
    let mut skeleton = GrayImage::new(mask.width(), mask.height());

    let max_iters = ((mask.width().min(mask.height()) + 1) / 2) as usize;
    let mut num_iters = 0;

    while num_iters < max_iters && count_foreground(&mask) > 0 {
        check_cancelled(cancel)?;

        let eroded = erode(&mask, Norm::L1, 1);

        // The ridge of this layer is what the opening of the mask misses
        let boundary = subtract(&mask, &dilate(&eroded, Norm::L1, 1));
        accumulate_max(&mut skeleton, &boundary);

        mask = eroded;
        num_iters += 1;
    }

    Ok((skeleton, num_iters))
}

/// Select the outer contour of the image with the greatest open-curve arc
/// length. Equal lengths keep the first contour encountered.
fn longest_outer_contour(skeleton: &GrayImage) -> Option<Path> {
    let mut best: Option<(f64, Path)> = None;

    for contour in find_contours::<u32>(skeleton) {
        if !matches!(contour.border_type, BorderType::Outer) {
            continue;
        }

        let candidate = Path::from_points(
            contour
                .points
                .iter()
                .map(|p| Point2::new(p.x as f64, p.y as f64))
                .collect(),
        );

        let length_px = match candidate.arc_length_px() {
            Some(l) => l,
            None => continue,
        };

        match best {
            Some((best_length_px, _)) if length_px <= best_length_px => (),
            _ => best = Some((length_px, candidate)),
        }
    }

    best.map(|(_, path)| path)
}

fn check_cancelled(cancel: &AtomicBool) -> Result<(), TraceError> {
    if cancel.load(Ordering::Relaxed) {
        Err(TraceError::Cancelled)
    } else {
        Ok(())
    }
}

/// Per-pixel saturating subtraction of `b` from `a`.
fn subtract(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let mut out = a.clone();

    for (po, pb) in out.pixels_mut().zip(b.pixels()) {
        po[0] = po[0].saturating_sub(pb[0]);
    }

    out
}

/// Per-pixel maximum, accumulated into `acc`.
fn accumulate_max(acc: &mut GrayImage, other: &GrayImage) {
    for (pa, po) in acc.pixels_mut().zip(other.pixels()) {
        pa[0] = pa[0].max(po[0]);
    }
}

fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    /// A white raster with a dark horizontal stroke through the middle.
    fn stroke_raster(width: u32, height: u32) -> GrayImage {
        let mut raster = GrayImage::from_pixel(width, height, Luma([255]));

        let mid = height / 2;
        for y in (mid - 2)..=(mid + 2) {
            for x in 5..(width - 5) {
                raster.put_pixel(x, y, Luma([0]));
            }
        }

        raster
    }

    #[test]
    fn test_blank_raster_gives_empty_path() {
        let raster = GrayImage::from_pixel(50, 50, Luma([255]));

        assert!(extract(&raster, &Params::default()).is_empty());
    }

    #[test]
    fn test_stroke_raster_gives_waypoints() {
        let raster = stroke_raster(80, 40);

        let path = extract(&raster, &Params::default());

        assert!(path.num_points() >= 2);
        assert!(path.is_finite());

        // All waypoints lie within the raster
        for point in &path.points_px {
            assert!(point.x >= 0.0 && point.x < 80.0);
            assert!(point.y >= 0.0 && point.y < 40.0);
        }

        // The stroke is horizontal, so the waypoints hug the stroke's row
        for point in &path.points_px {
            assert!((point.y - 20.0).abs() < 4.0);
        }
    }

    #[test]
    fn test_skeletonize_empty_mask() {
        let mask = GrayImage::new(30, 30);

        let (skeleton, num_iters) =
            skeletonize(&mask, &AtomicBool::new(false)).unwrap();

        assert_eq!(num_iters, 0);
        assert_eq!(count_foreground(&skeleton), 0);
    }

    #[test]
    fn test_skeletonize_iteration_bound() {
        // A filled square thins from its border inwards, one layer per
        // iteration
        let mut mask = GrayImage::new(64, 64);
        for y in 10..30 {
            for x in 10..30 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let (skeleton, num_iters) =
            skeletonize(&mask, &AtomicBool::new(false)).unwrap();

        assert!(num_iters <= 32);
        assert!(count_foreground(&skeleton) > 0);
    }

    #[test]
    fn test_cancelled_extraction() {
        let raster = stroke_raster(80, 40);

        let cancel = AtomicBool::new(true);

        assert!(matches!(
            extract_with_cancel(&raster, &Params::default(), &cancel),
            Err(TraceError::Cancelled)
        ));
    }
}
