//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value between the given minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle in degrees into the range [0, 360).
///
/// Headings are accumulated without wrapping during simulation, this is used
/// when presenting them.
pub fn wrap_deg_360<T>(angle_deg: T) -> T
where
    T: Float,
{
    rem_euclid(angle_deg, T::from(360.0).unwrap())
}

/// Build a normalised Gaussian kernel of the given width.
///
/// The kernel is centred on the middle element, so `width` should be odd.
pub fn gaussian_kernel(width: usize, sigma: f64) -> Vec<f64> {
    let half = (width as isize - 1) / 2;

    let mut kernel: Vec<f64> = (0..width as isize)
        .map(|i| {
            let offset = (i - half) as f64;
            (-offset * offset / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }

    kernel
}

/// Convolve an open-ended sequence with the given kernel.
///
/// The sequence is not wrapped at the ends. Where the kernel overhangs the
/// sequence the remaining weights are renormalised, so the output has the
/// same length as the input.
pub fn smooth_open(values: &[f64], kernel: &[f64]) -> Vec<f64> {
    let half = (kernel.len() as isize - 1) / 2;

    (0..values.len() as isize)
        .map(|i| {
            let mut sum = 0f64;
            let mut weight = 0f64;

            for (k, coeff) in kernel.iter().enumerate() {
                let j = i + k as isize - half;
                if j >= 0 && j < values.len() as isize {
                    sum += values[j as usize] * coeff;
                    weight += coeff;
                }
            }

            sum / weight
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5f64, &0f64, &10f64), 5f64);
        assert_eq!(clamp(&-1f64, &0f64, &10f64), 0f64);
        assert_eq!(clamp(&11f64, &0f64, &10f64), 10f64);
    }

    #[test]
    fn test_wrap_deg_360() {
        assert_eq!(wrap_deg_360(0f64), 0f64);
        assert_eq!(wrap_deg_360(360f64), 0f64);
        assert_eq!(wrap_deg_360(450f64), 90f64);
        assert_eq!(wrap_deg_360(-90f64), 270f64);
        assert_eq!(wrap_deg_360(-720f64), 0f64);
    }

    #[test]
    fn test_gaussian_kernel_normalised() {
        let kernel = gaussian_kernel(5, 1.5);

        assert_eq!(kernel.len(), 5);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);

        // Symmetric about the central element
        assert!((kernel[0] - kernel[4]).abs() < 1e-12);
        assert!((kernel[1] - kernel[3]).abs() < 1e-12);
        assert!(kernel[2] > kernel[1]);
    }

    #[test]
    fn test_smooth_open() {
        let kernel = gaussian_kernel(5, 1.5);

        // A constant sequence is unchanged by smoothing, including at the
        // open ends
        let constant = vec![3.0; 10];
        for value in smooth_open(&constant, &kernel) {
            assert!((value - 3.0).abs() < 1e-12);
        }

        // Length is preserved for sequences shorter than the kernel
        assert_eq!(smooth_open(&[1.0, 2.0], &kernel).len(), 2);
    }
}
