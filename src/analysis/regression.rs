use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::TrendError;

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Closed-form ordinary least squares for a single regressor.
    ///
    /// When every `x` is identical the slope is 0 and the intercept is the mean
    /// of `y` (the minimum-norm least-squares solution).
    ///
    /// # Examples
    ///
    /// ```
    /// use greening_trends::analysis::LinearFit;
    ///
    /// let fit = LinearFit::ols(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
    /// assert!((fit.slope - 2.0).abs() < 1e-12);
    /// assert!((fit.intercept - 1.0).abs() < 1e-12);
    /// ```
    pub fn ols(xs: &[f64], ys: &[f64]) -> Result<Self, TrendError> {
        if xs.len() != ys.len() {
            return Err(TrendError::ValidationError(format!(
                "Regression inputs differ in length: {} x values, {} y values",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(TrendError::InsufficientData(format!(
                "Need at least 2 points for a linear fit, got {}",
                xs.len()
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(TrendError::ValidationError(
                "Regression inputs must be finite".to_string(),
            ));
        }

        let x_mean = xs.mean();
        let y_mean = ys.mean();

        let (sxy, sxx) = xs
            .iter()
            .zip(ys)
            .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
                let dx = x - x_mean;
                (sxy + dx * (y - y_mean), sxx + dx * dx)
            });

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Ok(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

impl std::fmt::Display for LinearFit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "y = {:.6}·x {:+.6}", self.slope, self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_exact_line() {
        let fit = LinearFit::ols(&[2002.0, 2003.0, 2004.0], &[0.50, 0.55, 0.60]).unwrap();
        assert_approx_eq!(fit.slope, 0.05, 1e-9);
        assert_approx_eq!(fit.intercept, -99.6, 1e-6);
        assert_approx_eq!(fit.predict(2005.0), 0.65, 1e-9);
    }

    #[test]
    fn test_noisy_fit() {
        // x mean 2, y mean 4.5, sxy 4.5, sxx 2
        let fit = LinearFit::ols(&[1.0, 2.0, 3.0], &[2.0, 5.0, 6.5]).unwrap();
        assert_approx_eq!(fit.slope, 2.25, 1e-12);
        assert_approx_eq!(fit.intercept, 0.0, 1e-12);
    }

    #[test]
    fn test_negative_slope() {
        let fit = LinearFit::ols(&[0.5, 0.55, 0.6], &[20.0, 19.0, 18.0]).unwrap();
        assert_approx_eq!(fit.slope, -20.0, 1e-9);
        assert_approx_eq!(fit.intercept, 30.0, 1e-9);
    }

    #[test]
    fn test_constant_x_gives_flat_line() {
        let fit = LinearFit::ols(&[0.5, 0.5, 0.5], &[18.0, 19.0, 20.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_approx_eq!(fit.intercept, 19.0, 1e-12);
    }

    #[test]
    fn test_insufficient_points() {
        assert!(matches!(
            LinearFit::ols(&[1.0], &[2.0]),
            Err(TrendError::InsufficientData(_))
        ));
        assert!(matches!(
            LinearFit::ols(&[], &[]),
            Err(TrendError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            LinearFit::ols(&[1.0, 2.0], &[2.0]),
            Err(TrendError::ValidationError(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(LinearFit::ols(&[1.0, 2.0], &[f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn test_deterministic() {
        let xs = [2002.0, 2003.0, 2004.0, 2005.0];
        let ys = [0.55, 0.53, 0.57, 0.52];
        let a = LinearFit::ols(&xs, &ys).unwrap();
        let b = LinearFit::ols(&xs, &ys).unwrap();
        assert_eq!(a, b);
    }
}
