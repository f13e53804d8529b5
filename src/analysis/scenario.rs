use serde::{Deserialize, Serialize};

use crate::analysis::TrendModel;
use crate::error::TrendError;

/// Slope of the empirical sensitivity line.
pub const SENSITIVITY_SLOPE: f64 = -32.3515;
/// Intercept of the empirical sensitivity line, in °C per unit NDVI.
pub const SENSITIVITY_INTERCEPT: f64 = 46.1069;

/// Empirical temperature sensitivity at a given vegetation level, in °C per unit
/// vegetation-index change. Denser vegetation gives a smaller marginal effect.
///
/// Deliberately independent of the fitted `index_to_temp` slope.
pub fn temperature_sensitivity(vegetation_index: f64) -> f64 {
    SENSITIVITY_SLOPE * vegetation_index + SENSITIVITY_INTERCEPT
}

/// Baseline vs. greened outcome for one target year and one increase rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub target_year: i32,
    pub increase_rate: f64,
    pub baseline_index: f64,
    pub baseline_temperature: f64,
    pub scenario_index: f64,
    pub scenario_temperature: f64,
    pub sensitivity: f64,
    pub delta_index: f64,
    pub delta_temperature: f64,
}

/// Simulate raising the baseline vegetation index of `target_year` by `increase_rate`
/// (0.05 = +5%).
///
/// # Examples
///
/// ```
/// use greening_trends::{MissingDataPolicy, ObservationSeries};
/// use greening_trends::analysis::{simulate, TrendModel};
///
/// let series = ObservationSeries::from_columns(
///     &[2002, 2003, 2004],
///     &[0.50, 0.55, 0.60],
///     &[20.0, 19.0, 18.0],
/// ).unwrap();
/// let model = TrendModel::fit(&series, MissingDataPolicy::Exclude).unwrap();
/// let result = simulate(&model, 2005, 0.10).unwrap();
/// assert!((result.scenario_index - 0.715).abs() < 1e-9);
/// assert!((result.delta_temperature - 1.6301).abs() < 1e-3);
/// ```
pub fn simulate(
    model: &TrendModel,
    target_year: i32,
    increase_rate: f64,
) -> Result<ScenarioResult, TrendError> {
    if !increase_rate.is_finite() || increase_rate <= -1.0 {
        return Err(TrendError::InvalidArgument(format!(
            "Increase rate must be a finite value greater than -1, got {increase_rate}"
        )));
    }

    let baseline_index = model.predict_index(target_year);
    let baseline_temperature = model.predict_temperature(baseline_index);
    let scenario_index = baseline_index * (1.0 + increase_rate);
    let sensitivity = temperature_sensitivity(baseline_index);
    let delta_index = scenario_index - baseline_index;
    let scenario_temperature = baseline_temperature + sensitivity * delta_index;

    Ok(ScenarioResult {
        target_year,
        increase_rate,
        baseline_index,
        baseline_temperature,
        scenario_index,
        scenario_temperature,
        sensitivity,
        delta_index,
        delta_temperature: scenario_temperature - baseline_temperature,
    })
}

/// Evaluate several increase rates for the same target year, in the order given.
pub fn simulate_rates(
    model: &TrendModel,
    target_year: i32,
    rates: &[f64],
) -> Result<Vec<ScenarioResult>, TrendError> {
    rates
        .iter()
        .map(|&rate| simulate(model, target_year, rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MissingDataPolicy;
    use crate::models::ObservationSeries;
    use assert_approx_eq::assert_approx_eq;

    fn model() -> TrendModel {
        let series = ObservationSeries::from_columns(
            &[2002, 2003, 2004],
            &[0.50, 0.55, 0.60],
            &[20.0, 19.0, 18.0],
        )
        .unwrap();
        TrendModel::fit(&series, MissingDataPolicy::Exclude).unwrap()
    }

    #[test]
    fn test_sensitivity_constants() {
        assert_approx_eq!(temperature_sensitivity(0.0), 46.1069, 1e-12);
        assert_approx_eq!(temperature_sensitivity(0.65), 25.078425, 1e-9);
        assert!(temperature_sensitivity(0.8) < temperature_sensitivity(0.2));
    }

    #[test]
    fn test_worked_example() {
        let result = simulate(&model(), 2005, 0.10).unwrap();
        assert_eq!(result.target_year, 2005);
        assert_approx_eq!(result.baseline_index, 0.65, 1e-9);
        assert_approx_eq!(result.baseline_temperature, 17.0, 1e-6);
        assert_approx_eq!(result.scenario_index, 0.715, 1e-9);
        assert_approx_eq!(result.sensitivity, 25.078425, 1e-6);
        assert_approx_eq!(result.delta_index, 0.065, 1e-9);
        assert_approx_eq!(result.scenario_temperature, 18.630098, 1e-5);
        assert_approx_eq!(result.delta_temperature, 1.630098, 1e-5);
    }

    #[test]
    fn test_scenario_uses_empirical_sensitivity_not_fitted_slope() {
        let m = model();
        let result = simulate(&m, 2005, 0.10).unwrap();
        let via_fitted_slope =
            result.baseline_temperature + m.index_to_temp.slope * result.delta_index;
        // Fitted γ = -20 would cool; the empirical sensitivity is positive here
        assert!(via_fitted_slope < result.baseline_temperature);
        assert!((result.scenario_temperature - via_fitted_slope).abs() > 1.0);
    }

    #[test]
    fn test_zero_rate_is_baseline() {
        let result = simulate(&model(), 2010, 0.0).unwrap();
        assert_eq!(result.scenario_index, result.baseline_index);
        assert_eq!(result.delta_temperature, 0.0);
    }

    #[test]
    fn test_invalid_rates() {
        let m = model();
        assert!(matches!(
            simulate(&m, 2005, -1.5),
            Err(TrendError::InvalidArgument(_))
        ));
        assert!(simulate(&m, 2005, -1.0).is_err());
        assert!(simulate(&m, 2005, f64::NAN).is_err());
        assert!(simulate(&m, 2005, -0.5).is_ok());
    }

    #[test]
    fn test_monotonic_in_rate() {
        let m = model();
        let results = simulate_rates(&m, 2008, &[0.0, 0.05, 0.10, 0.25, 0.5]).unwrap();
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(pair[1].scenario_index > pair[0].scenario_index);
        }
        for r in &results[1..] {
            assert!(r.delta_index > 0.0);
        }
    }

    #[test]
    fn test_simulate_rates_stops_on_invalid() {
        assert!(simulate_rates(&model(), 2008, &[0.05, -2.0]).is_err());
    }

    #[test]
    fn test_deterministic() {
        let m = model();
        assert_eq!(simulate(&m, 2020, 0.2).unwrap(), simulate(&m, 2020, 0.2).unwrap());
    }
}
