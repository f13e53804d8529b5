use serde::{Deserialize, Serialize};

use crate::analysis::{
    simulate, simulate_rates, ForecastPoint, MissingDataPolicy, ScenarioResult, TrendModel,
};
use crate::error::TrendError;
use crate::models::ObservationSeries;

/// Fit a trend model and forecast `horizon_years` years past the last observed year.
pub fn fit_and_forecast(
    series: &ObservationSeries,
    horizon_years: u32,
    policy: MissingDataPolicy,
) -> Result<Vec<ForecastPoint>, TrendError> {
    TrendModel::fit(series, policy)?.forecast(horizon_years)
}

/// Re-fit a trend model and simulate a vegetation increase for `target_year`.
pub fn simulate_greening(
    series: &ObservationSeries,
    target_year: i32,
    increase_rate: f64,
    policy: MissingDataPolicy,
) -> Result<ScenarioResult, TrendError> {
    let model = TrendModel::fit(series, policy)?;
    simulate(&model, target_year, increase_rate)
}

/// Everything computed for one series: the fitted model, its inputs, the forecast
/// and any greening scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub model: TrendModel,
    pub observations: ObservationSeries,
    pub forecast: Vec<ForecastPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioResult>,
}

/// Unified analysis API over one observation series and missing-data policy.
pub struct TrendAnalyzer<'a> {
    series: &'a ObservationSeries,
    policy: MissingDataPolicy,
}

impl<'a> TrendAnalyzer<'a> {
    pub fn new(series: &'a ObservationSeries, policy: MissingDataPolicy) -> Self {
        Self { series, policy }
    }

    pub fn series(&self) -> &ObservationSeries {
        self.series
    }

    /// Fit the chained year → index → temperature model.
    pub fn model(&self) -> Result<TrendModel, TrendError> {
        TrendModel::fit(self.series, self.policy)
    }

    pub fn forecast(&self, horizon_years: u32) -> Result<Vec<ForecastPoint>, TrendError> {
        fit_and_forecast(self.series, horizon_years, self.policy)
    }

    pub fn simulate(&self, target_year: i32, increase_rate: f64) -> Result<ScenarioResult, TrendError> {
        simulate_greening(self.series, target_year, increase_rate, self.policy)
    }

    /// Fit once, forecast, and run a scenario for each of `rates` at `target_year`.
    pub fn report(
        &self,
        horizon_years: u32,
        target_year: Option<i32>,
        rates: &[f64],
    ) -> Result<TrendReport, TrendError> {
        let model = self.model()?;
        let forecast = model.forecast(horizon_years)?;
        let scenarios = match target_year {
            Some(year) => simulate_rates(&model, year, rates)?,
            None => Vec::new(),
        };
        Ok(TrendReport {
            model,
            observations: self.series.clone(),
            forecast,
            scenarios,
        })
    }
}
