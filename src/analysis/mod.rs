mod aggregation;
mod analyzer;
mod regression;
mod scenario;
mod trend;

pub use aggregation::{aggregate_year, build_series, spatial_mean};
pub use analyzer::{fit_and_forecast, simulate_greening, TrendAnalyzer, TrendReport};
pub use regression::LinearFit;
pub use scenario::{
    simulate, simulate_rates, temperature_sensitivity, ScenarioResult, SENSITIVITY_INTERCEPT,
    SENSITIVITY_SLOPE,
};
pub use trend::{ForecastPoint, MissingDataPolicy, TrendModel};
