pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod retrieval;
pub mod visualization;

#[cfg(feature = "web")]
pub mod web;

pub use analysis::{
    fit_and_forecast, simulate_greening, ForecastPoint, MissingDataPolicy, ScenarioResult,
    TrendAnalyzer, TrendModel, TrendReport,
};
pub use config::AnalysisConfig;
pub use error::TrendError;
pub use io::{SeriesReader, SeriesWriter};
pub use models::{AnalysisSession, Band, BoundingBox, Observation, ObservationSeries, RasterSample};
pub use retrieval::{collect_series, BandProvider};
