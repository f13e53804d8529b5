mod bbox;
mod observation;
mod raster;
mod session;

pub use bbox::BoundingBox;
pub use observation::{year_span, Observation, ObservationSeries};
pub use raster::{Band, RasterSample, KELVIN_OFFSET};
pub use session::AnalysisSession;
