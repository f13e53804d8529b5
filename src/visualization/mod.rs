mod charts;
mod tables;

pub use charts::{format_trend_chart, print_trend_chart};
pub use tables::{
    format_forecast_table, format_model_summary, format_observation_table, format_scenario_table,
    print_forecast_table, print_model_summary, print_observation_table, print_scenario_table,
};
