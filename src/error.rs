use thiserror::Error;

/// Errors that can occur in vegetation/temperature trend analysis.
#[derive(Error, Debug)]
pub enum TrendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No data: every year in {first_year}..={last_year} is missing")]
    AllYearsMissing { first_year: i32, last_year: i32 },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<calamine::Error> for TrendError {
    fn from(e: calamine::Error) -> Self {
        TrendError::Excel(e.to_string())
    }
}

impl From<calamine::XlsxError> for TrendError {
    fn from(e: calamine::XlsxError) -> Self {
        TrendError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for TrendError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        TrendError::Excel(e.to_string())
    }
}

impl From<toml::de::Error> for TrendError {
    fn from(e: toml::de::Error) -> Self {
        TrendError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = TrendError::from(io_err);
        let msg = err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_insufficient_data_display() {
        let err = TrendError::InsufficientData("need 2 observations".to_string());
        assert_eq!(err.to_string(), "Insufficient data: need 2 observations");
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = TrendError::InvalidArgument("horizon must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: horizon must be positive");
    }

    #[test]
    fn test_all_years_missing_display() {
        let err = TrendError::AllYearsMissing {
            first_year: 2002,
            last_year: 2011,
        };
        assert_eq!(
            err.to_string(),
            "No data: every year in 2002..=2011 is missing"
        );
    }

    #[test]
    fn test_json_error_from_conversion() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("not valid json{{{");
        let trend_err: TrendError = result.unwrap_err().into();
        assert!(matches!(trend_err, TrendError::Json(_)));
        assert!(trend_err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_toml_error_from_conversion() {
        let result: Result<toml::Value, _> = toml::from_str("start_year = = 3");
        let trend_err: TrendError = result.unwrap_err().into();
        assert!(matches!(trend_err, TrendError::Config(_)));
    }

    #[test]
    fn test_error_is_debug() {
        let err = TrendError::ParseError("test".to_string());
        assert!(format!("{:?}", err).contains("ParseError"));
    }
}
