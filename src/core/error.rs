use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("expected {expected} asset series (one per allocation), got {actual}")]
    SeriesLengthMismatch { expected: usize, actual: usize },

    #[error("portfolio has no assets")]
    EmptyPortfolio,

    #[error("horizon must be at least one year, got {years}")]
    InvalidHorizon { years: u32 },

    #[error("end year {end_year} must be >= start year {start_year} + horizon {years}")]
    InvalidRange {
        start_year: u32,
        end_year: u32,
        years: u32,
    },

    #[error("series '{series}' has no data for {year}-{month:02}")]
    InsufficientData {
        series: String,
        year: u32,
        month: u32,
    },

    #[error("series '{series}' is not contiguous monthly data at index {index}")]
    NonContiguousSeries { series: String, index: usize },

    #[error("portfolio allocations sum to zero; nothing to simulate")]
    ZeroPortfolioValue,

    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl SimulationError {
    pub fn insufficient_data(series: impl Into<String>, year: u32, month: u32) -> Self {
        Self::InsufficientData {
            series: series.into(),
            year,
            month,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
