use std::fmt;

use thiserror::Error;

/// The three rated dimensions of a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingField {
    Stress,
    Workload,
    Satisfaction,
}

impl RatingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stress => "stress",
            Self::Workload => "workload",
            Self::Satisfaction => "satisfaction",
        }
    }
}

impl fmt::Display for RatingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be in 1-10, got {value}")]
    RatingOutOfRange { field: RatingField, value: i64 },

    /// An integer too large to represent; still a range violation, not a format one.
    #[error("{field} must be in 1-10, got {raw}")]
    RatingOverflow { field: RatingField, raw: String },

    #[error("{field} is required")]
    Missing { field: RatingField },

    #[error("{field} must be an integer, got {raw:?}")]
    NotAnInteger { field: RatingField, raw: String },
}

impl ValidationError {
    pub fn field(&self) -> RatingField {
        match self {
            Self::RatingOutOfRange { field, .. }
            | Self::RatingOverflow { field, .. }
            | Self::Missing { field }
            | Self::NotAnInteger { field, .. } => *field,
        }
    }
}

#[derive(Error, Debug)]
pub enum WellbeingError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
