pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod store;

pub use config::WellbeingConfig;
pub use error::{RatingField, ValidationError, WellbeingError};
pub use metrics::{compute_metrics, Averages};
pub use models::{MetricsSnapshot, RecordId, RecordView, Ratings, SurveyResponse};
pub use store::{RecordOrder, SurveyStore};
