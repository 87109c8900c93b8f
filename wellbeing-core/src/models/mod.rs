pub mod metrics;
pub mod survey;

pub use metrics::MetricsSnapshot;
pub use survey::{RecordId, RecordView, Ratings, SurveyResponse};
