use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RatingField, ValidationError};

pub type RecordId = i64;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SurveyResponse {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub stress: i64,
    pub workload: i64,
    pub satisfaction: i64,
    pub notes: Option<String>,
}

impl SurveyResponse {
    pub fn view(&self) -> RecordView {
        RecordView::from(self)
    }
}

/// JSON shape of a stored response: ISO-8601 timestamp, notes never null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: RecordId,
    pub created_at: String,
    pub stress: i64,
    pub workload: i64,
    pub satisfaction: i64,
    pub notes: String,
}

impl From<&SurveyResponse> for RecordView {
    fn from(r: &SurveyResponse) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            stress: r.stress,
            workload: r.workload,
            satisfaction: r.satisfaction,
            notes: r.notes.clone().unwrap_or_default(),
        }
    }
}

/// A stress/workload/satisfaction triple known to be within range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratings {
    stress: i64,
    workload: i64,
    satisfaction: i64,
}

impl Ratings {
    pub fn new(stress: i64, workload: i64, satisfaction: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            stress: check_rating(RatingField::Stress, stress)?,
            workload: check_rating(RatingField::Workload, workload)?,
            satisfaction: check_rating(RatingField::Satisfaction, satisfaction)?,
        })
    }

    pub fn stress(&self) -> i64 {
        self.stress
    }

    pub fn workload(&self) -> i64 {
        self.workload
    }

    pub fn satisfaction(&self) -> i64 {
        self.satisfaction
    }
}

pub fn check_rating(field: RatingField, value: i64) -> Result<i64, ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::RatingOutOfRange { field, value })
    }
}

/// Parse a raw form value for `field`: it must be present, an integer, and in range.
pub fn parse_rating(field: RatingField, raw: Option<&str>) -> Result<i64, ValidationError> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Err(ValidationError::Missing { field }),
    };
    let value = raw.parse::<i64>().map_err(|_| {
        if is_integer_literal(raw) {
            ValidationError::RatingOverflow {
                field,
                raw: raw.to_string(),
            }
        } else {
            ValidationError::NotAnInteger {
                field,
                raw: raw.to_string(),
            }
        }
    })?;
    check_rating(field, value)
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(&['+', '-'][..]).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
