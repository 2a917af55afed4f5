use crate::entry::ScheduleEntryInput;
use chrono::{Datelike, NaiveDate};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Years whose ISO text form is exactly `YYYY`, so stored dates sort as text.
pub const STUDY_YEARS: RangeInclusive<i32> = 1..=9999;

/// Input rejected before anything is written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid session '{0}' (expected Morning, Afternoon or Evening)")]
    InvalidSession(String),
    #[error("invalid study date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },
    #[error("invalid color '{0}' (expected #RRGGBB)")]
    InvalidColor(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub(crate) fn require_text(field: &'static str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

pub(crate) fn check_study_year(date: NaiveDate, raw: &str) -> ValidationResult<NaiveDate> {
    if STUDY_YEARS.contains(&date.year()) {
        Ok(date)
    } else {
        Err(ValidationError::InvalidDate {
            value: raw.to_string(),
            reason: format!(
                "year must be between {} and {}",
                STUDY_YEARS.start(),
                STUDY_YEARS.end()
            ),
        })
    }
}

pub fn validate_input(input: &ScheduleEntryInput) -> ValidationResult<()> {
    require_text("course_name", &input.course_name)?;
    require_text("course_code", &input.course_code)?;
    require_text("teacher", &input.teacher)?;
    check_study_year(input.study_date, &input.study_date.to_string())?;
    Ok(())
}
