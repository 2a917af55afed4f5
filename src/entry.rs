use crate::validation::{self, ValidationError, ValidationResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_COLOR: &str = "#4CAF50";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One of the three fixed daily study blocks, in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Session {
    Morning,
    Afternoon,
    Evening,
}

impl Session {
    pub const ALL: [Session; 3] = [Session::Morning, Session::Afternoon, Session::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Morning => "Morning",
            Session::Afternoon => "Afternoon",
            Session::Evening => "Evening",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Session {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Session::ALL
            .into_iter()
            .find(|session| session.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::InvalidSession(s.to_string()))
    }
}

/// A `#RRGGBB` color, normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank input falls back to the default color.
    pub fn parse_or_default(value: Option<&str>) -> ValidationResult<Self> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.parse(),
            None => Ok(Self::default()),
        }
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

impl FromStr for HexColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidColor(s.to_string());
        let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };
        Ok(Self(format!("#{}", expanded.to_ascii_uppercase())))
    }
}

impl TryFrom<String> for HexColor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: i64,
    pub course_name: String,
    pub course_code: String,
    pub teacher: String,
    pub lesson: Option<String>,
    pub notes: Option<String>,
    pub study_date: NaiveDate,
    pub session: Session,
    pub color: HexColor,
    pub created_at: NaiveDateTime,
}

impl ScheduleEntry {
    /// The mutable part of the entry, e.g. to prefill an edit form.
    pub fn to_input(&self) -> ScheduleEntryInput {
        ScheduleEntryInput {
            course_name: self.course_name.clone(),
            course_code: self.course_code.clone(),
            teacher: self.teacher.clone(),
            lesson: self.lesson.clone(),
            notes: self.notes.clone(),
            study_date: self.study_date,
            session: self.session,
            color: self.color.clone(),
        }
    }
}

/// Typed input for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntryInput {
    pub course_name: String,
    pub course_code: String,
    pub teacher: String,
    pub lesson: Option<String>,
    pub notes: Option<String>,
    pub study_date: NaiveDate,
    pub session: Session,
    #[serde(default)]
    pub color: HexColor,
}

impl ScheduleEntryInput {
    pub fn new(
        course_name: impl Into<String>,
        course_code: impl Into<String>,
        teacher: impl Into<String>,
        study_date: NaiveDate,
        session: Session,
    ) -> Self {
        Self {
            course_name: course_name.into(),
            course_code: course_code.into(),
            teacher: teacher.into(),
            lesson: None,
            notes: None,
            study_date,
            session,
            color: HexColor::default(),
        }
    }

    pub fn with_lesson(mut self, lesson: impl Into<String>) -> Self {
        self.lesson = Some(lesson.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_color(mut self, color: HexColor) -> Self {
        self.color = color;
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_input(self)
    }

    /// Trimmed copy with blank optional text dropped.
    pub(crate) fn normalized(&self) -> Self {
        Self {
            course_name: self.course_name.trim().to_string(),
            course_code: self.course_code.trim().to_string(),
            teacher: self.teacher.trim().to_string(),
            lesson: validation::optional_text(self.lesson.as_deref()),
            notes: validation::optional_text(self.notes.as_deref()),
            study_date: self.study_date,
            session: self.session,
            color: self.color.clone(),
        }
    }
}

/// Raw form data as submitted by a presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryDraft {
    pub course_name: String,
    pub course_code: String,
    pub teacher: String,
    pub lesson: Option<String>,
    pub notes: Option<String>,
    pub study_date: String,
    pub session: String,
    pub color: Option<String>,
}

impl TryFrom<EntryDraft> for ScheduleEntryInput {
    type Error = ValidationError;

    fn try_from(draft: EntryDraft) -> Result<Self, Self::Error> {
        let course_name = validation::require_text("course_name", &draft.course_name)?;
        let course_code = validation::require_text("course_code", &draft.course_code)?;
        let teacher = validation::require_text("teacher", &draft.teacher)?;
        let raw_date = validation::require_text("study_date", &draft.study_date)?;
        let study_date = parse_study_date(&raw_date)?;
        let raw_session = validation::require_text("session", &draft.session)?;
        let session = raw_session.parse::<Session>()?;
        let color = HexColor::parse_or_default(draft.color.as_deref())?;

        Ok(Self {
            course_name,
            course_code,
            teacher,
            lesson: validation::optional_text(draft.lesson.as_deref()),
            notes: validation::optional_text(draft.notes.as_deref()),
            study_date,
            session,
            color,
        })
    }
}

/// Parses `YYYY-MM-DD`, limited to years 0001 through 9999.
pub fn parse_study_date(input: &str) -> ValidationResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|e| {
        ValidationError::InvalidDate {
            value: input.to_string(),
            reason: e.to_string(),
        }
    })?;
    validation::check_study_year(date, input)
}
