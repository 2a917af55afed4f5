use super::{ExportError, ExportResult};
use crate::entry::{DATE_FORMAT, HexColor, ScheduleEntry, Session, TIMESTAMP_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Column order of the exported file; field names double as the header row.
#[derive(Serialize, Deserialize)]
struct EntryCsvRecord {
    id: i64,
    course_name: String,
    course_code: String,
    teacher: String,
    lesson: String,
    notes: String,
    study_date: String,
    session: String,
    color: String,
    created_at: String,
}

impl From<&ScheduleEntry> for EntryCsvRecord {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            course_name: entry.course_name.clone(),
            course_code: entry.course_code.clone(),
            teacher: entry.teacher.clone(),
            lesson: entry.lesson.clone().unwrap_or_default(),
            notes: entry.notes.clone().unwrap_or_default(),
            study_date: entry.study_date.format(DATE_FORMAT).to_string(),
            session: entry.session.as_str().to_string(),
            color: entry.color.to_string(),
            created_at: entry.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl EntryCsvRecord {
    fn into_entry(self) -> ExportResult<ScheduleEntry> {
        let id = self.id;
        let invalid =
            |what: &str, err: String| ExportError::InvalidData(format!("row {id}: invalid {what}: {err}"));

        let study_date = NaiveDate::parse_from_str(self.study_date.trim(), DATE_FORMAT)
            .map_err(|e| invalid("study_date", e.to_string()))?;
        let session = self
            .session
            .parse::<Session>()
            .map_err(|e| invalid("session", e.to_string()))?;
        let color = HexColor::parse_or_default(Some(&self.color))
            .map_err(|e| invalid("color", e.to_string()))?;
        let created_at = NaiveDateTime::parse_from_str(self.created_at.trim(), TIMESTAMP_FORMAT)
            .map_err(|e| invalid("created_at", e.to_string()))?;

        Ok(ScheduleEntry {
            id,
            course_name: self.course_name,
            course_code: self.course_code,
            teacher: self.teacher,
            lesson: parse_string_option(self.lesson),
            notes: parse_string_option(self.notes),
            study_date,
            session,
            color,
            created_at,
        })
    }
}

/// Serializes entries, in the given order, as UTF-8 CSV with a header row.
pub fn to_csv(entries: &[ScheduleEntry]) -> ExportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if entries.is_empty() {
        writer.write_record([
            "id",
            "course_name",
            "course_code",
            "teacher",
            "lesson",
            "notes",
            "study_date",
            "session",
            "color",
            "created_at",
        ])?;
    }
    for entry in entries {
        writer.serialize(EntryCsvRecord::from(entry))?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

/// Parses a file produced by [`to_csv`].
pub fn entries_from_csv(bytes: &[u8]) -> ExportResult<Vec<ScheduleEntry>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut entries = Vec::new();
    for record in reader.deserialize::<EntryCsvRecord>() {
        entries.push(record?.into_entry()?);
    }
    Ok(entries)
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
