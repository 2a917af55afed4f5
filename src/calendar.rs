use crate::entry::{ScheduleEntry, Session};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

pub const DAYS_PER_WEEK: usize = 7;

/// Monday of the week containing `reference`.
///
/// Saturates at `NaiveDate::MIN` instead of overflowing.
pub fn week_start(reference: NaiveDate) -> NaiveDate {
    let back = Days::new(u64::from(reference.weekday().num_days_from_monday()));
    reference.checked_sub_days(back).unwrap_or(NaiveDate::MIN)
}

/// The seven dates Monday..Sunday of the week containing `reference`.
///
/// Days past `NaiveDate::MAX` repeat the last representable date.
pub fn week_dates(reference: NaiveDate) -> [NaiveDate; DAYS_PER_WEEK] {
    let start = week_start(reference);
    std::array::from_fn(|offset| {
        start
            .checked_add_days(Days::new(offset as u64))
            .unwrap_or(NaiveDate::MAX)
    })
}

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One (day, session) slot of the week grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CalendarCell {
    Free {
        session: Session,
    },
    Occupied {
        session: Session,
        entries: Vec<ScheduleEntry>,
    },
}

impl CalendarCell {
    pub fn session(&self) -> Session {
        match self {
            CalendarCell::Free { session } | CalendarCell::Occupied { session, .. } => *session,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, CalendarCell::Free { .. })
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        match self {
            CalendarCell::Free { .. } => &[],
            CalendarCell::Occupied { entries, .. } => entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day: &'static str,
    pub date: NaiveDate,
    pub date_label: String,
    pub cells: Vec<CalendarCell>,
}

impl CalendarDay {
    pub fn cell(&self, session: Session) -> &CalendarCell {
        // cells are built in Session::ALL order
        &self.cells[session as usize]
    }
}

/// Week grid: 7 days × 3 sessions, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekView {
    pub week_start: NaiveDate,
    pub range_label: String,
    pub days: Vec<CalendarDay>,
}

impl WeekView {
    pub fn project(reference: NaiveDate, entries: &[ScheduleEntry]) -> Self {
        let dates = week_dates(reference);
        let days = dates
            .iter()
            .map(|&date| CalendarDay {
                day: day_name(date.weekday()),
                date,
                date_label: date.format("%m/%d").to_string(),
                cells: Session::ALL
                    .into_iter()
                    .map(|session| Self::cell_for(date, session, entries))
                    .collect(),
            })
            .collect();

        Self {
            week_start: dates[0],
            range_label: range_label(dates[0], dates[DAYS_PER_WEEK - 1]),
            days,
        }
    }

    pub fn week_end(&self) -> NaiveDate {
        self.days
            .last()
            .map_or(self.week_start, |day| day.date)
    }

    pub fn day(&self, weekday: Weekday) -> &CalendarDay {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn cell(&self, weekday: Weekday, session: Session) -> &CalendarCell {
        self.day(weekday).cell(session)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&CalendarDay, &CalendarCell)> {
        self.days
            .iter()
            .flat_map(|day| day.cells.iter().map(move |cell| (day, cell)))
    }

    pub fn free_cell_count(&self) -> usize {
        self.cells().filter(|(_, cell)| cell.is_free()).count()
    }

    fn cell_for(date: NaiveDate, session: Session, entries: &[ScheduleEntry]) -> CalendarCell {
        let matching: Vec<ScheduleEntry> = entries
            .iter()
            .filter(|entry| entry.study_date == date && entry.session == session)
            .cloned()
            .collect();
        if matching.is_empty() {
            CalendarCell::Free { session }
        } else {
            CalendarCell::Occupied {
                session,
                entries: matching,
            }
        }
    }
}

fn range_label(start: NaiveDate, end: NaiveDate) -> String {
    if start.year() == end.year() {
        format!("{} - {}", start.format("%B %d"), end.format("%B %d, %Y"))
    } else {
        format!("{} - {}", start.format("%B %d, %Y"), end.format("%B %d, %Y"))
    }
}
