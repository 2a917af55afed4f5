pub mod calendar;
pub mod config;
pub mod entry;
pub mod export;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod persistence;
pub mod repository;
pub mod validation;

pub use calendar::{CalendarCell, CalendarDay, WeekView, week_start};
pub use config::{AppConfig, ConfigError};
pub use entry::{EntryDraft, HexColor, ScheduleEntry, ScheduleEntryInput, Session};
pub use export::{
    ExportError, ExportFormat, entries_from_csv, export_file_name, pdf_table_rows, to_csv, to_pdf,
};
pub use persistence::{EntryStore, SqliteStorage, StorageError};
pub use repository::{ScheduleError, ScheduleRepository};
pub use validation::ValidationError;
