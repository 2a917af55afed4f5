use crate::entry::{ScheduleEntry, ScheduleEntryInput};
use crate::persistence::{EntryStore, SqliteStorage, StorageError};
use crate::validation::ValidationError;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("schedule {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Typed CRUD over a schedule store.
///
/// Every input is validated here before the store sees it.
pub struct ScheduleRepository<S: EntryStore = SqliteStorage> {
    store: S,
}

impl<S: EntryStore> ScheduleRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create(&self, input: &ScheduleEntryInput) -> ScheduleResult<i64> {
        let input = Self::checked(input)?;
        let id = self.store.insert(&input)?;
        info!(id, course = %input.course_name, date = %input.study_date, session = %input.session, "created schedule entry");
        Ok(id)
    }

    pub fn list_all(&self) -> ScheduleResult<Vec<ScheduleEntry>> {
        let entries = self.store.fetch_all()?;
        debug!(count = entries.len(), "listed schedule entries");
        Ok(entries)
    }

    pub fn get(&self, id: i64) -> ScheduleResult<ScheduleEntry> {
        self.store.fetch(id)?.ok_or(ScheduleError::NotFound(id))
    }

    pub fn update(&self, id: i64, input: &ScheduleEntryInput) -> ScheduleResult<()> {
        let input = Self::checked(input)?;
        if !self.store.update(id, &input)? {
            warn!(id, "update skipped: schedule entry not found");
            return Err(ScheduleError::NotFound(id));
        }
        info!(id, "updated schedule entry");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> ScheduleResult<()> {
        if !self.store.delete(id)? {
            warn!(id, "delete skipped: schedule entry not found");
            return Err(ScheduleError::NotFound(id));
        }
        info!(id, "deleted schedule entry");
        Ok(())
    }

    fn checked(input: &ScheduleEntryInput) -> ScheduleResult<ScheduleEntryInput> {
        if let Err(err) = input.validate() {
            warn!(error = %err, "rejected schedule input");
            return Err(err.into());
        }
        Ok(input.normalized())
    }
}

impl ScheduleRepository<SqliteStorage> {
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> ScheduleResult<Self> {
        Ok(Self::new(SqliteStorage::open(path)?))
    }

    pub fn in_memory() -> ScheduleResult<Self> {
        Ok(Self::new(SqliteStorage::in_memory()?))
    }
}
