use crate::entry::{ScheduleEntry, ScheduleEntryInput};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Row-level persistence for schedule entries.
///
/// `update` and `delete` report whether a row matched; deciding what a miss
/// means is left to the caller.
pub trait EntryStore {
    fn initialize(&self) -> StorageResult<()>;
    fn insert(&self, input: &ScheduleEntryInput) -> StorageResult<i64>;
    fn fetch_all(&self) -> StorageResult<Vec<ScheduleEntry>>;
    fn fetch(&self, id: i64) -> StorageResult<Option<ScheduleEntry>>;
    fn update(&self, id: i64, input: &ScheduleEntryInput) -> StorageResult<bool>;
    fn delete(&self, id: i64) -> StorageResult<bool>;
}

pub mod sqlite;

pub use sqlite::SqliteStorage;
