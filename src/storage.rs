use crate::clock::{date_string, parse_date_string};
use crate::errors::AppError;
use crate::models::{Profile, TaskDefinition};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{collections::BTreeMap, env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    UserData,
    TaskList,
    TrackingStartDate,
    CompletedTaskIndexes,
    LastOpenDate,
}

impl StorageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserData => "userData",
            Self::TaskList => "taskList",
            Self::TrackingStartDate => "trackingStartDate",
            Self::CompletedTaskIndexes => "completedTaskIndexes",
            Self::LastOpenDate => "lastOpenDate",
        }
    }
}

pub trait KeyValueStore {
    fn get(&self, key: StorageKey) -> Option<&str>;
    fn set(&mut self, key: StorageKey, value: String);
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    pub entries: BTreeMap<String, String>,
}

impl KeyValueStore for StoreData {
    fn get(&self, key: StorageKey) -> Option<&str> {
        self.entries.get(key.as_str()).map(String::as_str)
    }

    fn set(&mut self, key: StorageKey, value: String) {
        self.entries.insert(key.as_str().to_string(), value);
    }
}

/// Typed accessors over the raw store. Every value is JSON encoded.
pub trait Records: KeyValueStore {
    fn read_json<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, AppError> {
        self.get(key)
            .map(serde_json::from_str::<T>)
            .transpose()
            .map_err(AppError::from)
    }

    fn write_json<T: Serialize + ?Sized>(
        &mut self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), AppError> {
        let encoded = serde_json::to_string(value)?;
        self.set(key, encoded);
        Ok(())
    }

    fn has_profile(&self) -> bool {
        self.get(StorageKey::UserData).is_some()
    }

    fn has_task_list(&self) -> bool {
        self.get(StorageKey::TaskList).is_some()
    }

    fn profile(&self) -> Result<Option<Profile>, AppError> {
        self.read_json(StorageKey::UserData)
    }

    fn set_profile(&mut self, profile: &Profile) -> Result<(), AppError> {
        self.write_json(StorageKey::UserData, profile)
    }

    fn task_list(&self) -> Result<Option<Vec<TaskDefinition>>, AppError> {
        self.read_json(StorageKey::TaskList)
    }

    fn set_task_list(&mut self, tasks: &[TaskDefinition]) -> Result<(), AppError> {
        self.write_json(StorageKey::TaskList, tasks)
    }

    fn tracking_start_date(&self) -> Result<Option<NaiveDate>, AppError> {
        self.read_date(StorageKey::TrackingStartDate)
    }

    fn set_tracking_start_date(&mut self, date: NaiveDate) -> Result<(), AppError> {
        self.write_json(StorageKey::TrackingStartDate, &date_string(date))
    }

    fn last_open_date(&self) -> Result<Option<NaiveDate>, AppError> {
        self.read_date(StorageKey::LastOpenDate)
    }

    fn set_last_open_date(&mut self, date: NaiveDate) -> Result<(), AppError> {
        self.write_json(StorageKey::LastOpenDate, &date_string(date))
    }

    fn completed_task_indexes(&self) -> Result<Vec<usize>, AppError> {
        Ok(self
            .read_json(StorageKey::CompletedTaskIndexes)?
            .unwrap_or_default())
    }

    fn set_completed_task_indexes(&mut self, indexes: &[usize]) -> Result<(), AppError> {
        self.write_json(StorageKey::CompletedTaskIndexes, indexes)
    }

    fn read_date(&self, key: StorageKey) -> Result<Option<NaiveDate>, AppError> {
        self.read_json::<String>(key)?
            .map(|value| parse_date_string(&value))
            .transpose()
    }
}

impl<S: KeyValueStore + ?Sized> Records for S {}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_data(path: &Path) -> StoreData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                StoreData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            StoreData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
