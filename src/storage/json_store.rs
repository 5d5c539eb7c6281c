use std::{future::Future, io::ErrorKind, path::PathBuf};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

use super::entities::TrackerFileEntity;

pub const DATA_FILE_NAME: &str = "habits-data.json";

/// Interface for abstracting persistence of the tracker state.
pub trait HabitStore {
    /// Reads the persisted state. A missing file is empty state, not an error.
    fn load(&self) -> impl Future<Output = Result<Option<TrackerFileEntity>>>;

    /// Replaces the persisted state with `data`.
    fn save(&self, data: &TrackerFileEntity) -> impl Future<Output = Result<()>>;
}

/// The main realization of [HabitStore]: one pretty-printed JSON document in the application
/// state directory.
pub struct JsonStoreImpl {
    data_file: PathBuf,
}

impl JsonStoreImpl {
    pub fn new(state_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&state_dir)?;

        Ok(Self {
            data_file: state_dir.join(DATA_FILE_NAME),
        })
    }

    async fn read_contents(&self) -> Result<Option<String>, std::io::Error> {
        let file = match File::open(&self.data_file).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;
        let mut file = file;
        let mut contents = String::new();
        let read = file.read_to_string(&mut contents).await;
        file.unlock_async().await?;
        read?;
        Ok(Some(contents))
    }
}

impl HabitStore for JsonStoreImpl {
    async fn load(&self) -> Result<Option<TrackerFileEntity>> {
        let Some(contents) = self.read_contents().await? else {
            debug!("No data file at {:?}, starting empty", self.data_file);
            return Ok(None);
        };
        let data = serde_json::from_str::<TrackerFileEntity>(&contents)?;
        Ok(Some(data))
    }

    async fn save(&self, data: &TrackerFileEntity) -> Result<()> {
        let contents = serde_json::to_string_pretty(data)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.data_file)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let write = async {
            file.write_all(contents.as_bytes()).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        write?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{storage::entities::HabitEntity, tracker::habit::Habit};

    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStoreImpl::new(dir.path().to_owned())?;
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        let data = TrackerFileEntity {
            habits: vec![HabitEntity::from_habit(&Habit::new("Exercise", Some(3), now))],
            ..Default::default()
        };
        store.save(&data).await?;

        let loaded = store.load().await?;
        assert_eq!(loaded, Some(data));
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_empty_state() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStoreImpl::new(dir.path().to_owned())?;

        assert_eq!(store.load().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStoreImpl::new(dir.path().to_owned())?;
        tokio::fs::write(dir.path().join(DATA_FILE_NAME), "{not json").await?;

        assert!(store.load().await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn save_overwrites_previous_contents() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStoreImpl::new(dir.path().to_owned())?;
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        let first = TrackerFileEntity {
            habits: vec![
                HabitEntity::from_habit(&Habit::new("Exercise", Some(3), now)),
                HabitEntity::from_habit(&Habit::new("Read", None, now)),
            ],
            ..Default::default()
        };
        store.save(&first).await?;

        let second = TrackerFileEntity::default();
        store.save(&second).await?;

        assert_eq!(store.load().await?, Some(second));
        Ok(())
    }
}
