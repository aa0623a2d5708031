use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use super::RemoteClient;
use crate::models::Record;
use crate::source::RecordSource;

/// One REST resource (`/candidates`, `/payroll`, ...) seen as a record source
pub struct RemoteCollection<'a, T> {
    client: &'a RemoteClient,
    path: &'static str,
    _record: PhantomData<T>,
}

impl<'a, T> RemoteCollection<'a, T> {
    pub fn new(client: &'a RemoteClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        self.path
    }
}

impl<T> RecordSource<T> for RemoteCollection<'_, T>
where
    T: Record + Serialize + DeserializeOwned,
{
    fn list(&self) -> Result<Vec<T>> {
        Ok(self.client.list(self.path)?)
    }

    fn create(&self, record: T) -> Result<T> {
        Ok(self.client.create(self.path, &record)?)
    }

    fn update(&self, record: T) -> Result<T> {
        let id = record.id().to_string();
        let saved = self.client.update(self.path, &id, &record)?;
        Ok(saved.unwrap_or(record))
    }

    fn delete(&self, id: &T::Id) -> Result<()> {
        Ok(self.client.delete(self.path, &id.to_string())?)
    }
}
