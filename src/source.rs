use anyhow::Result;

use crate::db::{Collection, LocalStore};
use crate::models::{Record, Stored};

/// Where a form submits to: a local collection or a remote resource.
pub trait RecordSource<T: Record> {
    fn list(&self) -> Result<Vec<T>>;
    fn create(&self, record: T) -> Result<T>;
    fn update(&self, record: T) -> Result<T>;
    fn delete(&self, id: &T::Id) -> Result<()>;

    /// Local store that records saved here may point into. None for a
    /// remote source, where the server owns those checks.
    fn local_store(&self) -> Option<&dyn LocalStore> {
        None
    }
}

impl<T: Stored> RecordSource<T> for Collection<'_, T> {
    fn list(&self) -> Result<Vec<T>> {
        Ok(self.all()?)
    }

    fn create(&self, record: T) -> Result<T> {
        Ok(self.insert(record)?)
    }

    fn update(&self, record: T) -> Result<T> {
        Ok(Collection::update(self, record)?)
    }

    fn delete(&self, id: &T::Id) -> Result<()> {
        Collection::delete(self, id)?;
        Ok(())
    }

    fn local_store(&self) -> Option<&dyn LocalStore> {
        Some(self.store())
    }
}
