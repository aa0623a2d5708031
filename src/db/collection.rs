use std::marker::PhantomData;

use super::{LocalStore, StoreError, StoreExt};
use crate::models::Stored;

/// Typed view over one stored collection.
///
/// Every mutation reads the full array, changes it in memory and writes the
/// whole array back. There is no partial update and no locking.
pub struct Collection<'a, T> {
    store: &'a dyn LocalStore,
    _marker: PhantomData<T>,
}

impl<'a, T: Stored> Collection<'a, T> {
    pub fn new(store: &'a dyn LocalStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// The store behind this collection
    pub fn store(&self) -> &'a dyn LocalStore {
        self.store
    }

    pub fn all(&self) -> Result<Vec<T>, StoreError> {
        self.store.load(T::KEY)
    }

    pub fn find(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        Ok(self.all()?.into_iter().find(|r| r.id() == id))
    }

    pub fn get(&self, id: &T::Id) -> Result<T, StoreError> {
        self.find(id)?.ok_or_else(|| not_found::<T>(id))
    }

    /// Append a record to the end of the collection
    pub fn insert(&self, record: T) -> Result<T, StoreError> {
        let mut all = self.all()?;
        all.push(record.clone());
        self.store.save(T::KEY, &all)?;
        Ok(record)
    }

    /// Replace the record with the same id, keeping its position
    pub fn update(&self, record: T) -> Result<T, StoreError> {
        let mut all = self.all()?;
        let slot = all
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| not_found::<T>(record.id()))?;
        *slot = record.clone();
        self.store.save(T::KEY, &all)?;
        Ok(record)
    }

    /// Remove by id. A missing id leaves the stored collection untouched.
    pub fn delete(&self, id: &T::Id) -> Result<T, StoreError> {
        let mut all = self.all()?;
        let index = all
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        let removed = all.remove(index);
        self.store.save(T::KEY, &all)?;
        Ok(removed)
    }

    /// Apply `change` to every record matching `predicate`; returns how many changed
    pub fn update_where<P, F>(&self, predicate: P, mut change: F) -> Result<usize, StoreError>
    where
        P: Fn(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut all = self.all()?;
        let mut changed = 0;
        for record in all.iter_mut().filter(|r| predicate(&**r)) {
            change(record);
            changed += 1;
        }
        if changed > 0 {
            self.store.save(T::KEY, &all)?;
        }
        Ok(changed)
    }
}

fn not_found<T: Stored>(id: &T::Id) -> StoreError {
    StoreError::NotFound {
        key: T::KEY.to_string(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, LocalStore};
    use crate::models::{Job, JobBucket};
    use uuid::Uuid;

    #[test]
    fn test_insert_find_update() {
        let db = Database::open_memory().unwrap();
        let jobs = Collection::<Job>::new(&db);

        let job = jobs.insert(Job::new("Designer", 70000.0, 1)).unwrap();
        assert_eq!(jobs.get(&job.id).unwrap().title, "Designer");

        let mut changed = job.clone();
        changed.bucket = JobBucket::Completed;
        jobs.update(changed).unwrap();
        assert_eq!(jobs.get(&job.id).unwrap().bucket, JobBucket::Completed);
    }

    #[test]
    fn test_insert_preserves_order() {
        let db = Database::open_memory().unwrap();
        let jobs = Collection::<Job>::new(&db);
        for title in ["a", "b", "c"] {
            jobs.insert(Job::new(title, 1.0, 1)).unwrap();
        }
        let titles: Vec<String> = jobs.all().unwrap().into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_delete_missing_is_not_found_and_unchanged() {
        let db = Database::open_memory().unwrap();
        let jobs = Collection::<Job>::new(&db);
        jobs.insert(Job::new("Keep", 1.0, 1)).unwrap();
        let before = db.read("jobs").unwrap();

        let missing = Uuid::new_v4();
        match jobs.delete(&missing) {
            Err(StoreError::NotFound { key, id }) => {
                assert_eq!(key, "jobs");
                assert_eq!(id, missing.to_string());
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(db.read("jobs").unwrap(), before);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let db = Database::open_memory().unwrap();
        let jobs = Collection::<Job>::new(&db);
        let result = jobs.update(Job::new("Ghost", 1.0, 1));
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(jobs.all().unwrap().is_empty());
    }

    #[test]
    fn test_delete_existing() {
        let db = Database::open_memory().unwrap();
        let jobs = Collection::<Job>::new(&db);
        let a = jobs.insert(Job::new("a", 1.0, 1)).unwrap();
        let b = jobs.insert(Job::new("b", 1.0, 1)).unwrap();

        let removed = jobs.delete(&a.id).unwrap();
        assert_eq!(removed.id, a.id);
        let remaining = jobs.all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
    }

    #[test]
    fn test_update_where_counts_changes() {
        let db = Database::open_memory().unwrap();
        let jobs = Collection::<Job>::new(&db);
        for n in 1..=4 {
            jobs.insert(Job::new(format!("job{}", n), 1.0, n)).unwrap();
        }

        let changed = jobs
            .update_where(|j| j.openings % 2 == 0, |j| j.bucket = JobBucket::Inactive)
            .unwrap();
        assert_eq!(changed, 2);

        let inactive = jobs
            .all()
            .unwrap()
            .into_iter()
            .filter(|j| j.bucket == JobBucket::Inactive)
            .count();
        assert_eq!(inactive, 2);
    }
}
