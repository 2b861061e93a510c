//! In-memory car store for router tests
//!
//! Mirrors the SQL semantics (serial ids, live-row filtering, one-way soft
//! delete) and keeps counters so tests can check that every checked-out
//! session was released.

use super::{CarSession, CarStore, PoolStatus};
use crate::error::StoreError;
use crate::models::{Car, CarFields};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const MAX_SIZE: usize = 4;

#[derive(Debug, Clone)]
struct StoredCar {
    car: Car,
    deleted: bool,
}

#[derive(Default)]
struct Inner {
    rows: Mutex<Vec<StoredCar>>,
    checked_out: AtomicUsize,
    acquisitions: AtomicUsize,
    failing: AtomicBool,
    unavailable: AtomicBool,
}

impl Inner {
    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Query("injected query failure".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryCarStore {
    inner: Arc<Inner>,
}

impl MemoryCarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every query issued from now on fail
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Make every checkout from now on fail, as an exhausted pool would
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Sessions currently held by handlers
    pub fn checked_out(&self) -> usize {
        self.inner.checked_out.load(Ordering::SeqCst)
    }

    /// Total sessions ever handed out
    pub fn acquisitions(&self) -> usize {
        self.inner.acquisitions.load(Ordering::SeqCst)
    }

    /// Raw row count, soft-deleted rows included
    pub fn row_count(&self) -> usize {
        self.inner.rows.lock().unwrap().len()
    }

    /// Whether a row exists (live or not) and is flagged deleted
    pub fn is_deleted(&self, id: i32) -> Option<bool> {
        self.inner
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.car.id == id)
            .map(|row| row.deleted)
    }

    /// Insert directly, bypassing the API; returns the new id
    pub fn seed(&self, make: &str, model: &str, year: i32) -> i32 {
        let mut rows = self.inner.rows.lock().unwrap();
        let id = rows.len() as i32 + 1;
        rows.push(StoredCar {
            car: Car {
                id,
                make: make.to_string(),
                model: model.to_string(),
                year,
            },
            deleted: false,
        });
        id
    }
}

#[async_trait]
impl CarStore for MemoryCarStore {
    async fn acquire(&self) -> Result<Box<dyn CarSession>, StoreError> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("no connection available".to_string()));
        }
        self.inner.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.inner.checked_out.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCarSession {
            inner: Arc::clone(&self.inner),
        }))
    }

    fn status(&self) -> PoolStatus {
        let checked_out = self.checked_out();
        PoolStatus {
            max_size: MAX_SIZE,
            size: checked_out,
            available: 0,
        }
    }

    fn close(&self) {}
}

struct MemoryCarSession {
    inner: Arc<Inner>,
}

impl Drop for MemoryCarSession {
    fn drop(&mut self) {
        self.inner.checked_out.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CarSession for MemoryCarSession {
    async fn list_live(&self) -> Result<Vec<Car>, StoreError> {
        self.inner.check()?;
        let rows = self.inner.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| !row.deleted)
            .map(|row| row.car.clone())
            .collect())
    }

    async fn find_live(&self, id: i32) -> Result<Option<Car>, StoreError> {
        self.inner.check()?;
        let rows = self.inner.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.car.id == id && !row.deleted)
            .map(|row| row.car.clone()))
    }

    async fn insert(&self, fields: &CarFields) -> Result<(), StoreError> {
        self.inner.check()?;
        let mut rows = self.inner.rows.lock().unwrap();
        let id = rows.len() as i32 + 1;
        rows.push(StoredCar {
            car: Car {
                id,
                make: fields.make.clone(),
                model: fields.model.clone(),
                year: fields.year,
            },
            deleted: false,
        });
        Ok(())
    }

    async fn update_live(&self, id: i32, fields: &CarFields) -> Result<bool, StoreError> {
        self.inner.check()?;
        let mut rows = self.inner.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.car.id == id && !row.deleted) {
            Some(row) => {
                row.car.make = fields.make.clone();
                row.car.model = fields.model.clone();
                row.car.year = fields.year;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: i32) -> Result<bool, StoreError> {
        self.inner.check()?;
        let mut rows = self.inner.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.car.id == id && !row.deleted) {
            Some(row) => {
                row.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_dropping_session_releases_it() {
        let store = MemoryCarStore::new();
        let session = assert_ok!(store.acquire().await);
        assert_eq!(store.checked_out(), 1);
        drop(session);
        assert_eq!(store.checked_out(), 0);
        assert_eq!(store.acquisitions(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_hands_out_nothing() {
        let store = MemoryCarStore::new();
        store.set_unavailable(true);

        assert!(matches!(store.acquire().await, Err(StoreError::Unavailable(_))));
        assert_eq!(store.checked_out(), 0);
        assert_eq!(store.acquisitions(), 0);
    }

    #[tokio::test]
    async fn test_failing_queries_report_query_errors() {
        let store = MemoryCarStore::new();
        store.set_failing(true);
        let session = store.acquire().await.unwrap();

        assert!(matches!(session.list_live().await, Err(StoreError::Query(_))));
        drop(session);
        assert_eq!(store.checked_out(), 0);
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_stay_stored() {
        let store = MemoryCarStore::new();
        let id = store.seed("Honda", "Civic", 2020);
        let session = store.acquire().await.unwrap();

        assert!(assert_ok!(session.soft_delete(id).await));
        assert!(!assert_ok!(session.soft_delete(id).await));
        assert_eq!(assert_ok!(session.find_live(id).await), None);
        assert_eq!(store.row_count(), 1);
        assert_eq!(store.is_deleted(id), Some(true));
    }
}
