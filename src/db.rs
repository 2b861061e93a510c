//! Database access
//!
//! Handlers never touch the pool directly. They ask a [`CarStore`] for a
//! [`CarSession`], which owns one pooled connection for the lifetime of the
//! request. Dropping the session hands the connection back to the pool, so
//! every exit path (including `?` on an error) releases it.

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod queries;

use crate::error::StoreError;
use crate::models::{Car, CarFields};
use async_trait::async_trait;
use serde::Serialize;

pub use postgres::PgCarStore;

/// Snapshot of pool occupancy for the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub max_size: usize,
    pub size: usize,
    pub available: usize,
}

/// Source of per-request sessions against the `cars` table
#[async_trait]
pub trait CarStore: Send + Sync {
    /// Check out a connection with session settings applied
    async fn acquire(&self) -> Result<Box<dyn CarSession>, StoreError>;

    fn status(&self) -> PoolStatus;

    /// Stop handing out connections and drop idle ones
    fn close(&self);
}

/// One checked-out connection. Only live rows (`deleted_yn = 0`) are visible.
#[async_trait]
pub trait CarSession: Send {
    async fn list_live(&self) -> Result<Vec<Car>, StoreError>;

    async fn find_live(&self, id: i32) -> Result<Option<Car>, StoreError>;

    async fn insert(&self, fields: &CarFields) -> Result<(), StoreError>;

    /// Returns `false` when no live row has this id
    async fn update_live(&self, id: i32, fields: &CarFields) -> Result<bool, StoreError>;

    /// Returns `false` when no live row has this id
    async fn soft_delete(&self, id: i32) -> Result<bool, StoreError>;
}
