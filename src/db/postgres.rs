//! PostgreSQL-backed car store
//!
//! Wraps a deadpool pool. Each session owns a pooled `Object`; its `Drop`
//! returns the connection, which is what makes acquisition scoped.

use super::queries::{
    FIND_LIVE_CAR, INSERT_CAR, LIST_LIVE_CARS, PING, SESSION_SETUP, SOFT_DELETE_LIVE_CAR,
    UPDATE_LIVE_CAR,
};
use super::{CarSession, CarStore, PoolStatus};
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{Car, CarFields};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info};

/// Car store over a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgCarStore {
    pool: Pool,
}

impl PgCarStore {
    /// Build the pool and verify that a connection can be made
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = Self::create_pool(config)?;

        let client = pool
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get pool connection: {}", e))?;
        client
            .query_one(PING, &[])
            .await
            .map_err(|e| anyhow::anyhow!("Failed to verify database connection: {}", e))?;
        drop(client);

        info!(
            "Database connection successful ({}:{}/{}, TLS: {})",
            config.host, config.port, config.database, config.use_tls
        );
        Ok(Self { pool })
    }

    /// Create a connection pool with given configuration
    fn create_pool(config: &DatabaseConfig) -> anyhow::Result<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.dbname = Some(config.database.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(config.max_pool_size));

        let pool = if config.use_tls {
            let certs = rustls_native_certs::load_native_certs();
            let mut root_store = rustls::RootCertStore::empty();
            for cert in certs.certs {
                root_store.add(cert).ok();
            }

            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();
            let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

            cfg.create_pool(Some(Runtime::Tokio1), tls)
                .map_err(|e| anyhow::anyhow!("Failed to create TLS pool: {}", e))?
        } else {
            cfg.create_pool(Some(Runtime::Tokio1), NoTls)
                .map_err(|e| anyhow::anyhow!("Failed to create pool: {}", e))?
        };

        Ok(pool)
    }
}

#[async_trait]
impl CarStore for PgCarStore {
    async fn acquire(&self) -> Result<Box<dyn CarSession>, StoreError> {
        let client = self.pool.get().await?;
        // A connection that rejects the session settings is not handed out
        client
            .batch_execute(SESSION_SETUP)
            .await
            .map_err(|e| StoreError::Unavailable(format!("session setup failed: {}", e)))?;
        Ok(Box::new(PgCarSession { client }))
    }

    fn status(&self) -> PoolStatus {
        let status = self.pool.status();
        PoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
        }
    }

    fn close(&self) {
        debug!("Closing database pool");
        self.pool.close();
    }
}

/// Session holding one pooled connection
struct PgCarSession {
    client: Object,
}

/// Decode a projection row; NULLs or unexpected column types fail the query
fn car_from_row(row: &Row) -> Result<Car, StoreError> {
    let decode = |e: tokio_postgres::Error| StoreError::Query(format!("unexpected car row: {}", e));
    Ok(Car {
        id: row.try_get("id").map_err(decode)?,
        make: row.try_get("make").map_err(decode)?,
        model: row.try_get("model").map_err(decode)?,
        year: row.try_get("year").map_err(decode)?,
    })
}

#[async_trait]
impl CarSession for PgCarSession {
    async fn list_live(&self) -> Result<Vec<Car>, StoreError> {
        let stmt = self.client.prepare_cached(LIST_LIVE_CARS).await?;
        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter().map(car_from_row).collect()
    }

    async fn find_live(&self, id: i32) -> Result<Option<Car>, StoreError> {
        let stmt = self.client.prepare_cached(FIND_LIVE_CAR).await?;
        let row = self.client.query_opt(&stmt, &[&id]).await?;
        row.as_ref().map(car_from_row).transpose()
    }

    async fn insert(&self, fields: &CarFields) -> Result<(), StoreError> {
        let stmt = self.client.prepare_cached(INSERT_CAR).await?;
        self.client
            .execute(&stmt, &[&fields.make, &fields.model, &fields.year])
            .await?;
        Ok(())
    }

    async fn update_live(&self, id: i32, fields: &CarFields) -> Result<bool, StoreError> {
        let stmt = self.client.prepare_cached(UPDATE_LIVE_CAR).await?;
        let affected = self
            .client
            .execute(&stmt, &[&fields.make, &fields.model, &fields.year, &id])
            .await?;
        Ok(affected > 0)
    }

    async fn soft_delete(&self, id: i32) -> Result<bool, StoreError> {
        let stmt = self.client.prepare_cached(SOFT_DELETE_LIVE_CAR).await?;
        let affected = self.client.execute(&stmt, &[&id]).await?;
        Ok(affected > 0)
    }
}
