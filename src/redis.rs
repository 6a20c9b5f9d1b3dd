use std::sync::Arc;

use deadpool::managed::QueueMode;
use deadpool_redis::{Config as DeadpoolConfig, Pool, PoolConfig, Runtime, Timeouts};
use redis::AsyncCommands;

use crate::config::Config;
use crate::error::{FaithGuidanceError, Result};

/// Redis connection manager
#[derive(Clone)]
pub struct RedisManager {
    pool: Arc<Pool>,
}

impl RedisManager {
    /// Create a new Redis manager with configuration
    pub async fn new_with_config(config: &Config) -> Result<Self> {
        let redis_url = config.get_redis_url();

        tracing::info!(
            "Connecting to Redis at {}:{} (db: {})",
            config.redis.host,
            config.redis.port,
            config.redis.database
        );

        let mut cfg = DeadpoolConfig::from_url(&redis_url);
        cfg.pool = Some(PoolConfig {
            max_size: config.redis.pool.max_size,
            timeouts: Timeouts {
                wait: Some(config.get_pool_timeout()),
                create: Some(config.get_pool_create_timeout()),
                recycle: Some(config.get_pool_recycle_timeout()),
            },
            queue_mode: QueueMode::Fifo,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| FaithGuidanceError::PoolCreation(e.to_string()))?;

        // Test the connection
        let mut conn = pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Redis connection established");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Store a JSON document (no expiry)
    pub async fn json_set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        path: &str,
        value: &T,
    ) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.get_connection().await?;
        let _: () = redis::cmd("JSON.SET")
            .arg(key)
            .arg(path)
            .arg(json)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    /// Get a JSON document from Redis
    pub async fn json_get<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
        path: &str,
    ) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;

        let result: Option<String> = redis::cmd("JSON.GET")
            .arg(key)
            .arg(path)
            .query_async(&mut conn)
            .await?;

        match result {
            Some(json_str) => decode_json_path_result(&json_str),
            None => Ok(None),
        }
    }

    /// Fetch several JSON documents at the root path; missing keys are skipped.
    pub async fn json_mget<T: serde::de::DeserializeOwned>(&self, keys: &[String]) -> Result<Vec<T>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut cmd = redis::cmd("JSON.MGET");
        for key in keys {
            cmd.arg(key);
        }
        cmd.arg("$");

        let mut conn = self.get_connection().await?;
        let raw: Vec<Option<String>> = cmd.query_async(&mut conn).await?;

        let mut values = Vec::with_capacity(raw.len());
        for json_str in raw.into_iter().flatten() {
            if let Some(value) = decode_json_path_result(&json_str)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        Ok(conn.exists(key).await?)
    }

    /// Members of a sorted set, highest score first.
    pub async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.get_connection().await?;
        Ok(conn.zrevrange(key, start, stop).await?)
    }
}

/// JSONPath (`$`) replies come back wrapped in an array; plain paths do not.
fn decode_json_path_result<T: serde::de::DeserializeOwned>(json_str: &str) -> Result<Option<T>> {
    if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(json_str) {
        return match values.into_iter().next() {
            Some(first) => Ok(Some(serde_json::from_value(first)?)),
            None => Ok(None),
        };
    }
    Ok(Some(serde_json::from_str(json_str)?))
}
