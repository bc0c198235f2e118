use super::{CacheBackend, CacheError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Redis-backed cache over a reconnecting connection manager.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(client: redis::Client) -> Result<Self, CacheError> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => {
                redis::cmd("SETEX")
                    .arg(key)
                    .arg(ttl.as_secs().max(1))
                    .arg(value)
                    .query_async::<_, ()>(&mut conn)
                    .await?
            }
            None => {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .query_async::<_, ()>(&mut conn)
                    .await?
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let count = redis::cmd("EXISTS")
            .arg(key)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(count > 0)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut conn = self.conn.clone();
        let keys = redis::cmd("KEYS")
            .arg(format!("{}*", prefix))
            .query_async::<_, Vec<String>>(&mut conn)
            .await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let dropped = redis::cmd("DEL")
            .arg(&keys)
            .query_async::<_, usize>(&mut conn)
            .await?;
        Ok(dropped)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let pong = redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await?;
        if pong.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(CacheError::OperationFailed(format!(
                "unexpected PING reply: {}",
                pong
            )))
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
