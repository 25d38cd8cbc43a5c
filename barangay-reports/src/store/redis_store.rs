use std::sync::Mutex;

use redis::Commands;

use super::{KeyValueStore, StoreError};

/// Redis-backed key-value port. Keys are namespaced as `<prefix>:<key>`.
pub struct RedisStore {
    conn: Mutex<redis::Connection>,
    prefix: String,
}

impl RedisStore {
    pub fn connect(url: &str, prefix: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        tracing::info!(url = %url, prefix, "connected to Redis");
        Ok(Self {
            conn: Mutex::new(conn),
            prefix: prefix.to_string(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(conn.get(self.namespaced(key))?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.set::<_, _, ()>(self.namespaced(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.del::<_, ()>(self.namespaced(key))?;
        Ok(())
    }
}
