//! Redis implementation of the [`UserSource`] trait
//!
//! Keys are listed with `SCAN` (never `KEYS`, which blocks the server) and each
//! key is read according to its type: hashes with `HGETALL`, anything else is
//! returned with no fields. A key that fails to read becomes a record carrying
//! the error so one bad key does not sink the whole load.

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::RedisError;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::{parse_upstash_url, KvError, UpstashEndpoint};
use onboard_core::{KvConfig, RawUser, ServiceResult, UserSource};

/// User source backed by a Redis (or Upstash) instance
pub struct RedisUserSource {
    connection: ConnectionManager,
    endpoint: UpstashEndpoint,
    key_pattern: String,
    scan_count: usize,
    max_scan_iterations: usize,
}

/// Walk a `SCAN` cursor until it wraps to 0 or `max_iterations` pages were read.
///
/// Keys are returned in first-seen order with repeats removed; `SCAN` may
/// report the same key on more than one page.
pub async fn scan_all<F, Fut>(max_iterations: usize, mut next_page: F) -> Result<Vec<String>, KvError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<(u64, Vec<String>), KvError>>,
{
    let mut keys = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = 0u64;

    for iteration in 0..max_iterations {
        let (next_cursor, page) = next_page(cursor).await?;
        for key in page {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }

        if next_cursor == 0 {
            debug!("SCAN finished after {} iterations", iteration + 1);
            return Ok(keys);
        }
        cursor = next_cursor;
    }

    warn!(
        "SCAN stopped after {} iterations with cursor {} still open; results may be incomplete",
        max_iterations, cursor
    );
    Ok(keys)
}

/// Read one key given its `TYPE` and, for hashes, its `HGETALL` reply.
///
/// Non-hash keys come back with the key only; `hgetall` is not called for them.
pub async fn read_key<T, TFut, H, HFut>(key: &str, key_type: T, hgetall: H) -> Result<RawUser, KvError>
where
    T: FnOnce(String) -> TFut,
    TFut: Future<Output = Result<String, KvError>>,
    H: FnOnce(String) -> HFut,
    HFut: Future<Output = Result<BTreeMap<String, String>, KvError>>,
{
    let kind = key_type(key.to_string()).await?;
    if kind != "hash" {
        debug!("Key '{}' has type '{}', returning without fields", key, kind);
        return Ok(RawUser::new(key));
    }

    let fields = hgetall(key.to_string()).await?;
    Ok(RawUser {
        key: key.to_string(),
        fields,
        error: None,
    })
}

/// Read every key in order. A key that fails becomes a record carrying the
/// error; the remaining keys are still read.
pub async fn read_all<F, Fut>(keys: Vec<String>, mut read_one: F) -> Vec<RawUser>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<RawUser, KvError>>,
{
    let total = keys.len();
    let mut users = Vec::with_capacity(total);

    for (index, key) in keys.into_iter().enumerate() {
        match read_one(key.clone()).await {
            Ok(user) => users.push(user),
            Err(e) => {
                warn!("Failed to read user '{}': {}", key, e);
                users.push(RawUser::failed(key, e.to_string()));
            }
        }

        if (index + 1) % 100 == 0 {
            debug!("Loaded {}/{} users", index + 1, total);
        }
    }
    users
}

impl RedisUserSource {
    /// Connect using the URL and limits in `config` and verify with `PING`
    pub async fn connect(config: &KvConfig) -> Result<Self, KvError> {
        let raw_url = config.url.as_deref().ok_or(KvError::MissingUrl)?;
        let endpoint = parse_upstash_url(raw_url)?;

        info!("Connecting to Redis at {}", endpoint);

        let client = redis::Client::open(endpoint.connection_url(config.verify_tls)).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            KvError::ConnectionFailed(format!("Failed to create Redis client: {}", e))
        })?;

        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .set_response_timeout(Duration::from_secs(config.response_timeout_secs));

        let connect = ConnectionManager::new_with_config(client, manager_config);
        let mut connection =
            tokio::time::timeout(Duration::from_secs(config.connect_timeout_secs), connect)
                .await
                .map_err(|_| KvError::Timeout {
                    operation: "connecting".to_string(),
                    secs: config.connect_timeout_secs,
                })?
                .map_err(|e| {
                    error!("Failed to connect to Redis: {}", e);
                    KvError::ConnectionFailed(format!("Failed to connect to Redis: {}", e))
                })?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e: RedisError| {
                error!("Redis PING failed: {}", e);
                KvError::ConnectionFailed(format!("PING failed: {}", e))
            })?;
        info!("Redis connected ({})", pong);

        Ok(Self {
            connection,
            endpoint,
            key_pattern: config.key_pattern.clone(),
            scan_count: config.scan_count,
            max_scan_iterations: config.max_scan_iterations,
        })
    }

    pub fn endpoint(&self) -> &UpstashEndpoint {
        &self.endpoint
    }

    /// All keys matching the configured pattern
    pub async fn list_user_keys(&self) -> Result<Vec<String>, KvError> {
        debug!("Scanning keys matching '{}'", self.key_pattern);

        let keys = scan_all(self.max_scan_iterations, |cursor| {
            let mut conn = self.connection.clone();
            let pattern = self.key_pattern.clone();
            let count = self.scan_count;
            async move {
                let page: (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(count)
                    .query_async(&mut conn)
                    .await?;
                Ok::<_, KvError>(page)
            }
        })
        .await?;

        debug!("Found {} user keys", keys.len());
        Ok(keys)
    }

    /// Read a single user; hashes yield their fields, other types only the key
    pub async fn read_user(&self, key: &str) -> Result<RawUser, KvError> {
        let mut type_conn = self.connection.clone();
        let mut hash_conn = self.connection.clone();

        read_key(
            key,
            |key| async move {
                let kind: String = redis::cmd("TYPE").arg(key).query_async(&mut type_conn).await?;
                Ok::<_, KvError>(kind)
            },
            |key| async move {
                let fields: BTreeMap<String, String> =
                    redis::cmd("HGETALL").arg(key).query_async(&mut hash_conn).await?;
                Ok::<_, KvError>(fields)
            },
        )
        .await
    }
}

#[async_trait]
impl UserSource for RedisUserSource {
    fn source_type(&self) -> &'static str {
        "redis"
    }

    async fn fetch_users(&self) -> ServiceResult<Vec<RawUser>> {
        let keys = self.list_user_keys().await?;
        let users = read_all(keys, |key| async move { self.read_user(&key).await }).await;

        info!("Loaded {} users from Redis", users.len());
        Ok(users)
    }
}
