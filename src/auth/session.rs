use std::{collections::HashMap, sync::Arc, time::Duration};

use time::OffsetDateTime;
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

/// Server-side sessions keyed by opaque cookie token, with a fixed TTL.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionRecord>>>,
    ttl: time::Duration,
}

impl SessionStore {
    pub fn new(ttl: time::Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> time::Duration {
        self.ttl
    }

    /// Binds a fresh token to `user_id`.
    pub async fn create(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let record = SessionRecord {
            user_id,
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };
        self.inner.write().await.insert(token.clone(), record);
        debug!(user_id, "session created");
        token
    }

    /// Resolves a token to its user id; expired entries are evicted here.
    pub async fn get(&self, token: &str) -> Option<i64> {
        let now = OffsetDateTime::now_utc();
        {
            let sessions = self.inner.read().await;
            match sessions.get(token) {
                None => return None,
                Some(rec) if rec.expires_at > now => return Some(rec.user_id),
                Some(_) => {}
            }
        }
        let mut sessions = self.inner.write().await;
        if sessions.get(token).is_some_and(|rec| rec.expires_at <= now) {
            sessions.remove(token);
            debug!("expired session evicted on lookup");
        }
        None
    }

    /// Idempotent.
    pub async fn destroy(&self, token: &str) -> bool {
        self.inner.write().await.remove(token).is_some()
    }

    pub async fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, rec| rec.expires_at > now);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let every = every.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.purge_expired().await;
                if removed > 0 {
                    info!(removed, "expired sessions swept");
                }
            }
        })
    }
}
