use crate::domain::ports::ErrorNotifierRef;
use crate::domain::transaction::CachedTransaction;
use crate::error::{ErrorKind, ProtocolError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(300);

struct Entry {
    item: Arc<CachedTransaction>,
    inserted: Instant,
}

/// Transactions waiting for the issuer's challenge response, keyed by the
/// orchestrator's transaction id.
///
/// Entries older than the TTL are evicted whenever an item is added, and on
/// lookup. Each eviction sends one "incomplete transaction" notification.
#[derive(Clone)]
pub struct PendingTransactionCache {
    ttl: Duration,
    inner: Arc<Mutex<HashMap<String, Entry>>>,
    notifier: ErrorNotifierRef,
    notification_url: Option<String>,
}

impl PendingTransactionCache {
    pub fn new(ttl: Duration, notifier: ErrorNotifierRef, notification_url: Option<String>) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(HashMap::new())),
            notifier,
            notification_url,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn add_item(&self, id: impl Into<String>, item: CachedTransaction) {
        let id = id.into();
        let now = Instant::now();
        let expired = {
            let mut map = self.inner.lock().await;
            map.insert(
                id.clone(),
                Entry {
                    item: Arc::new(item),
                    inserted: now,
                },
            );
            self.sweep_locked(&mut map, now)
        };
        debug!(transaction_id = %id, "transaction pending");
        self.notify_expired(expired);
    }

    /// `None` when the id is unknown or its entry has expired.
    pub async fn get_cached_item(&self, id: &str) -> Option<Arc<CachedTransaction>> {
        let now = Instant::now();
        let expired = {
            let mut map = self.inner.lock().await;
            let fresh = map
                .get(id)
                .map(|entry| now.duration_since(entry.inserted) < self.ttl);
            match fresh {
                Some(true) => return map.get(id).map(|entry| Arc::clone(&entry.item)),
                Some(false) => map
                    .remove(id)
                    .map(|entry| (id.to_string(), entry.item))
                    .into_iter()
                    .collect(),
                None => Vec::new(),
            }
        };
        self.notify_expired(expired);
        None
    }

    pub async fn remove_item(&self, id: &str) -> Option<Arc<CachedTransaction>> {
        self.inner.lock().await.remove(id).map(|entry| entry.item)
    }

    /// Evicts expired entries now; returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let expired = {
            let mut map = self.inner.lock().await;
            self.sweep_locked(&mut map, Instant::now())
        };
        let count = expired.len();
        self.notify_expired(expired);
        count
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    fn sweep_locked(
        &self,
        map: &mut HashMap<String, Entry>,
        now: Instant,
    ) -> Vec<(String, Arc<CachedTransaction>)> {
        let ttl = self.ttl;
        let expired: Vec<String> = map
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.inserted) >= ttl)
            .map(|(id, _)| id.clone())
            .collect();
        expired
            .into_iter()
            .filter_map(|id| map.remove(&id).map(|entry| (id, entry.item)))
            .collect()
    }

    fn notify_expired(&self, expired: Vec<(String, Arc<CachedTransaction>)>) {
        for (id, item) in expired {
            info!(transaction_id = %id, "pending transaction expired");
            let Some(url) = &self.notification_url else {
                warn!(transaction_id = %id, "no endpoint for incomplete transaction notifications");
                continue;
            };
            let err = ProtocolError::new(ErrorKind::ExpiredTransaction, item.challenge_request.id())
                .with_detail(format!("transaction {id} not completed"));
            self.notifier
                .dispatch_error_notification(url, err.to_message(item.challenge_request.version()));
        }
    }
}
