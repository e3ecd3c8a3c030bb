//! Session middleware configuration.
//!
//! Sessions only carry the visitor's cart id, so they live in memory and are
//! lost on restart along with the carts themselves. A session is only stored
//! once something is written to it, which happens on the first add to cart.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "md_session";

/// Sessions (and their carts) expire after this much inactivity.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Maximum number of sessions held in memory.
const MAX_SESSIONS: u64 = 100_000;

// =============================================================================
// Store
// =============================================================================

/// In-memory session store.
///
/// Idle records are evicted after [`SESSION_IDLE_TIMEOUT`], the same window
/// the cart registry uses, and the least recently used records go first once
/// `max_sessions` is reached. Records past their expiry date are never
/// returned.
#[derive(Clone)]
pub struct SessionCache {
    records: Cache<Id, Record>,
}

impl SessionCache {
    #[must_use]
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(MAX_SESSIONS, SESSION_IDLE_TIMEOUT)
    }
}

impl fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCache")
            .field("sessions", &self.records.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self.records.get(session_id).await {
            Some(record) if record.expiry_date > OffsetDateTime::now_utc() => Ok(Some(record)),
            Some(_) => {
                self.records.invalidate(session_id).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

// =============================================================================
// Layer
// =============================================================================

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<SessionCache> {
    let is_secure = config.base_url.scheme() == "https";

    #[allow(clippy::cast_possible_wrap)] // a week in seconds fits in i64
    let expiry_seconds = SESSION_IDLE_TIMEOUT.as_secs() as i64;

    SessionManagerLayer::new(SessionCache::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(expiry_seconds),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
