use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use secrecy::SecretString;
use tokio::sync::Notify;

use crate::auth::token::MAX_TOKEN_LIFETIME;
use crate::auth::AuthError;

const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: StdMutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: StdMutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut o) = self.offset.lock() {
            *o += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().map(|o| *o).unwrap_or_default();
        self.base + offset
    }
}

/// Tokens are shared per token endpoint and client identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey {
    pub endpoint: String,
    pub identity: String,
}

impl TokenKey {
    pub fn new(endpoint: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            identity: identity.into(),
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.endpoint, self.identity)
    }
}

/// What a provider hands back after a successful token round trip.
pub struct FetchedToken {
    pub token: SecretString,
    pub lifetime: Duration,
}

pub struct TokenCache {
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
    state: StdMutex<State>,
}

struct State {
    entries: HashMap<TokenKey, CacheEntry>,
    inflight: HashMap<TokenKey, Arc<Notify>>,
}

struct CacheEntry {
    token: SecretString,
    expires_at: Instant,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            state: StdMutex::new(State {
                entries: HashMap::new(),
                inflight: HashMap::new(),
            }),
        }
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Cached token if still fresh.
    pub fn get(&self, key: &TokenKey) -> Option<SecretString> {
        self.fresh(&self.lock(), key)
    }

    /// Return the cached token or run `fetch` to obtain one. Concurrent
    /// misses for the same key share one fetch; failures are not cached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &TokenKey,
        fetch: F,
    ) -> Result<SecretString, AuthError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchedToken, AuthError>>,
    {
        let notify = loop {
            let waiter = {
                let mut s = self.lock();
                if let Some(token) = self.fresh(&s, key) {
                    return Ok(token);
                }
                match s.inflight.get(key).cloned() {
                    Some(n) => n,
                    None => {
                        let n = Arc::new(Notify::new());
                        s.inflight.insert(key.clone(), n.clone());
                        break n;
                    }
                }
            };

            // Register before re-checking so a completion in between is not missed.
            let notified = waiter.notified();
            if self.is_inflight(key, &waiter) {
                notified.await;
            }
        };

        let _guard = InflightGuard {
            cache: self,
            key,
            notify,
        };

        tracing::debug!(token_key = %key, "token cache miss, fetching");
        let fetched = fetch().await?;

        let ttl = fetched
            .lifetime
            .min(MAX_TOKEN_LIFETIME)
            .saturating_sub(self.safety_margin);
        let Some(expires_at) = self.clock.now().checked_add(ttl) else {
            tracing::debug!(token_key = %key, "token expiry out of clock range, not caching");
            return Ok(fetched.token);
        };
        self.lock().entries.insert(
            key.clone(),
            CacheEntry {
                token: fetched.token.clone(),
                expires_at,
            },
        );
        Ok(fetched.token)
    }

    pub fn invalidate(&self, key: &TokenKey) {
        self.lock().entries.remove(key);
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh(&self, s: &State, key: &TokenKey) -> Option<SecretString> {
        s.entries
            .get(key)
            .filter(|e| self.clock.now() < e.expires_at)
            .map(|e| e.token.clone())
    }

    fn is_inflight(&self, key: &TokenKey, notify: &Arc<Notify>) -> bool {
        self.lock()
            .inflight
            .get(key)
            .is_some_and(|n| Arc::ptr_eq(n, notify))
    }
}

/// Clears the in-flight marker and wakes waiters even if the fetch is
/// cancelled or fails.
struct InflightGuard<'a> {
    cache: &'a TokenCache,
    key: &'a TokenKey,
    notify: Arc<Notify>,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        let mut s = self.cache.lock();
        if s
            .inflight
            .get(self.key)
            .is_some_and(|n| Arc::ptr_eq(n, &self.notify))
        {
            s.inflight.remove(self.key);
        }
        drop(s);
        self.notify.notify_waiters();
    }
}
