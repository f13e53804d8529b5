use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::models::AnalysisSession;
use crate::retrieval::DirectoryProvider;

/// Maximum number of sessions kept before the oldest is evicted.
const MAX_SESSIONS: usize = 100;
/// Time-to-live for stored sessions (2 hours).
const SESSION_TTL_SECS: u64 = 2 * 60 * 60;

/// A named analysis session held for a web client.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub name: String,
    pub session: AnalysisSession,
}

pub struct AppState {
    pub config: AnalysisConfig,
    /// Raster source for region-driven sessions; absent when the server only
    /// accepts uploaded series.
    pub provider: Option<DirectoryProvider>,
    sessions: Mutex<HashMap<Uuid, (Instant, StoredSession)>>,
}

impl AppState {
    pub fn new(config: AnalysisConfig, provider: Option<DirectoryProvider>) -> Self {
        Self {
            config,
            provider,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, (Instant, StoredSession)>> {
        let mut map = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        evict_expired(&mut map);
        map
    }

    pub fn get_session(&self, id: &Uuid) -> Option<StoredSession> {
        self.lock().get(id).map(|(_, s)| s.clone())
    }

    pub fn insert_session(&self, id: Uuid, session: StoredSession) {
        let mut map = self.lock();
        if map.len() >= MAX_SESSIONS && !map.contains_key(&id) {
            evict_oldest(&mut map);
        }
        map.insert(id, (Instant::now(), session));
    }

    pub fn num_sessions(&self) -> usize {
        self.lock().len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AnalysisConfig::default(), None)
    }
}

fn evict_expired(map: &mut HashMap<Uuid, (Instant, StoredSession)>) {
    let ttl = Duration::from_secs(SESSION_TTL_SECS);
    map.retain(|_, (created, _)| created.elapsed() < ttl);
}

fn evict_oldest(map: &mut HashMap<Uuid, (Instant, StoredSession)>) {
    if let Some(oldest_id) = map.iter().min_by_key(|(_, (t, _))| *t).map(|(id, _)| *id) {
        map.remove(&oldest_id);
    }
}
