//! Purpose: Session lifecycle management for loaded model instances.
//! Exports: `Session`, `SessionManager`, `SessionBrief`.
//! Role: Multiplexes stateful, non-reentrant engine models behind string handles.
//! Invariants: The registry never exceeds capacity after `create` returns.
//! Invariants: `get` is an atomic expiry-check-and-touch under the registry lock.
//! Invariants: A model is only reachable through its session's own lock, so at
//! Invariants: most one analysis call is in flight per session.
//! Invariants: `close` removes the registry entry without blocking on in-flight
//! Invariants: calls; holders of an `Arc<Session>` finish with their own reference
//! Invariants: and the model drops with the last one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime};

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::error::{Error, ErrorKind};
use crate::engine::EngineModel;

#[derive(Clone, Copy, Debug)]
struct AccessStamp {
    mono: Instant,
    wall: SystemTime,
}

impl AccessStamp {
    fn now() -> Self {
        Self {
            mono: Instant::now(),
            wall: SystemTime::now(),
        }
    }
}

/// One caller-visible handle: an exclusively owned model plus lifecycle metadata.
pub struct Session {
    id: String,
    case_path: String,
    created_at: SystemTime,
    last_accessed: Mutex<AccessStamp>,
    model: Mutex<Box<dyn EngineModel>>,
}

impl Session {
    fn new(id: String, model: Box<dyn EngineModel>, case_path: &str) -> Self {
        Self {
            id,
            case_path: case_path.to_string(),
            created_at: SystemTime::now(),
            last_accessed: Mutex::new(AccessStamp::now()),
            model: Mutex::new(model),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn case_path(&self) -> &str {
        &self.case_path
    }

    /// Exclusive access to the owned model for the duration of one engine call.
    ///
    /// A poisoned lock means an engine call panicked mid-run; the model state is
    /// surfaced as-is rather than tearing the process down.
    pub fn model(&self) -> MutexGuard<'_, Box<dyn EngineModel>> {
        self.model
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn touch(&self) {
        *self.stamp() = AccessStamp::now();
    }

    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.stamp().mono) > ttl
    }

    fn stamp(&self) -> MutexGuard<'_, AccessStamp> {
        self.last_accessed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Session metadata snapshot as reported by `list_sessions`.
#[derive(Clone, Debug, Serialize)]
pub struct SessionBrief {
    pub session_id: String,
    pub case_path: String,
    pub created_at: String,
    pub last_accessed: String,
}

/// Process-wide session registry with capacity eviction and TTL expiry.
pub struct SessionManager {
    registry: Mutex<HashMap<String, Arc<Session>>>,
    capacity: usize,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            registry: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Register a freshly loaded model and hand back its session id.
    ///
    /// Sweeps expired sessions first, then evicts the session with the oldest
    /// last access (ties broken by id ordering) if the registry is at capacity.
    pub fn create(&self, model: Box<dyn EngineModel>, case_path: &str) -> Result<String, Error> {
        let id = generate_session_id()?;
        let session = Arc::new(Session::new(id.clone(), model, case_path));

        let mut registry = self.lock_registry();
        let now = Instant::now();
        sweep_expired(&mut registry, self.ttl, now);
        if registry.len() >= self.capacity {
            let oldest = registry
                .values()
                .min_by(|a, b| {
                    let a_stamp = a.stamp().mono;
                    let b_stamp = b.stamp().mono;
                    a_stamp.cmp(&b_stamp).then_with(|| a.id.cmp(&b.id))
                })
                .map(|session| session.id.clone());
            if let Some(oldest_id) = oldest {
                registry.remove(&oldest_id);
                tracing::debug!(session_id = %oldest_id, "evicted oldest session at capacity");
            }
        }
        registry.insert(id.clone(), session);
        Ok(id)
    }

    /// Resolve a session id, expiring it if stale and touching it otherwise.
    pub fn get(&self, session_id: &str) -> Result<Arc<Session>, Error> {
        let mut registry = self.lock_registry();
        let session = registry
            .get(session_id)
            .cloned()
            .ok_or_else(|| not_found(session_id))?;
        if session.is_expired(self.ttl, Instant::now()) {
            registry.remove(session_id);
            return Err(not_found(session_id));
        }
        session.touch();
        Ok(session)
    }

    /// Remove a session; reports whether it existed.
    pub fn close(&self, session_id: &str) -> bool {
        self.lock_registry().remove(session_id).is_some()
    }

    /// Snapshot of live sessions, after an expiry sweep.
    pub fn list(&self) -> Vec<SessionBrief> {
        let mut registry = self.lock_registry();
        sweep_expired(&mut registry, self.ttl, Instant::now());
        registry
            .values()
            .map(|session| SessionBrief {
                session_id: session.id.clone(),
                case_path: session.case_path.clone(),
                created_at: rfc3339(session.created_at),
                last_accessed: rfc3339(session.stamp().wall),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock_registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_registry(&self) -> MutexGuard<'_, HashMap<String, Arc<Session>>> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn sweep_expired(registry: &mut HashMap<String, Arc<Session>>, ttl: Duration, now: Instant) {
    registry.retain(|_, session| !session.is_expired(ttl, now));
}

fn not_found(session_id: &str) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message("Session not found")
        .with_session(session_id)
}

/// 128-bit random token, hex encoded. No collision check is performed; the
/// collision probability at this width is negligible.
fn generate_session_id() -> Result<String, Error> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message(format!("failed to generate session id: {err}"))
    })?;
    Ok(hex_encode(&bytes))
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(nibble_hex(byte >> 4));
        out.push(nibble_hex(byte & 0x0f));
    }
    out
}

fn nibble_hex(nibble: u8) -> char {
    match nibble {
        0..=9 => char::from(b'0' + nibble),
        _ => char::from(b'a' + (nibble - 10)),
    }
}

fn rfc3339(wall: SystemTime) -> String {
    OffsetDateTime::from(wall)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::SessionManager;
    use crate::engine::EngineModel;
    use crate::engine::synthetic::SyntheticModel;

    fn model(case: &str) -> Box<dyn EngineModel> {
        Box::new(SyntheticModel::new(
            case.to_string(),
            format!("{case}.xlsx"),
            true,
        ))
    }

    fn hour() -> Duration {
        Duration::from_secs(3600)
    }

    #[test]
    fn session_ids_are_unique_hex_tokens() {
        let manager = SessionManager::new(10, hour());
        let a = manager.create(model("a"), "a.xlsx").expect("create");
        let b = manager.create(model("b"), "b.xlsx").expect("create");
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hex_encoding_is_lowercase_and_positional() {
        assert_eq!(super::hex_encode(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
    }

    #[test]
    fn create_at_capacity_evicts_oldest_access() {
        let manager = SessionManager::new(2, hour());
        let a = manager.create(model("a"), "a.xlsx").expect("a");
        thread::sleep(Duration::from_millis(5));
        let b = manager.create(model("b"), "b.xlsx").expect("b");
        thread::sleep(Duration::from_millis(5));
        let c = manager.create(model("c"), "c.xlsx").expect("c");

        assert_eq!(manager.len(), 2);
        assert!(manager.get(&a).is_err());
        assert!(manager.get(&b).is_ok());
        assert!(manager.get(&c).is_ok());
    }

    #[test]
    fn touching_a_session_protects_it_from_eviction() {
        let manager = SessionManager::new(2, hour());
        let a = manager.create(model("a"), "a.xlsx").expect("a");
        thread::sleep(Duration::from_millis(5));
        let b = manager.create(model("b"), "b.xlsx").expect("b");
        thread::sleep(Duration::from_millis(5));
        manager.get(&a).expect("touch a");
        thread::sleep(Duration::from_millis(5));
        manager.create(model("c"), "c.xlsx").expect("c");

        // b now holds the oldest access and is the one evicted
        assert!(manager.get(&a).is_ok());
        assert!(manager.get(&b).is_err());
    }

    #[test]
    fn registry_never_exceeds_capacity() {
        let manager = SessionManager::new(3, hour());
        for i in 0..20 {
            manager
                .create(model(&format!("case{i}")), "case.xlsx")
                .expect("create");
            assert!(manager.len() <= 3);
        }
    }

    #[test]
    fn expired_session_is_removed_on_get() {
        let manager = SessionManager::new(10, Duration::from_millis(20));
        let id = manager.create(model("a"), "a.xlsx").expect("create");
        thread::sleep(Duration::from_millis(40));
        assert!(manager.get(&id).is_err());
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn repeated_access_within_ttl_never_expires() {
        let manager = SessionManager::new(10, Duration::from_millis(120));
        let id = manager.create(model("a"), "a.xlsx").expect("create");
        for _ in 0..6 {
            thread::sleep(Duration::from_millis(40));
            manager.get(&id).expect("still alive");
        }
    }

    #[test]
    fn list_sweeps_expired_entries() {
        let manager = SessionManager::new(10, Duration::from_millis(20));
        manager.create(model("a"), "a.xlsx").expect("create");
        thread::sleep(Duration::from_millis(40));
        assert!(manager.list().is_empty());
        assert!(manager.is_empty());
    }

    #[test]
    fn close_then_get_reports_not_found() {
        let manager = SessionManager::new(10, hour());
        let id = manager.create(model("a"), "a.xlsx").expect("create");
        assert!(manager.close(&id));
        assert!(manager.get(&id).is_err());
        assert!(!manager.close(&id));
        assert!(!manager.close("unknown"));
    }

    #[test]
    fn in_flight_reference_survives_close() {
        let manager = SessionManager::new(10, hour());
        let id = manager.create(model("a"), "a.xlsx").expect("create");
        let session = manager.get(&id).expect("get");
        assert!(manager.close(&id));
        // The held reference still resolves its model; new lookups fail.
        assert_eq!(session.model().name(), "a");
        assert!(manager.get(&id).is_err());
    }

    #[test]
    fn concurrent_creates_respect_capacity() {
        let manager = Arc::new(SessionManager::new(4, hour()));
        let mut handles = Vec::new();
        for worker in 0..8 {
            let manager = Arc::clone(&manager);
            handles.push(thread::spawn(move || {
                for i in 0..25 {
                    let id = manager
                        .create(model(&format!("w{worker}-{i}")), "case.xlsx")
                        .expect("create");
                    let _ = manager.get(&id);
                    if i % 5 == 0 {
                        manager.close(&id);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().expect("worker");
        }
        assert!(manager.len() <= 4);
    }

    #[test]
    fn list_reports_metadata_for_live_sessions() {
        let manager = SessionManager::new(10, hour());
        let id = manager.create(model("demo3"), "demo3.xlsx").expect("create");
        let briefs = manager.list();
        assert_eq!(briefs.len(), 1);
        assert_eq!(briefs[0].session_id, id);
        assert_eq!(briefs[0].case_path, "demo3.xlsx");
        // RFC3339 UTC timestamps
        assert!(briefs[0].created_at.ends_with('Z'));
        assert!(briefs[0].last_accessed.ends_with('Z'));
    }
}
