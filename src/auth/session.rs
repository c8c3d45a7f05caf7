//! Server-side sessions keyed by an opaque cookie token.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::http::{header, HeaderMap};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::config::SessionConfig;

/// Identity attached to an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub principal: Option<Principal>,
    /// Path and query of the request that was bounced to the login page.
    pub saved_path: Option<String>,
    pub expires_at: OffsetDateTime,
}

impl Session {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    cfg: Arc<SessionConfig>,
}

impl SessionStore {
    pub fn new(cfg: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            cfg: Arc::new(cfg),
        }
    }

    fn ttl(&self) -> Duration {
        Duration::minutes(self.cfg.ttl_minutes)
    }

    /// Live session for `id`, with its expiry pushed forward.
    pub fn touch(&self, id: Uuid) -> Option<Session> {
        let now = OffsetDateTime::now_utc();
        let ttl = self.ttl();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let session = sessions.get_mut(&id)?;
        if session.is_live(now) {
            session.expires_at = now + ttl;
            return Some(session.clone());
        }
        sessions.remove(&id);
        None
    }

    /// Session for the cookie carried by `headers`, if any.
    pub fn from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        session_id_from(headers, &self.cfg.cookie_name).and_then(|id| self.touch(id))
    }

    /// Start an anonymous session remembering where the visitor wanted to go.
    pub fn start_anonymous(&self, saved_path: Option<String>) -> Session {
        self.insert(None, saved_path)
    }

    pub fn remember_path(&self, id: Uuid, path: String) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if let Some(s) = sessions.get_mut(&id) {
            s.saved_path = Some(path);
        }
    }

    /// Replace `previous` (if any) with a fresh authenticated session.
    ///
    /// The id always changes on login. Returns the new session and the path
    /// saved by the previous one.
    pub fn authenticate(&self, previous: Option<Uuid>, principal: Principal) -> (Session, Option<String>) {
        let saved_path = previous.and_then(|id| {
            let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
            sessions.remove(&id).and_then(|s| s.saved_path)
        });
        (self.insert(Some(principal), None), saved_path)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, principal: Option<Principal>, saved_path: Option<String>) -> Session {
        let now = OffsetDateTime::now_utc();
        let session = Session {
            id: Uuid::new_v4(),
            principal,
            saved_path,
            expires_at: now + self.ttl(),
        };
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, s| s.is_live(now));
        sessions.insert(session.id, session.clone());
        session
    }

    /// `Set-Cookie` value binding the browser to `session`.
    pub fn cookie(&self, session: &Session) -> String {
        let secure = if self.cfg.secure_cookie { "; Secure" } else { "" };
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            self.cfg.cookie_name,
            session.id,
            self.ttl().whole_seconds(),
            secure
        )
    }

    #[cfg(test)]
    pub(crate) fn expire(&self, id: Uuid) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if let Some(s) = sessions.get_mut(&id) {
            s.expires_at = OffsetDateTime::now_utc() - Duration::seconds(1);
        }
    }
}

fn session_id_from(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
