//! Session gate for the client views.
//!
//! A [`SessionContext`] owns the backend handle, a persisted token store and
//! the current [`SessionState`]. Views ask it for a [`Gate`] decision before
//! rendering.

use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Backend, ClientError, ClientResult};
use crate::models::UserProfile;

/// Routes the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Entry,
    Dashboard,
    Sales,
    NewSale,
    SalesHistory,
    Inventory,
    Profile,
}

impl View {
    pub fn path(self) -> &'static str {
        match self {
            View::Entry => "/",
            View::Dashboard => "/dashboard",
            View::Sales => "/sales",
            View::NewSale => "/sales/new",
            View::SalesHistory => "/sales/history",
            View::Inventory => "/inventory",
            View::Profile => "/profile",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        [
            View::Entry,
            View::Dashboard,
            View::Sales,
            View::NewSale,
            View::SalesHistory,
            View::Inventory,
            View::Profile,
        ]
        .into_iter()
        .find(|view| view.path() == path)
    }

    pub fn is_protected(self) -> bool {
        self != View::Entry
    }
}

/// What a view should do given the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Render,
    ShowLoader,
    Redirect(View),
}

/// What survives a restart: just the bearer token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated { error: Option<String> },
    Loading,
    Authenticated(Session),
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> impl Future<Output = ClientResult<Option<StoredSession>>> + Send;

    fn save(&self, session: &StoredSession) -> impl Future<Output = ClientResult<()>> + Send;

    fn clear(&self) -> impl Future<Output = ClientResult<()>> + Send;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> ClientResult<Option<StoredSession>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    pub fn snapshot(&self) -> Option<StoredSession> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or(None)
    }

    fn replace(&self, value: Option<StoredSession>) -> ClientResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ClientError::Store(std::io::Error::other("session store poisoned")))?;
        *slot = value;
        Ok(())
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> ClientResult<Option<StoredSession>> {
        Ok(self.snapshot())
    }

    async fn save(&self, session: &StoredSession) -> ClientResult<()> {
        self.replace(Some(session.clone()))
    }

    async fn clear(&self) -> ClientResult<()> {
        self.replace(None)
    }
}

pub struct SessionContext<B, S> {
    backend: B,
    store: S,
    state: SessionState,
}

impl<B: Backend, S: SessionStore> SessionContext<B, S> {
    /// Starts in `Loading` until [`restore`](Self::restore) has run.
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            store,
            state: SessionState::Loading,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.session().and_then(|s| s.profile.as_ref())
    }

    pub fn is_admin(&self) -> bool {
        self.profile().is_some_and(UserProfile::is_admin)
    }

    pub fn access_token(&self) -> ClientResult<&str> {
        self.session()
            .map(|s| s.access_token.as_str())
            .ok_or(ClientError::NotSignedIn)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Unauthenticated { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Picks up a persisted token and checks it with the server.
    pub async fn restore(&mut self) -> &SessionState {
        self.state = SessionState::Loading;

        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session");
                None
            }
        };

        let Some(stored) = stored else {
            self.state = SessionState::Unauthenticated { error: None };
            return &self.state;
        };

        if stored.is_expired(Utc::now()) {
            tracing::debug!("stored session expired");
            self.forget().await;
            self.state = SessionState::Unauthenticated { error: None };
            return &self.state;
        }

        self.state = match self.backend.current_session(&stored.access_token).await {
            Ok(info) => SessionState::Authenticated(Session {
                access_token: stored.access_token,
                expires_at: info.expires_at,
                profile: Some(info.profile),
            }),
            Err(e) if e.is_unauthorized() => {
                tracing::debug!("stored session rejected by server");
                self.forget().await;
                SessionState::Unauthenticated { error: None }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not validate stored session");
                SessionState::Unauthenticated {
                    error: Some(e.to_string()),
                }
            }
        };
        &self.state
    }

    /// On success returns where to navigate next. On failure the state is
    /// `Unauthenticated` carrying the message to show inline.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Option<View> {
        self.state = SessionState::Loading;

        match self.backend.sign_in(email, password).await {
            Ok(resp) => {
                let stored = StoredSession {
                    access_token: resp.access_token.clone(),
                    expires_at: resp.expires_at,
                };
                if let Err(e) = self.store.save(&stored).await {
                    tracing::warn!(error = %e, "could not persist session");
                }
                self.state = SessionState::Authenticated(Session {
                    access_token: resp.access_token,
                    expires_at: resp.expires_at,
                    profile: Some(resp.profile),
                });
                Some(View::Dashboard)
            }
            Err(e) => {
                self.state = SessionState::Unauthenticated {
                    error: Some(e.to_string()),
                };
                None
            }
        }
    }

    /// Drops the local session first, then revokes it server-side if possible.
    pub async fn sign_out(&mut self) -> View {
        let previous = std::mem::replace(
            &mut self.state,
            SessionState::Unauthenticated { error: None },
        );
        self.forget().await;

        if let SessionState::Authenticated(session) = previous {
            if let Err(e) = self.backend.sign_out(&session.access_token).await {
                tracing::warn!(error = %e, "server sign-out failed");
            }
        }
        View::Entry
    }

    pub fn gate(&self, view: View) -> Gate {
        match (&self.state, view.is_protected()) {
            (SessionState::Authenticated(_), false) => Gate::Redirect(View::Dashboard),
            (_, false) => Gate::Render,
            (SessionState::Loading, true) => Gate::ShowLoader,
            (SessionState::Unauthenticated { .. }, true) => Gate::Redirect(View::Entry),
            (SessionState::Authenticated(_), true) => Gate::Render,
        }
    }

    async fn forget(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "could not clear stored session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        assert_eq!(View::from_path("/sales/new"), Some(View::NewSale));
        assert_eq!(View::from_path("/inventory/"), Some(View::Inventory));
        assert_eq!(View::from_path(""), Some(View::Entry));
        assert_eq!(View::from_path("/nope"), None);
    }

    #[test]
    fn only_entry_is_public() {
        assert!(!View::Entry.is_protected());
        assert!(View::Profile.is_protected());
    }
}
