//! Session gate: who is signed in, and whether the editor is open.

mod cloud;
mod memory;

use std::future::Future;

use serde::{Deserialize, Serialize};
use shared::UserId;
use thiserror::Error;
use tokio::sync::watch;

pub use cloud::CloudAuth;
pub use memory::MemoryAuth;

/// Authenticated identity
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            access_token: None,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("{0}")]
    Rejected(String),

    #[error("Auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Minimal email sanity check before contacting the auth service
pub fn validate_email(address: &str) -> Result<&str, AuthError> {
    let address = address.trim();
    match address.split_once('@') {
        Some((user, domain))
            if !user.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(address)
        }
        _ => Err(AuthError::InvalidEmail),
    }
}

/// External authentication service
pub trait AuthService: Send + Sync + 'static {
    /// Existing session, if one can be restored
    fn current_session(&self) -> impl Future<Output = Result<Option<Session>, AuthError>> + Send;

    /// Session-change notifications for the lifetime of the service
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    /// Send a magic link. The resulting session arrives via [`subscribe`](Self::subscribe).
    fn sign_in_with_email_link(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Complete sign-in with the one-time code from the link email
    fn confirm_sign_in(
        &self,
        address: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Outcome of a session change as seen by the gate
#[derive(Debug, Clone, PartialEq)]
pub enum GateEvent {
    /// A user was admitted (or a different user replaced the previous one)
    Admitted(Session),
    /// The session ended; editor state must be discarded
    SignedOut,
    Unchanged,
}

/// Tracks the current session and turns raw session changes into
/// admit / sign-out transitions.
pub struct SessionGate {
    changes: watch::Receiver<Option<Session>>,
    current: Option<Session>,
}

impl SessionGate {
    pub fn new(changes: watch::Receiver<Option<Session>>) -> Self {
        Self {
            changes,
            current: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.user_id.as_str())
    }

    pub fn is_admitted(&self) -> bool {
        self.current.is_some()
    }

    /// Move to `next`, reporting what changed
    pub fn transition(&mut self, next: Option<Session>) -> GateEvent {
        let event = match (&self.current, &next) {
            (None, None) => GateEvent::Unchanged,
            (Some(_), None) => GateEvent::SignedOut,
            (Some(cur), Some(new)) if cur.user_id == new.user_id => GateEvent::Unchanged,
            (_, Some(new)) => GateEvent::Admitted(new.clone()),
        };
        // Same user may come back with a refreshed token
        self.current = next;
        event
    }

    /// Pick up a pending session-change notification without waiting
    pub fn observe(&mut self) -> GateEvent {
        match self.changes.has_changed() {
            Ok(true) => {
                let next = self.changes.borrow_and_update().clone();
                self.transition(next)
            }
            Ok(false) => GateEvent::Unchanged,
            Err(_) => {
                // Service dropped: treat as signed out
                self.transition(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Session {
        Session::new("alice", "alice@example.com")
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" a@b.co ").unwrap(), "a@b.co");
        assert!(validate_email("nope").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a@localhost").is_err());
    }

    #[test]
    fn test_transitions() {
        let (_tx, rx) = watch::channel(None);
        let mut gate = SessionGate::new(rx);
        assert_eq!(gate.transition(None), GateEvent::Unchanged);
        assert_eq!(gate.transition(Some(alice())), GateEvent::Admitted(alice()));
        assert!(gate.is_admitted());
        assert_eq!(gate.transition(Some(alice())), GateEvent::Unchanged);

        let bob = Session::new("bob", "bob@example.com");
        assert_eq!(gate.transition(Some(bob.clone())), GateEvent::Admitted(bob));
        assert_eq!(gate.transition(None), GateEvent::SignedOut);
        assert!(!gate.is_admitted());
    }

    #[test]
    fn test_observe_picks_up_changes() {
        let (tx, rx) = watch::channel(None);
        let mut gate = SessionGate::new(rx);
        assert_eq!(gate.observe(), GateEvent::Unchanged);

        tx.send(Some(alice())).unwrap();
        assert_eq!(gate.observe(), GateEvent::Admitted(alice()));
        assert_eq!(gate.observe(), GateEvent::Unchanged);

        tx.send(None).unwrap();
        assert_eq!(gate.observe(), GateEvent::SignedOut);
    }

    #[test]
    fn test_debug_hides_token() {
        let mut s = alice();
        s.access_token = Some("secret".into());
        assert!(!format!("{s:?}").contains("secret"));
    }
}
