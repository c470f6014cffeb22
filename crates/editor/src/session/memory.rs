//! In-process auth service for offline use and tests

use std::sync::Mutex;

use tokio::sync::watch;

use super::{validate_email, AuthError, AuthService, Session};

pub struct MemoryAuth {
    sender: watch::Sender<Option<Session>>,
    /// Addresses with an outstanding magic link
    pending: Mutex<Vec<String>>,
    /// Message returned by the next sign-in attempts, if set
    reject_with: Mutex<Option<String>>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            pending: Mutex::new(Vec::new()),
            reject_with: Mutex::new(None),
        }
    }

    /// Start with an existing session, as if restored from a previous run
    pub fn signed_in(session: Session) -> Self {
        let auth = Self::new();
        auth.sender.send_replace(Some(session));
        auth
    }

    /// Stable user id for an address
    pub fn user_id_for(address: &str) -> String {
        format!("user:{}", address.trim().to_ascii_lowercase())
    }

    /// Make sign-in attempts fail with `message` (`None` to accept again)
    pub fn reject_sign_in(&self, message: Option<&str>) {
        *self.reject_with.lock().unwrap_or_else(|e| e.into_inner()) = message.map(str::to_string);
    }

    pub fn pending_links(&self) -> Vec<String> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Simulate the user opening the magic link sent to `address`
    pub fn confirm_link(&self, address: &str) -> bool {
        let address = address.trim().to_ascii_lowercase();
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let Some(pos) = pending.iter().position(|a| *a == address) else {
            return false;
        };
        pending.remove(pos);
        drop(pending);

        let session = Session::new(Self::user_id_for(&address), address);
        self.sender.send_replace(Some(session));
        true
    }

    /// End the session from outside (expiry, sign-out in another tab)
    pub fn expire(&self) {
        self.sender.send_replace(None);
    }
}

impl AuthService for MemoryAuth {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.sender.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    async fn sign_in_with_email_link(&self, address: &str) -> Result<(), AuthError> {
        let address = validate_email(address)?.to_ascii_lowercase();
        if let Some(message) = self
            .reject_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(AuthError::Rejected(message));
        }

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if !pending.contains(&address) {
            pending.push(address);
        }
        Ok(())
    }

    async fn confirm_sign_in(&self, address: &str, _code: &str) -> Result<(), AuthError> {
        if self.confirm_link(address) {
            Ok(())
        } else {
            Err(AuthError::Rejected(format!(
                "No pending sign-in for {}",
                address.trim()
            )))
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sender.send_replace(None);
        Ok(())
    }
}
