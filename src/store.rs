//! Cross-page session stores. Both are last-writer-wins; every write is a
//! short synchronous critical section.

use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::models::{TeamRole, User};

/// Snapshot of the project store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub topic_id: Option<String>,
    pub topic_name: Option<String>,
    pub sidebar_collapsed: bool,
}

/// Active topic identity and sidebar flag, written by the dashboard layout
#[derive(Debug, Default)]
pub struct ProjectStore {
    state: RwLock<ProjectState>,
}

impl ProjectStore {
    pub fn set_topic(&self, id: &str, name: &str) {
        let mut state = self.state.write();
        state.topic_id = Some(id.to_string());
        state.topic_name = Some(name.to_string());
    }

    pub fn clear_topic(&self) {
        let mut state = self.state.write();
        state.topic_id = None;
        state.topic_name = None;
    }

    /// Flip the sidebar and return the new collapsed flag
    pub fn toggle_sidebar(&self) -> bool {
        let mut state = self.state.write();
        state.sidebar_collapsed = !state.sidebar_collapsed;
        state.sidebar_collapsed
    }

    pub fn snapshot(&self) -> ProjectState {
        self.state.read().clone()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Signed-in user and bearer token
#[derive(Debug, Default)]
pub struct AuthStore {
    session: RwLock<Option<Session>>,
}

impl AuthStore {
    /// Mock sign-in: any address containing `@` with a password of six or more characters
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(DashboardError::validation("Enter a valid email address"));
        }
        if password.chars().count() < 6 {
            return Err(DashboardError::validation(
                "Password must be at least 6 characters",
            ));
        }

        let name = email.split('@').next().unwrap_or(email).to_string();
        let session = Session {
            user: User {
                id: format!("user_{}", name.to_lowercase()),
                name,
                email: email.to_string(),
                role: TeamRole::Admin,
            },
            token: random_token(32),
        };

        *self.session.write() = Some(session.clone());
        tracing::info!(email = %session.user.email, "user signed in");
        Ok(session)
    }

    pub fn logout(&self) {
        if let Some(session) = self.session.write().take() {
            tracing::info!(email = %session.user.email, "user signed out");
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// The signed-in user, when `token` matches the stored token
    pub fn verify(&self, token: &str) -> Option<User> {
        self.session
            .read()
            .as_ref()
            .filter(|s| s.token == token)
            .map(|s| s.user.clone())
    }
}

pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
