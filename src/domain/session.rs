use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-wide session credential.
///
/// Set once at login and cleared at logout; gateway adapters receive a
/// handle at construction instead of reading a token from ambient storage.
/// Cloning shares the same underlying credential.
#[derive(Default, Clone)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    /// A session with no credential yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that is already logged in.
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    pub async fn login(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn logout(&self) {
        *self.token.write().await = None;
    }

    /// The bearer credential to attach to outbound calls, if logged in.
    pub async fn bearer(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_logout_lifecycle() {
        let session = Session::new();
        assert_eq!(session.bearer().await, None);

        session.login("token-123").await;
        assert_eq!(session.bearer().await.as_deref(), Some("token-123"));

        session.logout().await;
        assert_eq!(session.bearer().await, None);
    }

    #[tokio::test]
    async fn test_clones_share_the_credential() {
        let session = Session::authenticated("token-123");
        let clone = session.clone();
        session.logout().await;
        assert_eq!(clone.bearer().await, None);
    }
}
