use async_trait::async_trait;
use snaptrack_core::AuthProvider;
use snaptrack_domain::{AuthUser, Result};
use tokio::sync::watch;

/// Session fixed by the test.
pub struct StaticAuth {
    sender: watch::Sender<Option<AuthUser>>,
}

impl StaticAuth {
    pub fn signed_in(id: &str) -> Self {
        Self { sender: watch::Sender::new(Some(AuthUser::new(id))) }
    }

    pub fn signed_out() -> Self {
        Self { sender: watch::Sender::new(None) }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn get_session(&self) -> Result<Option<AuthUser>> {
        Ok(self.sender.borrow().clone())
    }

    fn on_change(&self) -> watch::Receiver<Option<AuthUser>> {
        self.sender.subscribe()
    }

    async fn sign_in(&self, user: AuthUser) -> Result<()> {
        self.sender.send_replace(Some(user));
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.sender.send_replace(None);
        Ok(())
    }
}
