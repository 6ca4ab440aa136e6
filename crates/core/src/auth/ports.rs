//! Port interface for the authentication session

use async_trait::async_trait;
use snaptrack_domain::{AuthUser, Result};
use tokio::sync::watch;

/// Source of the current signed-in user.
///
/// The session is established by an external login flow, which hands the
/// resulting user to [`sign_in`](AuthProvider::sign_in).
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current user, `None` when signed out.
    async fn get_session(&self) -> Result<Option<AuthUser>>;

    /// Receiver that is updated whenever the user changes.
    fn on_change(&self) -> watch::Receiver<Option<AuthUser>>;

    /// Record `user` as the signed-in user.
    ///
    /// # Errors
    /// Returns `SnaptrackError::InvalidInput` if the user id is blank.
    async fn sign_in(&self, user: AuthUser) -> Result<()>;

    /// Clear the session.
    async fn sign_out(&self) -> Result<()>;
}
