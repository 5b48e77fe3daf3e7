//! Credential accounts and session contexts. This is the provider half of
//! the system: it owns the `accounts` collection and knows nothing about
//! roles, approval, or any other `users` data.

use serde::{Deserialize, Serialize};
use surrealdb::{Surreal, engine::any::Any};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    consts::store_const::ACCOUNT_TABLE,
    errors::{Error, Result},
    utils::{pwd, time},
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Serialize, Deserialize, Debug, Clone)]
struct AccountRecord {
    uid: String,
    email: String,
    password_hash: String,
    created_at: String,
}

/// The signed-in identity a context holds: just the stable uid plus the
/// email it was created with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct IdentityProvider {
    db: Surreal<Any>,
}

impl IdentityProvider {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        let mut found: Vec<AccountRecord> = self
            .db
            .query("SELECT * FROM type::table($table) WHERE email = $email LIMIT 1")
            .bind(("table", ACCOUNT_TABLE))
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(found.pop())
    }

    async fn account(&self, uid: &str) -> Result<AccountRecord> {
        let account: Option<AccountRecord> = self.db.select((ACCOUNT_TABLE, uid)).await?;
        account.ok_or(Error::InvalidCredentials)
    }

    /// Creates a credential account and issues its uid. Does not touch any
    /// session state; that is the calling context's business.
    pub async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::WeakPassword);
        }
        if self.find_by_email(email).await?.is_some() {
            return Err(Error::EmailInUse(email.to_string()));
        }

        let account = AccountRecord {
            uid: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: pwd::hash(password.as_bytes())?,
            created_at: time::now_rfc3339(),
        };
        let _: Option<AccountRecord> = self
            .db
            .create((ACCOUNT_TABLE, account.uid.as_str()))
            .content(account.clone())
            .await?;

        Ok(AuthUser {
            uid: account.uid,
            email: account.email,
        })
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<AuthUser> {
        let account = self
            .find_by_email(email)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !pwd::validate(password.as_bytes(), &account.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        Ok(AuthUser {
            uid: account.uid,
            email: account.email,
        })
    }

    pub async fn reauthenticate(&self, uid: &str, current_password: &str) -> Result<()> {
        let account = self.account(uid).await?;
        if !pwd::validate(current_password.as_bytes(), &account.password_hash)? {
            return Err(Error::InvalidCredentials);
        }
        Ok(())
    }

    pub async fn change_password(&self, uid: &str, new_password: &str) -> Result<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(Error::WeakPassword);
        }
        let account = self.account(uid).await?;
        let password_hash = pwd::hash(new_password.as_bytes())?;
        let _: Option<AccountRecord> = self
            .db
            .update((ACCOUNT_TABLE, account.uid.as_str()))
            .merge(serde_json::json!({ "password_hash": password_hash }))
            .await?;
        Ok(())
    }

    pub async fn account_user(&self, uid: &str) -> Result<AuthUser> {
        let account = self.account(uid).await?;
        Ok(AuthUser {
            uid: account.uid,
            email: account.email,
        })
    }
}

/// One logical sign-in scope, the equivalent of a browser tab's session.
/// Holds at most one identity and broadcasts every change to subscribers.
///
/// Account creation authenticates the new account *in this context* (the
/// provider's semantics), which is why registration signs out afterwards and
/// admin provisioning runs in a second, throwaway context instead of the
/// caller's own.
#[derive(Debug)]
pub struct AuthContext {
    provider: IdentityProvider,
    current: watch::Sender<Option<AuthUser>>,
}

impl AuthContext {
    pub fn new(provider: IdentityProvider) -> Self {
        let (current, _) = watch::channel(None);
        Self { provider, current }
    }

    /// Rebuilds a context around an already-authenticated identity, e.g. one
    /// recovered from a bearer token.
    pub fn resume(provider: IdentityProvider, user: AuthUser) -> Self {
        let (current, _) = watch::channel(Some(user));
        Self { provider, current }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }

    pub fn current(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    pub async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = self.provider.create_account(email, password).await?;
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = self.provider.verify_credentials(email, password).await?;
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_out(&self) {
        self.current.send_replace(None);
    }

    pub async fn reauthenticate(&self, current_password: &str) -> Result<()> {
        let user = self.current().ok_or(Error::NotSignedIn)?;
        self.provider.reauthenticate(&user.uid, current_password).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self.current().ok_or(Error::NotSignedIn)?;
        self.provider.reauthenticate(&user.uid, current_password).await?;
        self.provider.change_password(&user.uid, new_password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state;

    #[tokio::test]
    async fn create_account_rejects_duplicate_email() {
        let state = state::memory_state().await;
        let provider = state.identity;

        provider.create_account("a@x.com", "secret1").await.unwrap();
        let err = provider.create_account("a@x.com", "secret2").await.unwrap_err();
        assert!(matches!(err, Error::EmailInUse(email) if email == "a@x.com"));
    }

    #[tokio::test]
    async fn create_account_rejects_short_passwords() {
        let state = state::memory_state().await;
        let err = state.identity.create_account("a@x.com", "tiny").await.unwrap_err();
        assert!(matches!(err, Error::WeakPassword));
    }

    #[tokio::test]
    async fn verify_credentials_checks_the_password() {
        let state = state::memory_state().await;
        let provider = state.identity;
        let created = provider.create_account("a@x.com", "secret1").await.unwrap();

        let verified = provider.verify_credentials("a@x.com", "secret1").await.unwrap();
        assert_eq!(verified, created);

        let err = provider.verify_credentials("a@x.com", "nope!!").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
        let err = provider.verify_credentials("b@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn change_password_requires_reauthentication_in_context() {
        let state = state::memory_state().await;
        let provider = state.identity.clone();
        provider.create_account("a@x.com", "old-password").await.unwrap();

        let ctx = AuthContext::new(provider.clone());
        ctx.sign_in("a@x.com", "old-password").await.unwrap();

        let err = ctx.change_password("wrong", "new-password").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));

        ctx.change_password("old-password", "new-password").await.unwrap();
        provider.verify_credentials("a@x.com", "new-password").await.unwrap();
        assert!(
            provider.verify_credentials("a@x.com", "old-password").await.is_err()
        );
    }

    #[tokio::test]
    async fn context_broadcasts_session_changes() {
        let state = state::memory_state().await;
        let ctx = AuthContext::new(state.identity.clone());
        let mut changes = ctx.subscribe();
        assert!(changes.borrow().is_none());

        let user = ctx.create_account("a@x.com", "secret1").await.unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().as_ref(), Some(&user));
        assert_eq!(ctx.current(), Some(user));

        ctx.sign_out();
        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_none());
        assert!(ctx.current().is_none());
    }

    #[tokio::test]
    async fn contexts_are_isolated_from_each_other() {
        let state = state::memory_state().await;
        let primary = AuthContext::new(state.identity.clone());
        primary.create_account("primary@x.com", "secret1").await.unwrap();
        let before = primary.current().unwrap();

        let secondary = AuthContext::new(state.identity.clone());
        secondary.create_account("secondary@x.com", "secret2").await.unwrap();
        secondary.sign_out();
        drop(secondary);

        assert_eq!(primary.current(), Some(before));
    }

    #[tokio::test]
    async fn operations_without_a_session_fail() {
        let state = state::memory_state().await;
        let ctx = AuthContext::new(state.identity.clone());
        let err = ctx.reauthenticate("whatever").await.unwrap_err();
        assert!(matches!(err, Error::NotSignedIn));
    }
}
