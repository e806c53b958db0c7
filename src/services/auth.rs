//! Authentication service
//!
//! Credential login, token refresh, and logout for admin accounts. Refresh
//! tokens rotate: every successful refresh issues a new pair and replaces
//! the stored refresh-token hash, so a replayed older refresh token is
//! rejected. Only a hash of the refresh token is persisted.

use anyhow::Context;
use std::sync::Arc;

use super::password::{hash_secret, verify_secret};
use super::token::{Claims, TokenIssuer, TokenPair};
use super::ServiceError;
use crate::db::repositories::AdminRepository;
use crate::models::Admin;

/// Admin session lifecycle service
pub struct AuthService {
    admins: Arc<dyn AdminRepository>,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(admins: Arc<dyn AdminRepository>, tokens: Arc<TokenIssuer>) -> Self {
        Self { admins, tokens }
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown usernames and wrong passwords produce the same error, so the
    /// response does not reveal which accounts exist.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let admin = self
            .admins
            .get_by_username(username)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_secret(password, &admin.password_hash)? {
            return Err(invalid_credentials());
        }

        self.open_session(&admin).await
    }

    /// Exchange a valid refresh token for a fresh pair.
    ///
    /// The presented token must match the stored hash; after rotation the
    /// previous refresh token no longer does.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ServiceError> {
        let claims = self
            .tokens
            .decode_refresh(refresh_token)
            .map_err(|_| invalid_refresh())?;

        let admin = self
            .admins
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(invalid_refresh)?;

        let stored_hash = admin.refresh_token_hash.as_deref().ok_or_else(invalid_refresh)?;
        if !verify_secret(refresh_token, stored_hash)? {
            return Err(invalid_refresh());
        }

        self.open_session(&admin).await
    }

    /// Close the session by discarding the stored refresh-token hash
    pub async fn logout(&self, admin_id: i64) -> Result<(), ServiceError> {
        let cleared = self.admins.set_refresh_token_hash(admin_id, None).await?;
        if !cleared {
            return Err(ServiceError::NotFound("Admin not found".to_string()));
        }
        Ok(())
    }

    /// Validate an access token, returning its claims
    pub fn authenticate(&self, access_token: &str) -> Result<Claims, ServiceError> {
        self.tokens
            .decode_access(access_token)
            .map_err(|_| ServiceError::Unauthorized("Invalid or expired access token".to_string()))
    }

    /// Issue a pair and pin the refresh token's hash to the account
    async fn open_session(&self, admin: &Admin) -> Result<TokenPair, ServiceError> {
        let pair = self
            .tokens
            .issue_pair(admin)
            .context("Failed to issue token pair")?;

        let hash = hash_secret(&pair.refresh_token)?;
        self.admins
            .set_refresh_token_hash(admin.id, Some(&hash))
            .await?;

        Ok(pair)
    }
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid username or password".to_string())
}

fn invalid_refresh() -> ServiceError {
    ServiceError::Unauthorized("Invalid refresh token".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::db::repositories::SqlxAdminRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (AuthService, Arc<dyn AdminRepository>) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let admins = SqlxAdminRepository::boxed(pool);
        admins
            .create("admin1", "admin1@mail.com", &hash_secret("Admin1Pass").unwrap())
            .await
            .unwrap();

        let tokens = Arc::new(TokenIssuer::new(&AuthConfig::default()));
        (AuthService::new(admins.clone(), tokens), admins)
    }

    #[tokio::test]
    async fn login_with_valid_credentials() {
        let (auth, admins) = setup().await;
        let pair = auth.login("admin1", "Admin1Pass").await.expect("login failed");

        let claims = auth.authenticate(&pair.access_token).unwrap();
        assert_eq!(claims.username, "admin1");

        // Session pinned a refresh-token hash
        let admin = admins.get_by_username("admin1").await.unwrap().unwrap();
        assert!(admin.refresh_token_hash.is_some());
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials_uniformly() {
        let (auth, _) = setup().await;

        let wrong_password = auth.login("admin1", "nope").await.unwrap_err();
        let unknown_user = auth.login("ghost", "Admin1Pass").await.unwrap_err();

        assert!(matches!(wrong_password, ServiceError::Unauthorized(_)));
        assert!(matches!(unknown_user, ServiceError::Unauthorized(_)));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn refresh_rotates_the_token() {
        let (auth, _) = setup().await;
        let first = auth.login("admin1", "Admin1Pass").await.unwrap();

        let second = auth.refresh(&first.refresh_token).await.expect("refresh failed");
        assert_ne!(first.refresh_token, second.refresh_token);

        // The replaced token no longer matches the stored hash
        let replay = auth.refresh(&first.refresh_token).await;
        assert!(matches!(replay, Err(ServiceError::Unauthorized(_))));

        // The new one works
        auth.refresh(&second.refresh_token).await.expect("rotated token rejected");
    }

    #[tokio::test]
    async fn access_token_is_not_a_refresh_token() {
        let (auth, _) = setup().await;
        let pair = auth.login("admin1", "Admin1Pass").await.unwrap();

        let result = auth.refresh(&pair.access_token).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn logout_invalidates_refresh() {
        let (auth, admins) = setup().await;
        let pair = auth.login("admin1", "Admin1Pass").await.unwrap();

        let admin = admins.get_by_username("admin1").await.unwrap().unwrap();
        auth.logout(admin.id).await.expect("logout failed");

        let stored = admins.get_by_id(admin.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());

        let result = auth.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }
}
