use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use model::entities::user;
use rand::rngs::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::token::TokenSigner;

/// New-user registration data. The password arrives in plaintext and
/// leaves this module only as an Argon2 hash.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub about_me: Option<String>,
}

/// User records, credential hashing and verification, and the
/// password-reset token lifecycle.
///
/// Constructed with an explicit database handle and token signer; no
/// ambient global state.
#[derive(Clone, Debug)]
pub struct IdentityService {
    db: DatabaseConnection,
    tokens: TokenSigner,
    /// Verified against when the username is unknown, so both failure
    /// paths do comparable work.
    dummy_hash: String,
}

impl IdentityService {
    pub fn new(db: DatabaseConnection, tokens: TokenSigner) -> Result<Self> {
        let dummy_hash = hash_password("invalid-password-placeholder")?;
        Ok(Self {
            db,
            tokens,
            dummy_hash,
        })
    }

    /// Register a new user. Fails with `DuplicateUsername` or
    /// `DuplicateEmail` on a case-sensitive exact match against an
    /// existing record.
    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<user::Model> {
        if user::Entity::find()
            .filter(user::Column::Username.eq(&new_user.username))
            .one(&self.db)
            .await?
            .is_some()
        {
            warn!("registration rejected: username taken");
            return Err(ServiceError::DuplicateUsername(new_user.username));
        }
        if user::Entity::find()
            .filter(user::Column::Email.eq(&new_user.email))
            .one(&self.db)
            .await?
            .is_some()
        {
            warn!("registration rejected: email taken");
            return Err(ServiceError::DuplicateEmail(new_user.email));
        }

        let created = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(hash_password(&new_user.password)?),
            last_seen: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(user_id = created.id, "user created");
        Ok(created)
    }

    /// Check a username/password pair. Returns `None` for an unknown
    /// username and for a wrong password alike; callers must not
    /// distinguish the two.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<user::Model>> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        match found {
            Some(user) if verify_password(password, &user.password_hash) => {
                debug!(user_id = user.id, "credentials verified");
                Ok(Some(user))
            }
            Some(_) => Ok(None),
            None => {
                // Burn a comparable verification so the unknown-username
                // path is not observably cheaper.
                let _ = verify_password(password, &self.dummy_hash);
                Ok(None)
            }
        }
    }

    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    /// Record that the user was just active.
    #[instrument(skip(self))]
    pub async fn touch_last_seen(&self, user_id: i32) -> Result<()> {
        let Some(found) = user::Entity::find_by_id(user_id).one(&self.db).await? else {
            return Err(ServiceError::NotFound("user", user_id));
        };
        let mut active: user::ActiveModel = found.into();
        active.last_seen = Set(Some(Utc::now()));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Update profile fields; untouched fields keep their value.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<user::Model> {
        let Some(found) = user::Entity::find_by_id(user_id).one(&self.db).await? else {
            return Err(ServiceError::NotFound("user", user_id));
        };
        let mut active: user::ActiveModel = found.into();
        if let Some(firstname) = update.firstname {
            active.firstname = Set(Some(firstname));
        }
        if let Some(lastname) = update.lastname {
            active.lastname = Set(Some(lastname));
        }
        if let Some(about_me) = update.about_me {
            active.about_me = Set(Some(about_me));
        }
        Ok(active.update(&self.db).await?)
    }

    /// Delete the account. Posts and follow edges in both directions go
    /// with it (cascade at the store level).
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: i32) -> Result<()> {
        let res = user::Entity::delete_by_id(user_id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound("user", user_id));
        }
        info!(user_id, "user deleted");
        Ok(())
    }

    /// Issue a signed, time-limited password-reset token for the user.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub fn issue_reset_token(&self, user: &user::Model) -> Result<String> {
        self.tokens.issue(user.id)
    }

    /// Resolve a reset token back to its user. Fails closed: bad
    /// signature, expiry, decode errors, and vanished users all yield
    /// `None`.
    #[instrument(skip(self, token))]
    pub async fn verify_reset_token(&self, token: &str) -> Result<Option<user::Model>> {
        let Some(user_id) = self.tokens.verify(token) else {
            debug!("reset token rejected");
            return Ok(None);
        };
        self.find_by_id(user_id).await
    }

    /// Replace the password hash. Existing sessions stay valid.
    #[instrument(skip(self, new_password))]
    pub async fn set_password(&self, user_id: i32, new_password: &str) -> Result<()> {
        let Some(found) = user::Entity::find_by_id(user_id).one(&self.db).await? else {
            return Err(ServiceError::NotFound("user", user_id));
        };
        let mut active: user::ActiveModel = found.into();
        active.password_hash = Set(hash_password(new_password)?);
        active.update(&self.db).await?;
        info!(user_id, "password updated");
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Gravatar URL for a user's email, as the original profile pages
/// render it.
pub fn avatar_url(email: &str, size: u32) -> String {
    let digest = md5::compute(email.to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?d=identicon&s={size}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_user, setup_services};

    #[tokio::test]
    async fn create_then_verify_credentials() {
        let (identity, _, _, _) = setup_services().await;

        let bob = identity.create_user(new_user("bob")).await.unwrap();
        assert_eq!(bob.username, "bob");
        // Plaintext is never stored
        assert_ne!(bob.password_hash, "pw-bob");
        assert!(bob.password_hash.starts_with("$argon2"));

        let ok = identity.verify_credentials("bob", "pw-bob").await.unwrap();
        assert_eq!(ok.map(|u| u.id), Some(bob.id));

        let bad_pw = identity.verify_credentials("bob", "wrong").await.unwrap();
        assert!(bad_pw.is_none());

        let bad_user = identity
            .verify_credentials("nobody", "pw-bob")
            .await
            .unwrap();
        assert!(bad_user.is_none());
    }

    #[tokio::test]
    async fn duplicate_username_and_email_rejected() {
        let (identity, _, _, _) = setup_services().await;
        identity.create_user(new_user("bob")).await.unwrap();

        let err = identity.create_user(new_user("bob")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateUsername(_)));

        let err = identity
            .create_user(NewUser {
                username: "bob2".to_string(),
                email: "bob@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn reset_token_round_trip_and_set_password() {
        let (identity, _, _, _) = setup_services().await;
        let bob = identity.create_user(new_user("bob")).await.unwrap();

        let token = identity.issue_reset_token(&bob).unwrap();
        let resolved = identity.verify_reset_token(&token).await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(bob.id));

        identity.set_password(bob.id, "brand-new").await.unwrap();
        assert!(identity
            .verify_credentials("bob", "pw-bob")
            .await
            .unwrap()
            .is_none());
        assert!(identity
            .verify_credentials("bob", "brand-new")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn reset_token_for_deleted_user_is_none() {
        let (identity, _, _, _) = setup_services().await;
        let bob = identity.create_user(new_user("bob")).await.unwrap();
        let token = identity.issue_reset_token(&bob).unwrap();

        identity.delete_user(bob.id).await.unwrap();
        assert!(identity.verify_reset_token(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let (identity, _, _, _) = setup_services().await;
        let bob = identity.create_user(new_user("bob")).await.unwrap();

        let updated = identity
            .update_profile(
                bob.id,
                ProfileUpdate {
                    about_me: Some("likes rust".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.about_me.as_deref(), Some("likes rust"));
        assert_eq!(updated.firstname, None);

        let updated = identity
            .update_profile(
                bob.id,
                ProfileUpdate {
                    firstname: Some("Bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.firstname.as_deref(), Some("Bob"));
        assert_eq!(updated.about_me.as_deref(), Some("likes rust"));
    }

    #[test]
    fn avatar_url_is_derived_from_lowercased_email() {
        let a = avatar_url("Bob@Example.com", 128);
        let b = avatar_url("bob@example.com", 128);
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("s=128"));
    }
}
