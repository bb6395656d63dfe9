use std::{future::Future, str::FromStr, sync::Arc, time::Duration};

use anyhow::anyhow;
use tokio::{task, time::timeout};
use tracing::info;

use super::{
    dto::{LoginRequest, SearchParams, SignupRequest},
    jwt::{Claims, JwtKeys},
    password,
    repo::UserStore,
    repo_types::{Gender, PublicUser, User},
    validate,
};
use crate::error::AppError;

// Minimum length in characters, not bytes.
const MIN_PASSWORD_LEN: usize = 8;

/// Signup, login and directory search over a [`UserStore`].
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    pub(crate) jwt: JwtKeys,
    op_timeout: Duration,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>, jwt: JwtKeys, op_timeout: Duration) -> Self {
        Self {
            store,
            jwt,
            op_timeout,
        }
    }

    /// Bounds a store or hashing call; a stalled dependency surfaces as
    /// an internal error instead of a hung request.
    async fn deadline<T>(
        &self,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        timeout(self.op_timeout, fut)
            .await
            .map_err(|_| AppError::Internal(anyhow!("store operation timed out")))?
    }

    async fn hash_blocking(&self, plain: String) -> Result<String, AppError> {
        let digest = task::spawn_blocking(move || password::hash_password(&plain))
            .await
            .map_err(anyhow::Error::from)??;
        Ok(digest)
    }

    async fn verify_blocking(&self, plain: String, digest: String) -> Result<bool, AppError> {
        let ok = task::spawn_blocking(move || password::verify_password(&plain, &digest))
            .await
            .map_err(anyhow::Error::from)??;
        Ok(ok)
    }

    fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
        match value {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(AppError::Validation(message.into())),
        }
    }

    /// Validates, hashes, stores and signs a token for a new account.
    ///
    /// Checks run in a fixed order; clients rely on which message wins
    /// when several fields are bad at once.
    pub async fn signup(&self, payload: SignupRequest) -> Result<(PublicUser, String), AppError> {
        let name = Self::required(payload.name, "Empty input fields!")?;
        let email = Self::required(payload.email, "Empty input fields!")?;
        let password = Self::required(payload.password, "Empty input fields!")?;
        let contact = Self::required(payload.contact, "Empty input fields!")?;
        let address = Self::required(payload.address, "Empty input fields!")?;
        let gender = Self::required(payload.gender, "Empty input fields!")?;
        let country = Self::required(payload.country, "Empty input fields!")?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation("Password is too short!".into()));
        }

        let password_hash = self.deadline(self.hash_blocking(password)).await?;

        let gender = Gender::from_str(&gender)
            .map_err(|_| AppError::Validation("Please select one of the given options".into()))?;

        if !validate::is_valid_contact(&contact) {
            return Err(AppError::Validation("Invalid contact entered".into()));
        }

        if !validate::is_valid_email(&email) {
            return Err(AppError::Validation("Invalid email entered".into()));
        }

        // Pre-check plus the unique index; the index has the last word
        // under concurrent signups.
        if self
            .deadline(self.store.find_by_email(&email))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "User with the email already exists".into(),
            ));
        }

        let user = User {
            id: None,
            name,
            email,
            password_hash,
            contact,
            address: Some(address),
            gender,
            country: Some(country),
        };
        let user = self.deadline(self.store.insert(user)).await?;
        let public = user
            .into_public()
            .ok_or_else(|| AppError::Internal(anyhow!("inserted user has no id")))?;
        let token = self.jwt.sign(&public)?;
        info!(user_id = %public.id, "user signed up");
        Ok((public, token))
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<String, AppError> {
        let email = Self::required(payload.email, "Provide all the credentials!")?;
        let password = Self::required(payload.password, "Provide all the credentials!")?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation("Password is too short!".into()));
        }

        // Same message for an unknown email and a wrong password.
        let Some(user) = self.deadline(self.store.find_by_email(&email)).await? else {
            return Err(AppError::Unauthorized(
                "Please provide valid credentials".into(),
            ));
        };

        let authorised = self
            .deadline(self.verify_blocking(password, user.password_hash.clone()))
            .await?;
        if !authorised {
            return Err(AppError::Unauthorized(
                "Please provide valid credentials".into(),
            ));
        }

        let public = user
            .into_public()
            .ok_or_else(|| AppError::Internal(anyhow!("stored user has no id")))?;
        let token = self.jwt.sign(&public)?;
        info!(user_id = %public.id, "user logged in");
        Ok(token)
    }

    /// Directory search by name or contact, matched as an unanchored
    /// regex anywhere in the stored value. Name wins when both
    /// parameters are given. The caller is filtered out of the results.
    pub async fn search(
        &self,
        caller: &Claims,
        params: SearchParams,
    ) -> Result<Vec<PublicUser>, AppError> {
        let name = params.name.filter(|s| !s.is_empty());
        let contact = params.contact.filter(|s| !s.is_empty());

        let mut results = match (name, contact) {
            (Some(name), _) => self.deadline(self.store.find_by_name_pattern(&name)).await?,
            (None, Some(contact)) => {
                self.deadline(self.store.find_by_contact_pattern(&contact))
                    .await?
            }
            (None, None) => {
                return Err(AppError::Validation("Provide required info!".into()));
            }
        };

        results.retain(|user| user.id.to_hex() != caller.sub);
        info!(matches = results.len(), "directory search");
        Ok(results)
    }
}
