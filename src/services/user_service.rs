//! User service for account and address operations.
//!
//! Owns the credential rules: uniqueness checks on registration, argon2
//! hashing and the single error message shared by every login failure.

use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Address, NewAddress, NewUser, Role, User};
use crate::repositories::UserRepository;
use crate::utils::password::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// A user together with their stored addresses.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub addresses: Vec<Address>,
}

/// Address fields supplied by the caller.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub zip_code: String,
    pub is_default: bool,
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Creates an account with the default `user` role.
    ///
    /// # Errors
    /// `Conflict` when the email or the username is already taken
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<User> {
        if let Some(existing) = self.repo.find_by_email_or_username(email, username).await? {
            let (field, value) = if existing.email == email {
                ("email", email)
            } else {
                ("username", username)
            };
            return Err(AppError::Conflict {
                entity: "user".to_string(),
                field: field.to_string(),
                value: value.to_string(),
            });
        }

        let user = self
            .repo
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
                role: Role::User,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies an email and password pair.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user", "id", user_id))
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let user = self.get_user(user_id).await?;
        let addresses = self.repo.list_addresses(user_id).await?;
        Ok(Profile { user, addresses })
    }

    /// Stores a new address; a default address replaces the previous default.
    ///
    /// # Returns
    /// The user's full address list
    pub async fn add_address(&self, user_id: Uuid, input: AddressInput) -> AppResult<Vec<Address>> {
        let addresses = self
            .repo
            .add_address(NewAddress {
                user_id,
                street: input.street,
                city: input.city,
                zip_code: input.zip_code,
                is_default: input.is_default,
            })
            .await?;

        info!(user_id = %user_id, count = addresses.len(), "Address added");
        Ok(addresses)
    }

    /// Removes one of the caller's addresses and returns the rest.
    pub async fn remove_address(&self, user_id: Uuid, address_id: Uuid) -> AppResult<Vec<Address>> {
        let removed = self.repo.remove_address(user_id, address_id).await?;
        if removed == 0 {
            return Err(AppError::not_found("address", "id", address_id));
        }

        info!(user_id = %user_id, address_id = %address_id, "Address removed");
        self.repo.list_addresses(user_id).await
    }

    /// Sets a user's role, looked up by email.
    pub async fn set_role(&self, email: &str, role: Role) -> AppResult<User> {
        let user = self
            .repo
            .set_role(email, role)
            .await?
            .ok_or_else(|| AppError::not_found("user", "email", email))?;

        info!(user_id = %user.id, role = %role, "User role changed");
        Ok(user)
    }
}
