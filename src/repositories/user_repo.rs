//! User repository for async database operations.
//!
//! Covers the `users` table and the addresses each user owns.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{Address, NewAddress, NewUser, Role, User};
use crate::schema::{user_addresses, users};

/// User repository holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
}

impl UserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts a new user.
    ///
    /// A concurrent insert with the same email or username surfaces as
    /// `AppError::Conflict` through the unique constraints.
    pub async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.get().await?;

        users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Finds any user holding either the email or the username.
    pub async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::email.eq(email).or(users::username.eq(username)))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Sets the role of the user with the given email.
    ///
    /// # Returns
    /// The updated user, or `None` if no user has that email
    pub async fn set_role(&self, email: &str, role: Role) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(users::table.filter(users::email.eq(email)))
            .set(users::role.eq(role))
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Lists a user's addresses in insertion order.
    pub async fn list_addresses(&self, user_id: Uuid) -> Result<Vec<Address>, AppError> {
        let mut conn = self.pool.get().await?;

        user_addresses::table
            .filter(user_addresses::user_id.eq(user_id))
            .order((user_addresses::created_at.asc(), user_addresses::id.asc()))
            .select(Address::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Adds an address and returns the user's full address list.
    ///
    /// When the new address is the default, the previous default is cleared
    /// in the same transaction.
    pub async fn add_address(&self, new_address: NewAddress) -> Result<Vec<Address>, AppError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let owner = new_address.user_id;

                if new_address.is_default {
                    diesel::update(
                        user_addresses::table
                            .filter(user_addresses::user_id.eq(owner))
                            .filter(user_addresses::is_default.eq(true)),
                    )
                    .set(user_addresses::is_default.eq(false))
                    .execute(conn)
                    .await?;
                }

                diesel::insert_into(user_addresses::table)
                    .values(&new_address)
                    .execute(conn)
                    .await?;

                let addresses = user_addresses::table
                    .filter(user_addresses::user_id.eq(owner))
                    .order((user_addresses::created_at.asc(), user_addresses::id.asc()))
                    .select(Address::as_select())
                    .load(conn)
                    .await?;

                Ok(addresses)
            }
            .scope_boxed()
        })
        .await
    }

    /// Deletes one of the user's addresses.
    ///
    /// # Returns
    /// The number of deleted rows (0 when the user owns no such address)
    pub async fn remove_address(&self, user_id: Uuid, address_id: Uuid) -> Result<usize, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::delete(
            user_addresses::table
                .filter(user_addresses::id.eq(address_id))
                .filter(user_addresses::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(AppError::from)
    }
}
