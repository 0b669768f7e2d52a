//! Data access for the `users` table.
//!
//! Every call builds a fresh, non-persistent statement; nothing is cached
//! between calls.

use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::{SqlitePool, SqliteRow},
};

use crate::{error::Result, models::User};

/// Storage operations on users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns the id assigned by the database.
    /// Any id carried by `user` is ignored.
    async fn create_user(&self, user: &User) -> Result<i64>;

    /// Fails with the driver's row-not-found error when no row matches.
    async fn get_user(&self, id: i64) -> Result<User>;

    /// All rows, in whatever order the database yields them.
    async fn get_all_users(&self) -> Result<Vec<User>>;

    /// Overwrites the names of the row matching `user.id` and returns that
    /// id. Matching zero rows is not an error.
    async fn update_user(&self, user: &User) -> Result<i64>;

    /// Deletes the row matching `id` and returns `id`. Matching zero rows is
    /// not an error.
    async fn delete_user(&self, id: i64) -> Result<i64>;
}

/// [`UserRepository`] backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User) -> Result<i64> {
        let result = sqlx::query("INSERT INTO users(first_name, last_name) VALUES (?, ?)")
            .persistent(false)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_user(&self, id: i64) -> Result<User> {
        let row = sqlx::query("SELECT id, first_name, last_name FROM users WHERE id = ?")
            .persistent(false)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user_from_row(&row)?)
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT id, first_name, last_name FROM users")
            .persistent(false)
            .fetch_all(&self.pool)
            .await?;

        let users = rows
            .iter()
            .map(user_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> Result<i64> {
        sqlx::query("UPDATE users SET first_name = ?, last_name = ? WHERE id = ?")
            .persistent(false)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        Ok(user.id)
    }

    async fn delete_user(&self, id: i64) -> Result<i64> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .persistent(false)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }
}
