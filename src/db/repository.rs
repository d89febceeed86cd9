//! User repository for LMS.
//!
//! This module provides CRUD operations for users in the database.

use async_trait::async_trait;
use sqlx::{QueryBuilder, SqlitePool};

use super::traits::UserStore;
use super::user::{NewUser, User, UserUpdate};
use crate::{LmsError, Result};

const USER_COLUMNS: &str = "id, email, password_hash, is_active, is_admin, created_at";

/// SQLite-backed user store.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new UserRepository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, is_active, is_admin, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.is_active)
        .bind(new_user.is_admin)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                LmsError::Conflict("email already registered".to_string())
            }
            e => LmsError::Database(e.to_string()),
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| LmsError::NotFound("user".to_string()))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(user)
    }

    async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref password_hash) = update.password_hash {
            separated.push("password_hash = ");
            separated.push_bind_unseparated(password_hash.clone());
        }
        if let Some(is_active) = update.is_active {
            separated.push("is_active = ");
            separated.push_bind_unseparated(is_active);
        }
        if let Some(is_admin) = update.is_admin {
            separated.push("is_admin = ");
            separated.push_bind_unseparated(is_admin);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| LmsError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup() -> UserRepository {
        let db = Database::open_in_memory().await.unwrap();
        UserRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_create_user() {
        let repo = setup().await;

        let user = repo.create(&NewUser::new("a@x.com", "hash")).await.unwrap();

        assert!(user.id > 0);
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.password_hash, "hash");
        assert!(!user.is_active);
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_duplicate_email_case_insensitive() {
        let repo = setup().await;
        repo.create(&NewUser::new("a@x.com", "hash")).await.unwrap();

        let result = repo.create(&NewUser::new("A@X.com", "hash")).await;
        assert!(matches!(result, Err(LmsError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_by_email_case_insensitive() {
        let repo = setup().await;
        let created = repo.create(&NewUser::new("a@x.com", "hash")).await.unwrap();

        let found = repo.get_by_email("A@X.COM").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(repo.get_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let repo = setup().await;
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user() {
        let repo = setup().await;
        let user = repo.create(&NewUser::new("a@x.com", "hash")).await.unwrap();

        let updated = repo
            .update(user.id, &UserUpdate::new().is_active(true).password_hash("h2"))
            .await
            .unwrap()
            .unwrap();

        assert!(updated.is_active);
        assert_eq!(updated.password_hash, "h2");
        assert!(!updated.is_admin);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = setup().await;
        let result = repo
            .update(42, &UserUpdate::new().is_admin(true))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_update_returns_current() {
        let repo = setup().await;
        let user = repo.create(&NewUser::new("a@x.com", "hash")).await.unwrap();

        let same = repo.update(user.id, &UserUpdate::new()).await.unwrap().unwrap();
        assert_eq!(same.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_list_users() {
        let repo = setup().await;
        repo.create(&NewUser::new("a@x.com", "h")).await.unwrap();
        repo.create(&NewUser::new("b@x.com", "h").active().admin())
            .await
            .unwrap();

        let users = repo.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "a@x.com");
        assert!(users[1].is_admin);
    }
}
