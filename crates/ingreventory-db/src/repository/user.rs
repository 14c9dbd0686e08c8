//! # User Repository
//!
//! Accounts. Password hashes and reset codes never leave this module inside
//! a [`User`]; they are only handed out through [`UserCredentials`].

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use ingreventory_core::{User, UserRole};

const USER_COLUMNS: &str = r#"
    id, email, first_name, last_name, role, store_id, phone, address,
    city, state, zip_code, is_active, last_login, created_at
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    role: UserRole,
    store_id: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            store_id: row.store_id,
            phone: row.phone,
            address: row.address,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    id: String,
    password_hash: String,
    reset_code: Option<String>,
    reset_code_expires_at: Option<DateTime<Utc>>,
}

/// Secret material of a user, used by login and password reset.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
    pub reset_code: Option<String>,
    pub reset_code_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    /// Lists users, optionally restricted to one store.
    pub async fn list(&self, store_id: Option<&str>) -> DbResult<Vec<User>> {
        let rows = match store_id {
            Some(store_id) => {
                let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE store_id = ?1 ORDER BY created_at DESC");
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(store_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
                sqlx::query_as::<_, UserRow>(&sql).fetch_all(&self.pool).await?
            }
        };
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Inserts a user with an already-hashed password.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the email is registered.
    pub async fn insert(&self, user: &User, password_hash: &str) -> DbResult<User> {
        debug!(id = %user.id, role = %user.role.as_str(), "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name, role, store_id,
                phone, address, city, state, zip_code, is_active, last_login, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(&user.store_id)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(&user.city)
        .bind(&user.state)
        .bind(&user.zip_code)
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &user.email),
            other => other,
        })?;

        Ok(user.clone())
    }

    /// Writes profile fields (names, role, contact details, active flag).
    pub async fn update_profile(&self, user: &User) -> DbResult<User> {
        debug!(id = %user.id, "Updating user profile");

        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = ?2, first_name = ?3, last_name = ?4, role = ?5,
                phone = ?6, address = ?7, city = ?8, state = ?9, zip_code = ?10,
                is_active = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(&user.city)
        .bind(&user.state)
        .bind(&user.zip_code)
        .bind(user.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &user.email),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", &user.id));
        }

        Ok(user.clone())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }
        Ok(())
    }

    /// Loads a user together with the password hash and reset state.
    pub async fn credentials_by_email(&self, email: &str) -> DbResult<Option<UserCredentials>> {
        let secret = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, password_hash, reset_code, reset_code_expires_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(secret) = secret else {
            return Ok(None);
        };

        let user = self
            .get_by_id(&secret.id)
            .await?
            .ok_or_else(|| DbError::not_found("User", &secret.id))?;

        Ok(Some(UserCredentials {
            user,
            password_hash: secret.password_hash,
            reset_code: secret.reset_code,
            reset_code_expires_at: secret.reset_code_expires_at,
        }))
    }

    pub async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_login = ?2 WHERE id = ?1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Stores a password-reset code, replacing any previous one.
    pub async fn set_reset_code(&self, id: &str, code: &str, expires_at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Storing password reset code");

        let result = sqlx::query("UPDATE users SET reset_code = ?2, reset_code_expires_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(code)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }
        Ok(())
    }

    /// Replaces the password hash and clears any reset code.
    pub async fn set_password(&self, id: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?2, reset_code = NULL, reset_code_expires_at = NULL WHERE id = ?1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_db, sample_store, sample_user};
    use chrono::Duration;

    #[tokio::test]
    async fn test_insert_and_credentials() {
        let db = memory_db().await;
        let store = db.stores().insert(&sample_store("Roti Bakar")).await.unwrap();
        let user = sample_user("owner@roti.test", UserRole::Admin, Some(&store.id));
        db.users().insert(&user, "hash-1").await.unwrap();

        let creds = db.users().credentials_by_email("owner@roti.test").await.unwrap().unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "hash-1");
        assert!(creds.reset_code.is_none());

        assert_eq!(db.users().list(Some(&store.id)).await.unwrap().len(), 1);
        assert!(db.users().list(Some("other")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = memory_db().await;
        db.users()
            .insert(&sample_user("dup@test.io", UserRole::User, None), "h")
            .await
            .unwrap();
        let err = db
            .users()
            .insert(&sample_user("dup@test.io", UserRole::User, None), "h")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_reset_code_lifecycle() {
        let db = memory_db().await;
        let user = sample_user("reset@test.io", UserRole::Cashier, None);
        db.users().insert(&user, "old").await.unwrap();

        let expires = Utc::now() + Duration::minutes(15);
        db.users().set_reset_code(&user.id, "123456", expires).await.unwrap();
        let creds = db.users().credentials_by_email("reset@test.io").await.unwrap().unwrap();
        assert_eq!(creds.reset_code.as_deref(), Some("123456"));
        assert!(creds.reset_code_expires_at.is_some());

        db.users().set_password(&user.id, "new").await.unwrap();
        let creds = db.users().credentials_by_email("reset@test.io").await.unwrap().unwrap();
        assert_eq!(creds.password_hash, "new");
        assert!(creds.reset_code.is_none());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = memory_db().await;
        let user = sample_user("gone@test.io", UserRole::User, None);
        db.users().insert(&user, "h").await.unwrap();
        db.users().delete(&user.id).await.unwrap();
        assert!(db.users().get_by_id(&user.id).await.unwrap().is_none());
        assert!(db.users().delete(&user.id).await.unwrap_err().is_not_found());
    }
}
