//! Account repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use recipe_box_core::{Email, Uid};

use super::RepositoryError;
use crate::models::user::Account;

/// Internal row type for account queries.
#[derive(sqlx::FromRow)]
struct AccountRow {
    uid: String,
    email: String,
    display_name: String,
    created_at: DateTime<Utc>,
}

/// Internal row type for login lookups.
#[derive(sqlx::FromRow)]
struct CredentialRow {
    uid: String,
    email: String,
    display_name: String,
    created_at: DateTime<Utc>,
    password_hash: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            uid: Uid::new(row.uid),
            email,
            display_name: row.display_name,
            created_at: row.created_at,
        })
    }
}

/// Repository for account database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an account by its email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT uid, email, display_name, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    /// Create a new account with a fresh uid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        display_name: &str,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        let uid = Uuid::new_v4().simple().to_string();

        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO users (uid, email, display_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING uid, email, display_name, created_at
            ",
        )
        .bind(&uid)
        .bind(email.as_str())
        .bind(display_name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Account::try_from(row)
    }

    /// Get an account together with its password hash.
    ///
    /// Returns `None` if no account uses this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT uid, email, display_name, created_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let account = Account::try_from(AccountRow {
            uid: r.uid,
            email: r.email,
            display_name: r.display_name,
            created_at: r.created_at,
        })?;

        Ok(Some((account, r.password_hash)))
    }
}
