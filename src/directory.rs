use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::Role;

/// DirectoryError
///
/// Failure to consult the user directory. The gate folds any directory
/// error into a fail-closed redirect to login; nothing is retried.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("role query failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// RoleDirectory
///
/// Abstract contract for the external user directory. Queried once per
/// protected request with the username derived from the session identity.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn
/// RoleDirectory>`) shareable across request tasks.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Resolve the role stored for `username` by exact key match.
    /// `Ok(None)` means the directory has no row for that key.
    async fn get_role(&self, username: &str) -> Result<Option<Role>, DirectoryError>;
}

/// DirectoryState
///
/// The concrete type used to share directory access across the application
/// state.
pub type DirectoryState = Arc<dyn RoleDirectory>;

/// PostgresDirectory
///
/// The concrete directory implementation, backed by the `users` table in
/// PostgreSQL.
pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    /// Creates a new directory instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleDirectory for PostgresDirectory {
    /// get_role
    ///
    /// Single-row lookup against `users.username`. The query is bound at
    /// runtime; a missing row is a policy outcome, not an error.
    async fn get_role(&self, username: &str) -> Result<Option<Role>, DirectoryError> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(role.map(Role::from))
    }
}
