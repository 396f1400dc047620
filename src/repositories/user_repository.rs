use crate::models::User;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for user data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    pub async fn create(
        &self,
        name: &str,
        telegram_id: Option<i64>,
        username: Option<&str>,
    ) -> SqlxResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, telegram_id, username)
            VALUES ($1, $2, $3)
            RETURNING id, telegram_id, name, username, created_at
            "#,
        )
        .bind(name)
        .bind(telegram_id)
        .bind(username)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a user by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, telegram_id, name, username, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find several users at once, in no particular order
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> SqlxResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, telegram_id, name, username, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
    }
}
