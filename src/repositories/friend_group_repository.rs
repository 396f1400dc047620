use crate::models::FriendGroup;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for friend group data access
pub struct FriendGroupRepository {
    pool: PgPool,
}

impl FriendGroupRepository {
    /// Create a new FriendGroupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new friend group hosted by `creator_id`
    pub async fn create(&self, title: &str, creator_id: Uuid) -> SqlxResult<FriendGroup> {
        sqlx::query_as::<_, FriendGroup>(
            r#"
            INSERT INTO friend_groups (title, creator_id)
            VALUES ($1, $2)
            RETURNING id, title, creator_id, created_at
            "#,
        )
        .bind(title)
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a friend group by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<FriendGroup>> {
        sqlx::query_as::<_, FriendGroup>(
            r#"
            SELECT id, title, creator_id, created_at
            FROM friend_groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
