use crate::error::RepositoryError;
use crate::exchange::Assignments;
use crate::models::{GiftExchangeRoom, RoomParticipant, RoomStatus, Wish};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

const ROOM_COLUMNS: &str = "r.id, r.group_id, r.event_id, r.title, r.budget, r.deadline, \
                            r.admin_id, r.status, r.assignments, r.created_at";

#[derive(FromRow)]
struct RoomRow {
    id: Uuid,
    group_id: Uuid,
    event_id: Option<Uuid>,
    title: String,
    budget: Option<String>,
    deadline: Option<NaiveDate>,
    admin_id: Uuid,
    status: String,
    assignments: Option<serde_json::Value>,
    created_at: NaiveDateTime,
}

impl RoomRow {
    fn into_room(self, participants: Vec<RoomParticipant>) -> Result<GiftExchangeRoom, RepositoryError> {
        let status = RoomStatus::from_str(&self.status).map_err(RepositoryError::Corrupt)?;
        let assignments = self
            .assignments
            .map(serde_json::from_value::<Assignments>)
            .transpose()
            .map_err(|e| RepositoryError::Corrupt(format!("room {} assignments: {}", self.id, e)))?;

        Ok(GiftExchangeRoom {
            id: self.id,
            group_id: self.group_id,
            event_id: self.event_id,
            title: self.title,
            budget: self.budget,
            deadline: self.deadline,
            admin_id: self.admin_id,
            status,
            participants,
            assignments,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ParticipantRow {
    room_id: Uuid,
    user_id: Uuid,
    wish_text: Option<String>,
    wishlist_item_id: Option<Uuid>,
    joined_at: NaiveDateTime,
}

#[derive(FromRow)]
struct DrawnRoomRow {
    #[sqlx(flatten)]
    room: RoomRow,
    event_date: Option<NaiveDate>,
}

/// Repository for gift-exchange rooms and their participants
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    /// Create a new RoomRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a room with its initial participants.
    ///
    /// A second active room in the same scope fails with `Duplicate`.
    pub async fn insert(&self, conn: &mut PgConnection, room: &GiftExchangeRoom) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO gift_rooms
                (id, group_id, event_id, title, budget, deadline, admin_id, status, assignments, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(room.id)
        .bind(room.group_id)
        .bind(room.event_id)
        .bind(&room.title)
        .bind(&room.budget)
        .bind(room.deadline)
        .bind(room.admin_id)
        .bind(room.status.as_str())
        .bind(room.assignments.as_ref().map(Json))
        .bind(room.created_at)
        .execute(&mut *conn)
        .await?;

        for participant in &room.participants {
            self.upsert_participant(conn, room.id, participant).await?;
        }

        Ok(())
    }

    /// Find a room by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GiftExchangeRoom>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("SELECT {} FROM gift_rooms r WHERE r.id = $1", ROOM_COLUMNS);

        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(self.with_participants(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Secret Santa rooms of a group, newest first
    pub async fn find_santa_by_group(&self, group_id: Uuid) -> Result<Vec<GiftExchangeRoom>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!(
            "SELECT {} FROM gift_rooms r WHERE r.group_id = $1 AND r.event_id IS NULL ORDER BY r.created_at DESC",
            ROOM_COLUMNS
        );

        let rows = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(group_id)
            .fetch_all(&mut *conn)
            .await?;

        self.with_participants(&mut conn, rows).await
    }

    /// The event's Angel Guardian room; the active one if there is one, else the latest
    pub async fn find_by_event(&self, event_id: Uuid) -> Result<Option<GiftExchangeRoom>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!(
            "SELECT {} FROM gift_rooms r WHERE r.event_id = $1 \
             ORDER BY (r.status <> 'COMPLETED') DESC, r.created_at DESC LIMIT 1",
            ROOM_COLUMNS
        );

        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(event_id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(self.with_participants(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Active rooms in a group or event scope
    pub async fn find_active_in_scope(
        &self,
        conn: &mut PgConnection,
        group_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<Vec<GiftExchangeRoom>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM gift_rooms r \
             WHERE r.status <> 'COMPLETED' \
               AND ((r.event_id IS NULL AND $2::uuid IS NULL AND r.group_id = $1) OR r.event_id = $2)",
            ROOM_COLUMNS
        );

        let rows = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(group_id)
            .bind(event_id)
            .fetch_all(&mut *conn)
            .await?;

        self.with_participants(conn, rows).await
    }

    /// Lock a room row for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<GiftExchangeRoom>, RepositoryError> {
        let sql = format!("SELECT {} FROM gift_rooms r WHERE r.id = $1 FOR UPDATE", ROOM_COLUMNS);

        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(self.with_participants(conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Lock the room of an event: the active one, else the latest completed
    pub async fn lock_by_event(
        &self,
        conn: &mut PgConnection,
        event_id: Uuid,
    ) -> Result<Option<GiftExchangeRoom>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM gift_rooms r WHERE r.event_id = $1 \
             ORDER BY (r.status <> 'COMPLETED') DESC, r.created_at DESC \
             LIMIT 1 FOR UPDATE",
            ROOM_COLUMNS
        );

        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(event_id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(self.with_participants(conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Drawn rooms with the date of their event, if any
    pub async fn find_drawn(&self) -> Result<Vec<(GiftExchangeRoom, Option<NaiveDate>)>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!(
            "SELECT {}, e.date AS event_date FROM gift_rooms r \
             LEFT JOIN events e ON e.id = r.event_id \
             WHERE r.status = 'DRAWN'",
            ROOM_COLUMNS
        );

        let rows = sqlx::query_as::<_, DrawnRoomRow>(&sql)
            .fetch_all(&mut *conn)
            .await?;

        let event_dates: HashMap<Uuid, Option<NaiveDate>> =
            rows.iter().map(|r| (r.room.id, r.event_date)).collect();
        let rooms = self
            .with_participants(&mut conn, rows.into_iter().map(|r| r.room).collect())
            .await?;

        Ok(rooms
            .into_iter()
            .map(|room| {
                let event_date = event_dates.get(&room.id).copied().flatten();
                (room, event_date)
            })
            .collect())
    }

    /// Insert a participant or replace their wish
    pub async fn upsert_participant(
        &self,
        conn: &mut PgConnection,
        room_id: Uuid,
        participant: &RoomParticipant,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO room_participants (room_id, user_id, wish_text, wishlist_item_id, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (room_id, user_id) DO UPDATE
            SET wish_text = EXCLUDED.wish_text, wishlist_item_id = EXCLUDED.wishlist_item_id
            "#,
        )
        .bind(room_id)
        .bind(participant.user_id)
        .bind(&participant.wish.text)
        .bind(participant.wish.wishlist_item_id)
        .bind(participant.joined_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Write status and assignments
    pub async fn update_status(&self, conn: &mut PgConnection, room: &GiftExchangeRoom) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE gift_rooms
            SET status = $2, assignments = $3
            WHERE id = $1
            "#,
        )
        .bind(room.id)
        .bind(room.status.as_str())
        .bind(room.assignments.as_ref().map(Json))
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    async fn with_participants(
        &self,
        conn: &mut PgConnection,
        rows: Vec<RoomRow>,
    ) -> Result<Vec<GiftExchangeRoom>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let participant_rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT room_id, user_id, wish_text, wishlist_item_id, joined_at
            FROM room_participants
            WHERE room_id = ANY($1)
            ORDER BY joined_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_room: HashMap<Uuid, Vec<RoomParticipant>> = HashMap::new();
        for row in participant_rows {
            by_room.entry(row.room_id).or_default().push(RoomParticipant {
                user_id: row.user_id,
                wish: Wish {
                    text: row.wish_text,
                    wishlist_item_id: row.wishlist_item_id,
                },
                joined_at: row.joined_at,
            });
        }

        rows.into_iter()
            .map(|row| {
                let participants = by_room.remove(&row.id).unwrap_or_default();
                row.into_room(participants)
            })
            .collect()
    }
}
