use crate::error::RepositoryError;
use crate::models::{Booking, BookingMode, WishlistItem};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

const ITEM_COLUMNS: &str = "id, owner_id, title, description, price, url, image_url, \
                            booked_by, booked_for_event_id, booking_mode, created_at";

#[derive(FromRow)]
struct WishlistItemRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: Option<String>,
    price: Option<Decimal>,
    url: Option<String>,
    image_url: Option<String>,
    booked_by: Option<Uuid>,
    booked_for_event_id: Option<Uuid>,
    booking_mode: Option<String>,
    created_at: NaiveDateTime,
}

impl TryFrom<WishlistItemRow> for WishlistItem {
    type Error = RepositoryError;

    fn try_from(row: WishlistItemRow) -> Result<Self, Self::Error> {
        let booking = match (row.booked_by, row.booked_for_event_id, row.booking_mode) {
            (Some(booked_by), Some(event_id), Some(mode)) => Some(Booking {
                booked_by,
                event_id,
                mode: BookingMode::from_str(&mode).map_err(RepositoryError::Corrupt)?,
            }),
            (None, None, None) => None,
            _ => {
                return Err(RepositoryError::Corrupt(format!(
                    "wishlist item {} has a partial booking",
                    row.id
                )))
            }
        };

        Ok(WishlistItem {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            price: row.price,
            url: row.url,
            image_url: row.image_url,
            booking,
            created_at: row.created_at,
        })
    }
}

fn into_items(rows: Vec<WishlistItemRow>) -> Result<Vec<WishlistItem>, RepositoryError> {
    rows.into_iter().map(WishlistItem::try_from).collect()
}

/// Repository for wishlist items and their bookings
pub struct WishlistRepository {
    pool: PgPool,
}

impl WishlistRepository {
    /// Create a new WishlistRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an item by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<WishlistItem>, RepositoryError> {
        let sql = format!("SELECT {} FROM wishlist_items WHERE id = $1", ITEM_COLUMNS);

        sqlx::query_as::<_, WishlistItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(WishlistItem::try_from)
            .transpose()
    }

    /// A user's wishlist, oldest first
    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<WishlistItem>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM wishlist_items WHERE owner_id = $1 ORDER BY created_at ASC",
            ITEM_COLUMNS
        );

        let rows = sqlx::query_as::<_, WishlistItemRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        into_items(rows)
    }

    /// Items currently booked for an event
    pub async fn find_booked_for_event(
        &self,
        conn: &mut PgConnection,
        event_id: Uuid,
    ) -> Result<Vec<WishlistItem>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM wishlist_items WHERE booked_for_event_id = $1 ORDER BY created_at ASC",
            ITEM_COLUMNS
        );

        let rows = sqlx::query_as::<_, WishlistItemRow>(&sql)
            .bind(event_id)
            .fetch_all(&mut *conn)
            .await?;

        into_items(rows)
    }

    /// Lock an item row for the rest of the transaction
    pub async fn lock(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<WishlistItem>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM wishlist_items WHERE id = $1 FOR UPDATE",
            ITEM_COLUMNS
        );

        sqlx::query_as::<_, WishlistItemRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .map(WishlistItem::try_from)
            .transpose()
    }

    /// Insert a complete item, booking included
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        item: &WishlistItem,
    ) -> Result<(), RepositoryError> {
        let booking = item.booking;

        sqlx::query(
            r#"
            INSERT INTO wishlist_items
                (id, owner_id, title, description, price, url, image_url,
                 booked_by, booked_for_event_id, booking_mode, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(item.id)
        .bind(item.owner_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.url)
        .bind(&item.image_url)
        .bind(booking.map(|b| b.booked_by))
        .bind(booking.map(|b| b.event_id))
        .bind(booking.map(|b| b.mode.as_str()))
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Write the item's booking fields
    pub async fn save_booking(
        &self,
        conn: &mut PgConnection,
        item: &WishlistItem,
    ) -> Result<(), RepositoryError> {
        let booking = item.booking;

        let rows_affected = sqlx::query(
            r#"
            UPDATE wishlist_items
            SET booked_by = $2, booked_for_event_id = $3, booking_mode = $4
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(booking.map(|b| b.booked_by))
        .bind(booking.map(|b| b.event_id))
        .bind(booking.map(|b| b.mode.as_str()))
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Wishlist item {} not found",
                item.id
            )));
        }
        Ok(())
    }

    /// Release every booking held for an event
    pub async fn unbook_all_for_event(
        &self,
        conn: &mut PgConnection,
        event_id: Uuid,
    ) -> Result<u64, RepositoryError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE wishlist_items
            SET booked_by = NULL, booked_for_event_id = NULL, booking_mode = NULL
            WHERE booked_for_event_id = $1
            "#,
        )
        .bind(event_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }

    /// Delete an item; false if it did not exist
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool, RepositoryError> {
        let rows_affected = sqlx::query("DELETE FROM wishlist_items WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
