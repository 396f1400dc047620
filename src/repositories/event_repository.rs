use crate::error::RepositoryError;
use crate::funding::Ledger;
use crate::models::{
    Contribution, ContributionStatus, Event, EventParticipant, Organizer, ParticipationStatus,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

const EVENT_COLUMNS: &str = "id, group_id, title, description, date, beneficiary_id, \
                             target_amount, currency, creator_id, payment_info, \
                             payment_info_set_by, created_at";

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    group_id: Uuid,
    title: String,
    description: Option<String>,
    date: NaiveDate,
    beneficiary_id: Option<Uuid>,
    target_amount: Decimal,
    currency: String,
    creator_id: Uuid,
    payment_info: Option<String>,
    payment_info_set_by: Option<Uuid>,
    created_at: NaiveDateTime,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            group_id: row.group_id,
            title: row.title,
            description: row.description,
            date: row.date,
            beneficiary_id: row.beneficiary_id,
            target_amount: row.target_amount,
            currency: row.currency,
            creator_id: row.creator_id,
            payment_info: row.payment_info,
            organizer: Organizer::from(row.payment_info_set_by),
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ParticipantRow {
    user_id: Uuid,
    status: String,
    paid_amount: Decimal,
    joined_at: NaiveDateTime,
}

impl TryFrom<ParticipantRow> for EventParticipant {
    type Error = RepositoryError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        Ok(EventParticipant {
            user_id: row.user_id,
            status: ParticipationStatus::from_str(&row.status).map_err(RepositoryError::Corrupt)?,
            paid_amount: row.paid_amount,
            joined_at: row.joined_at,
        })
    }
}

#[derive(FromRow)]
struct ContributionRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    amount: Decimal,
    status: String,
    created_at: NaiveDateTime,
}

impl TryFrom<ContributionRow> for Contribution {
    type Error = RepositoryError;

    fn try_from(row: ContributionRow) -> Result<Self, Self::Error> {
        Ok(Contribution {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            amount: row.amount,
            status: ContributionStatus::from_str(&row.status).map_err(RepositoryError::Corrupt)?,
            created_at: row.created_at,
        })
    }
}

/// Repository for events, their participants and contributions
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new EventRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new event row
    pub async fn insert(&self, conn: &mut PgConnection, event: &Event) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO events
                (id, group_id, title, description, date, beneficiary_id, target_amount,
                 currency, creator_id, payment_info, payment_info_set_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(event.id)
        .bind(event.group_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(event.beneficiary_id)
        .bind(event.target_amount)
        .bind(&event.currency)
        .bind(event.creator_id)
        .bind(&event.payment_info)
        .bind(event.organizer.claimant())
        .bind(event.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Find an event by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, RepositoryError> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);

        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Event::from))
    }

    /// All events of a group, by date
    pub async fn find_by_group(&self, group_id: Uuid) -> Result<Vec<Event>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM events WHERE group_id = $1 ORDER BY date ASC",
            EVENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Lock an event row for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Event>, RepositoryError> {
        let sql = format!("SELECT {} FROM events WHERE id = $1 FOR UPDATE", EVENT_COLUMNS);

        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(Event::from))
    }

    /// Write the mutable event fields: target amount, payment info and organizer
    pub async fn update(&self, conn: &mut PgConnection, event: &Event) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE events
            SET target_amount = $2, payment_info = $3, payment_info_set_by = $4
            WHERE id = $1
            "#,
        )
        .bind(event.id)
        .bind(event.target_amount)
        .bind(&event.payment_info)
        .bind(event.organizer.claimant())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Load participants and contributions of an event
    pub async fn load_ledger(&self, conn: &mut PgConnection, event_id: Uuid) -> Result<Ledger, RepositoryError> {
        let participants = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT user_id, status, paid_amount, joined_at
            FROM event_participants
            WHERE event_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(EventParticipant::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let contributions = sqlx::query_as::<_, ContributionRow>(
            r#"
            SELECT id, event_id, user_id, amount, status, created_at
            FROM contributions
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Contribution::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Ledger::new(participants, contributions))
    }

    /// Upsert every participant and contribution of the ledger
    pub async fn save_ledger(
        &self,
        conn: &mut PgConnection,
        event_id: Uuid,
        ledger: &Ledger,
    ) -> Result<(), RepositoryError> {
        for participant in ledger.participants() {
            sqlx::query(
                r#"
                INSERT INTO event_participants (event_id, user_id, status, paid_amount, joined_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (event_id, user_id) DO UPDATE
                SET status = EXCLUDED.status, paid_amount = EXCLUDED.paid_amount
                "#,
            )
            .bind(event_id)
            .bind(participant.user_id)
            .bind(participant.status.as_str())
            .bind(participant.paid_amount)
            .bind(participant.joined_at)
            .execute(&mut *conn)
            .await?;
        }

        for contribution in ledger.contributions() {
            sqlx::query(
                r#"
                INSERT INTO contributions (id, event_id, user_id, amount, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO UPDATE
                SET status = EXCLUDED.status
                "#,
            )
            .bind(contribution.id)
            .bind(contribution.event_id)
            .bind(contribution.user_id)
            .bind(contribution.amount)
            .bind(contribution.status.as_str())
            .bind(contribution.created_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Delete an event (cascades to participants, contributions and its room)
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool, RepositoryError> {
        let rows_affected = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
