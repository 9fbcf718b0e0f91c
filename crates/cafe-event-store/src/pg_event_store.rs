//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use cafe_core::error::DomainError;
use cafe_core::repository::{EventRepository, StoredEvent};

/// PostgreSQL-backed event store.
///
/// Appends run in a transaction: the stream's current version is read,
/// compared against the expected version, and the batch inserted. A racer
/// that slips between the check and the insert trips the
/// `UNIQUE (stream_id, sequence_number)` constraint, which is reported as
/// the same `ConcurrencyConflict`.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Creates a new `PgEventStore` on an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the events table and indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::raw_sql(crate::schema::CREATE_EVENTS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    async fn current_version(&self, stream_id: Uuid) -> Result<i64, DomainError> {
        let row =
            sqlx::query("SELECT COALESCE(MAX(sequence_number), 0) FROM cafe_events WHERE stream_id = $1")
                .bind(stream_id)
                .fetch_one(&self.pool)
                .await
                .map_err(infrastructure)?;
        row.try_get::<i64, _>(0).map_err(infrastructure)
    }
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("event store database error: {err}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(sqlx::error::DatabaseError::code)
        .is_some_and(|code| code == "23505")
}

fn row_to_stored_event(row: &PgRow) -> Result<StoredEvent, sqlx::Error> {
    Ok(StoredEvent {
        event_id: row.try_get("event_id")?,
        stream_id: row.try_get("stream_id")?,
        event_type: row.try_get("event_type")?,
        payload: row.try_get("payload")?,
        sequence_number: row.try_get("sequence_number")?,
        correlation_id: row.try_get("correlation_id")?,
        causation_id: row.try_get("causation_id")?,
        occurred_at: row.try_get("occurred_at")?,
    })
}

#[async_trait]
impl EventRepository for PgEventStore {
    async fn load_events(&self, stream_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let rows = sqlx::query(
            "SELECT event_id, stream_id, event_type, payload, sequence_number, \
                    correlation_id, causation_id, occurred_at \
             FROM cafe_events \
             WHERE stream_id = $1 \
             ORDER BY sequence_number",
        )
        .bind(stream_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        rows.iter()
            .map(|row| row_to_stored_event(row).map_err(infrastructure))
            .collect()
    }

    async fn append_events(
        &self,
        stream_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        let row =
            sqlx::query("SELECT COALESCE(MAX(sequence_number), 0) FROM cafe_events WHERE stream_id = $1")
                .bind(stream_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(infrastructure)?;
        let actual: i64 = row.try_get(0).map_err(infrastructure)?;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                stream_id,
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            let insert = sqlx::query(
                "INSERT INTO cafe_events \
                     (event_id, stream_id, event_type, payload, sequence_number, \
                      correlation_id, causation_id, occurred_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(event.event_id)
            .bind(event.stream_id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.sequence_number)
            .bind(event.correlation_id)
            .bind(event.causation_id)
            .bind(event.occurred_at)
            .execute(&mut *tx)
            .await;

            if let Err(err) = insert {
                if is_unique_violation(&err) {
                    // A racer committed between our version check and this
                    // insert. Roll back and report the fresh version.
                    drop(tx);
                    let actual = self.current_version(stream_id).await?;
                    return Err(DomainError::ConcurrencyConflict {
                        stream_id,
                        expected: expected_version,
                        actual,
                    });
                }
                return Err(infrastructure(err));
            }
        }

        tx.commit().await.map_err(infrastructure)
    }
}
