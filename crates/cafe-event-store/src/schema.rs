//! Event store database schema.

/// SQL to create the events table.
///
/// The `UNIQUE (stream_id, sequence_number)` constraint is what makes the
/// optimistic-concurrency check race-free: two writers that both pass the
/// version pre-check cannot both insert the same sequence number.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS cafe_events (
    event_id        UUID PRIMARY KEY,
    stream_id       UUID NOT NULL,
    event_type      VARCHAR(255) NOT NULL,
    payload         JSONB NOT NULL,
    sequence_number BIGINT NOT NULL,
    correlation_id  UUID NOT NULL,
    causation_id    UUID NOT NULL,
    occurred_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (stream_id, sequence_number)
);

CREATE INDEX IF NOT EXISTS idx_cafe_events_stream_id
    ON cafe_events (stream_id, sequence_number);

CREATE INDEX IF NOT EXISTS idx_cafe_events_correlation_id
    ON cafe_events (correlation_id);
";
