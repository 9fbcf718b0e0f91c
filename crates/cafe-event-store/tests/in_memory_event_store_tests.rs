//! Integration tests for `InMemoryEventStore`.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use cafe_core::error::DomainError;
use cafe_core::repository::{EventRepository, StoredEvent};
use cafe_event_store::InMemoryEventStore;

/// Helper to build a `StoredEvent` with sensible defaults.
fn make_stored_event(stream_id: Uuid, sequence_number: i64) -> StoredEvent {
    StoredEvent {
        event_id: Uuid::new_v4(),
        stream_id,
        event_type: "TestEvent".to_string(),
        payload: serde_json::json!({"key": "value"}),
        sequence_number,
        correlation_id: Uuid::new_v4(),
        causation_id: Uuid::new_v4(),
        occurred_at: Utc::now(),
    }
}

// --- load_events ---

#[tokio::test]
async fn test_load_events_returns_empty_vec_for_nonexistent_stream() {
    let store = InMemoryEventStore::new();
    let stream_id = Uuid::new_v4();

    let events = store.load_events(stream_id).await.unwrap();

    assert!(events.is_empty());
}

// --- append_events + load_events round-trip ---

#[tokio::test]
async fn test_append_and_load_single_event() {
    let store = InMemoryEventStore::new();
    let stream_id = Uuid::new_v4();
    let event = make_stored_event(stream_id, 1);
    let expected_event_id = event.event_id;
    let expected_payload = event.payload.clone();

    store.append_events(stream_id, 0, &[event]).await.unwrap();

    let loaded = store.load_events(stream_id).await.unwrap();
    assert_eq!(loaded.len(), 1);

    let e = &loaded[0];
    assert_eq!(e.event_id, expected_event_id);
    assert_eq!(e.stream_id, stream_id);
    assert_eq!(e.event_type, "TestEvent");
    assert_eq!(e.payload, expected_payload);
    assert_eq!(e.sequence_number, 1);
}

// --- ordering ---

#[tokio::test]
async fn test_append_multiple_events_preserves_sequence_order() {
    let store = InMemoryEventStore::new();
    let stream_id = Uuid::new_v4();
    let events = vec![
        make_stored_event(stream_id, 1),
        make_stored_event(stream_id, 2),
        make_stored_event(stream_id, 3),
    ];

    store.append_events(stream_id, 0, &events).await.unwrap();

    let loaded = store.load_events(stream_id).await.unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].sequence_number, 1);
    assert_eq!(loaded[1].sequence_number, 2);
    assert_eq!(loaded[2].sequence_number, 3);
}

// --- stream isolation ---

#[tokio::test]
async fn test_stream_isolation() {
    let store = InMemoryEventStore::new();
    let stream_a = Uuid::new_v4();
    let stream_b = Uuid::new_v4();

    store
        .append_events(stream_a, 0, &[make_stored_event(stream_a, 1)])
        .await
        .unwrap();
    store
        .append_events(stream_b, 0, &[make_stored_event(stream_b, 1)])
        .await
        .unwrap();

    let loaded_a = store.load_events(stream_a).await.unwrap();
    let loaded_b = store.load_events(stream_b).await.unwrap();

    assert_eq!(loaded_a.len(), 1);
    assert_eq!(loaded_b.len(), 1);
    assert_eq!(loaded_a[0].stream_id, stream_a);
    assert_eq!(loaded_b[0].stream_id, stream_b);
}

// --- concurrency ---

#[tokio::test]
async fn test_duplicate_stream_creation_conflicts() {
    let store = InMemoryEventStore::new();
    let stream_id = Uuid::new_v4();

    // First append at version 0 creates the stream.
    store
        .append_events(stream_id, 0, &[make_stored_event(stream_id, 1)])
        .await
        .unwrap();

    // A second writer that also believes the stream is new must conflict.
    let result = store
        .append_events(stream_id, 0, &[make_stored_event(stream_id, 1)])
        .await;

    match result {
        Err(DomainError::ConcurrencyConflict {
            stream_id: conflict_stream,
            expected,
            actual,
        }) => {
            assert_eq!(conflict_stream, stream_id);
            assert_eq!(expected, 0);
            assert_eq!(actual, 1);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stale_expected_version_is_rejected() {
    let store = InMemoryEventStore::new();
    let stream_id = Uuid::new_v4();

    store
        .append_events(
            stream_id,
            0,
            &[
                make_stored_event(stream_id, 1),
                make_stored_event(stream_id, 2),
            ],
        )
        .await
        .unwrap();

    // Sequence numbers 3-4 would not collide, but the stale expected
    // version must still reject the batch.
    let result = store
        .append_events(
            stream_id,
            0,
            &[
                make_stored_event(stream_id, 3),
                make_stored_event(stream_id, 4),
            ],
        )
        .await;

    match result {
        Err(DomainError::ConcurrencyConflict {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 0);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }

    // The losing batch must not have left a partial write behind.
    let loaded = store.load_events(stream_id).await.unwrap();
    assert_eq!(loaded.len(), 2);
}

#[tokio::test]
async fn test_sequential_appends_with_correct_expected_version() {
    let store = InMemoryEventStore::new();
    let stream_id = Uuid::new_v4();

    store
        .append_events(
            stream_id,
            0,
            &[
                make_stored_event(stream_id, 1),
                make_stored_event(stream_id, 2),
            ],
        )
        .await
        .unwrap();

    store
        .append_events(
            stream_id,
            2,
            &[
                make_stored_event(stream_id, 3),
                make_stored_event(stream_id, 4),
            ],
        )
        .await
        .unwrap();

    let loaded = store.load_events(stream_id).await.unwrap();
    assert_eq!(loaded.len(), 4);
    for (i, event) in loaded.iter().enumerate() {
        assert_eq!(event.sequence_number, i64::try_from(i + 1).unwrap());
    }
}

#[tokio::test]
async fn test_racing_writers_exactly_one_wins() {
    let store = Arc::new(InMemoryEventStore::new());
    let stream_id = Uuid::new_v4();

    // Both writers observed version 0 and decided independently.
    let mut handles = Vec::new();
    for _ in 0..2 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .append_events(stream_id, 0, &[make_stored_event(stream_id, 1)])
                .await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => wins += 1,
            Err(DomainError::ConcurrencyConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(store.load_events(stream_id).await.unwrap().len(), 1);
}

// --- edge cases ---

#[tokio::test]
async fn test_append_empty_batch_is_noop() {
    let store = InMemoryEventStore::new();
    let stream_id = Uuid::new_v4();

    store.append_events(stream_id, 0, &[]).await.unwrap();

    let loaded = store.load_events(stream_id).await.unwrap();
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn test_non_contiguous_batch_is_rejected() {
    let store = InMemoryEventStore::new();
    let stream_id = Uuid::new_v4();

    // Sequence 2 against an empty stream leaves a gap.
    let result = store
        .append_events(stream_id, 0, &[make_stored_event(stream_id, 2)])
        .await;

    match result {
        Err(DomainError::Infrastructure(msg)) => {
            assert!(msg.contains("non-contiguous"), "unexpected message: {msg}");
        }
        other => panic!("expected Infrastructure, got {other:?}"),
    }
    assert!(store.load_events(stream_id).await.unwrap().is_empty());
}
