//! Load/save behaviour of the itinerary store against real files.
//!
//! Each test works in its own temporary directory.

use std::fs;

use tempfile::TempDir;

use itinerary_core::{Day, Itinerary, ItineraryError, ItineraryStore, Stop, Weather};

fn temp_store() -> (TempDir, ItineraryStore) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let store = ItineraryStore::new(tmp.path().join("db.json"));
    (tmp, store)
}

fn sample_trip() -> Itinerary {
    let mut doc = Itinerary::builtin_default();
    doc.trip_meta.title = "Sample Trip".to_string();
    doc.trip_meta.days_count = 2;

    let mut arrival = Day::new(1, "2026-04-15", "Arrival", "JPY");
    arrival.add_stop(Stop::new("14:35", "Airport", 0, "JPY").with_description("Landing"));
    arrival.add_stop(Stop::new("16:30", "Hotel", 660, "JPY").with_transport("Train"));
    arrival.accommodation = "Hotel".to_string();
    arrival.accommodation_cost = 15_000;

    let mut sightseeing = Day::new(2, "2026-04-16", "Sightseeing", "JPY");
    sightseeing.weather = Some(Weather {
        icon: "sunny".to_string(),
        temp: "18°C".to_string(),
        desc: "晴".to_string(),
    });
    sightseeing.checklist = vec!["passport".to_string(), "JR pass".to_string()];
    sightseeing.add_stop(Stop::new("09:00", "松島", 1500, "JPY"));

    doc.days = vec![arrival, sightseeing];
    doc
}

#[test]
fn save_then_load_roundtrips() {
    let (_tmp, store) = temp_store();
    let doc = sample_trip();

    store.save(&doc).expect("save should succeed");
    assert_eq!(store.load(), doc);
}

#[test]
fn stop_order_survives_a_save_cycle() {
    let (_tmp, store) = temp_store();
    let mut doc = sample_trip();
    // Out of chronological order on purpose: stored order is what counts.
    doc.days[0].stops.reverse();

    store.save(&doc).unwrap();
    let loaded = store.load();

    let names: Vec<_> = loaded.days[0].stops.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Hotel", "Airport"]);
}

#[test]
fn load_without_file_bootstraps_default() {
    let (_tmp, store) = temp_store();
    assert!(!store.exists());

    let doc = store.load();

    assert_eq!(doc, Itinerary::builtin_default());
    assert!(store.exists(), "default should be written to disk");
    assert_eq!(store.read().unwrap(), Itinerary::builtin_default());
}

#[test]
fn bootstrapped_file_is_indented_utf8() {
    let (_tmp, store) = temp_store();
    store.load();

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("東北櫻花"));
    assert!(raw.contains("\n  \"days\": ["));
}

#[cfg(unix)]
#[test]
fn load_with_unwritable_location_still_returns_default() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    fs::write(&blocker, "plain file").unwrap();

    // The parent "directory" is a file, so the default cannot be persisted.
    let store = ItineraryStore::new(blocker.join("db.json"));
    let doc = store.load();

    assert_eq!(doc, Itinerary::builtin_default());
    assert!(!store.exists());
}

#[test]
fn load_of_truncated_file_returns_default_and_keeps_file() {
    let (_tmp, store) = temp_store();
    let garbage = r#"{"trip_meta": {"title": "Half"#;
    fs::write(store.path(), garbage).unwrap();

    let doc = store.load();

    assert_eq!(doc, Itinerary::builtin_default());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), garbage);
}

#[test]
fn load_of_non_document_json_returns_default() {
    let (_tmp, store) = temp_store();
    fs::write(store.path(), "[1, 2, 3]").unwrap();

    assert_eq!(store.load(), Itinerary::builtin_default());
    assert!(matches!(
        store.read().unwrap_err(),
        ItineraryError::Validation { .. }
    ));
}

#[test]
fn save_repairs_a_corrupt_file() {
    let (_tmp, store) = temp_store();
    fs::write(store.path(), "not json").unwrap();
    assert!(matches!(store.read().unwrap_err(), ItineraryError::Parse(_)));

    let doc = sample_trip();
    store.save(&doc).unwrap();
    assert_eq!(store.read().unwrap(), doc);
}

#[test]
fn rejected_save_leaves_previous_document() {
    let (_tmp, store) = temp_store();
    let doc = sample_trip();
    store.save(&doc).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let payload = r#"{
        "trip_meta": { "days_count": 1, "travelers": 1, "budget": 0 },
        "days": []
    }"#;
    let err = store.save_json(payload).unwrap_err();

    match err {
        ItineraryError::Validation { ref message, .. } => {
            assert!(message.contains("title"), "unexpected message: {message}")
        }
        ref other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn out_of_range_document_is_rejected_by_save() {
    let (_tmp, store) = temp_store();
    let mut doc = sample_trip();
    doc.trip_meta.exchange_rate = 0.0;

    let err = store.save(&doc).unwrap_err();
    assert!(matches!(err, ItineraryError::Validation { .. }));
    assert!(!store.exists());
}

#[test]
fn save_json_returns_the_stored_document() {
    let (_tmp, store) = temp_store();
    let raw = sample_trip().to_pretty_json().unwrap();

    let saved = store.save_json(&raw).unwrap();
    assert_eq!(saved, sample_trip());
    assert_eq!(store.load(), saved);
}

#[test]
fn last_save_wins() {
    let (_tmp, store) = temp_store();
    let first = sample_trip();
    let mut second = sample_trip();
    second.trip_meta.title = "Second".to_string();

    store.save(&first).unwrap();
    store.save(&second).unwrap();

    assert_eq!(store.load().trip_meta.title, "Second");
}
