use learnhub_core::preferences::{
    FileStorage, MemoryStorage, Persistence, PreferenceRecord, PreferenceStorage, PreferenceStore,
    DEFAULT_PREFERENCES_KEY,
};
use learnhub_core::presentation::{
    DocumentPresentation, DYSLEXIC_FONT_CLASS, HIGH_CONTRAST_CLASS, REDUCED_MOTION_CLASS,
};

const KEY: &str = DEFAULT_PREFERENCES_KEY;

fn memory_store(storage: MemoryStorage) -> PreferenceStore<MemoryStorage, DocumentPresentation> {
    PreferenceStore::new(KEY, storage, DocumentPresentation::default())
}

#[test]
fn font_scale_round_trips_through_file_storage() {
    let dir = tempfile::tempdir().unwrap();

    for percent in (80..=150).step_by(10) {
        let mut store = PreferenceStore::new(
            KEY,
            FileStorage::new(dir.path()),
            DocumentPresentation::default(),
        );
        let saved = store.set_font_scale(percent);
        assert_eq!(i32::from(saved.font_scale_percent), percent);

        let mut reloaded = PreferenceStore::new(
            KEY,
            FileStorage::new(dir.path()),
            DocumentPresentation::default(),
        );
        assert_eq!(reloaded.load(), saved);
        assert_eq!(reloaded.record(), saved);
        assert_eq!(
            i32::from(reloaded.surface().text_scale_percent()),
            percent
        );
    }
}

#[test]
fn invalid_json_loads_defaults_without_saving() {
    let storage = MemoryStorage::default().with_entry(KEY, "{not json");
    let store = memory_store(storage);

    assert_eq!(store.record(), PreferenceRecord::default());
    assert_eq!(store.persistence(), Persistence::Durable);
    assert_eq!(store.storage().write_count(), 0);
    assert_eq!(store.storage().get(KEY), Some("{not json"));
}

#[test]
fn first_interaction_after_malformed_load_overwrites_payload() {
    let storage = MemoryStorage::default().with_entry(KEY, "[]");
    let mut store = memory_store(storage);
    store.toggle_reduced_motion();

    let stored = store.storage().get(KEY).unwrap();
    let parsed = PreferenceRecord::from_stored(stored).unwrap();
    assert!(parsed.reduced_motion);
}

#[test]
fn toggling_high_contrast_twice_restores_state() {
    let original = PreferenceRecord {
        font_scale_percent: 120,
        high_contrast: false,
        reduced_motion: true,
        dyslexic_font: false,
    };
    let payload = serde_json::to_string(&original).unwrap();
    let mut store = memory_store(MemoryStorage::default().with_entry(KEY, &payload));
    let initial_document = store.surface().clone();

    store.toggle_high_contrast();
    assert!(store.surface().has_class(HIGH_CONTRAST_CLASS));
    store.toggle_high_contrast();

    assert_eq!(store.surface(), &initial_document);
    let stored = PreferenceRecord::from_stored(store.storage().get(KEY).unwrap()).unwrap();
    assert_eq!(stored, original);
    assert_eq!(store.storage().write_count(), 2);
}

#[test]
fn apply_reflects_every_flag_and_is_idempotent() {
    let mut store = memory_store(MemoryStorage::default());
    let record = PreferenceRecord {
        font_scale_percent: 140,
        high_contrast: true,
        reduced_motion: true,
        dyslexic_font: true,
    };

    store.apply(record);
    let once = store.surface().clone();
    store.apply(record);

    assert_eq!(store.surface(), &once);
    assert_eq!(once.text_scale_percent(), 140);
    assert!(once.has_class(HIGH_CONTRAST_CLASS));
    assert!(once.has_class(REDUCED_MOTION_CLASS));
    assert!(once.has_class(DYSLEXIC_FONT_CLASS));
}

#[test]
fn unavailable_storage_falls_back_to_in_memory_session() {
    let mut store = memory_store(MemoryStorage::unavailable());
    assert_eq!(store.record(), PreferenceRecord::default());
    assert_eq!(store.persistence(), Persistence::InMemoryOnly);

    let record = store.toggle_dyslexic_font();
    assert!(record.dyslexic_font);
    assert!(store.surface().has_class(DYSLEXIC_FONT_CLASS));
}

#[test]
fn quota_failure_keeps_in_memory_record() {
    let mut store = memory_store(MemoryStorage::with_quota(8));
    assert_eq!(store.persistence(), Persistence::Durable);

    let record = store.set_font_scale(130);
    assert_eq!(record.font_scale_percent, 130);
    assert_eq!(store.record().font_scale_percent, 130);
    assert_eq!(store.persistence(), Persistence::InMemoryOnly);
    assert_eq!(store.storage().get(KEY), None);
}

#[test]
fn font_scale_buttons_stop_at_bounds() {
    let mut store = memory_store(MemoryStorage::default());
    for _ in 0..10 {
        store.increase_font_scale();
    }
    assert_eq!(store.record().font_scale_percent, 150);
    for _ in 0..10 {
        store.decrease_font_scale();
    }
    assert_eq!(store.record().font_scale_percent, 80);

    store.reset();
    assert_eq!(store.record(), PreferenceRecord::default());
}

#[test]
fn file_storage_reports_missing_key_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("nested"));
    assert!(storage.read(KEY).unwrap().is_none());
    assert!(storage.path_for("a/b").ends_with("a_b.json"));
}

#[test]
fn undecodable_file_is_replaced_on_first_change() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let path = storage.path_for(KEY);
    std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

    let mut store = PreferenceStore::new(KEY, storage, DocumentPresentation::default());
    assert_eq!(store.record(), PreferenceRecord::default());
    assert_eq!(store.persistence(), Persistence::Durable);

    let saved = store.toggle_high_contrast();
    assert!(saved.high_contrast);
    assert_eq!(store.persistence(), Persistence::Durable);

    let stored = std::fs::read_to_string(&path).unwrap();
    assert_eq!(PreferenceRecord::from_stored(&stored), Some(saved));
}
