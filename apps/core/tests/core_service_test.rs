use std::time::{Duration, Instant};

use learnhub_core::catalog::StaticCatalog;
use learnhub_core::config::Config;
use learnhub_core::core_service::{CoreService, ServiceError};
use learnhub_core::hotkey::{FocusContext, KeyEvent, Platform};
use learnhub_core::model::{Category, SearchResult};
use learnhub_core::preferences::{MemoryStorage, PreferenceChange, PreferenceRecord};
use learnhub_core::presentation::HIGH_CONTRAST_CLASS;
use learnhub_core::search_session::SessionAction;

fn test_service() -> CoreService {
    let catalog = StaticCatalog::new(vec![
        SearchResult::new(
            "c-algo",
            "Algorithms 101",
            "Sorting and binary search",
            Category::Course,
            "/courses/algorithms-101",
        )
        .unwrap(),
        SearchResult::new(
            "ch-binary",
            "Binary Search Challenge",
            "Timed challenge",
            Category::Challenge,
            "/challenges/binary-search",
        )
        .unwrap(),
    ])
    .unwrap();

    CoreService::with_parts(
        &Config::default(),
        Box::new(MemoryStorage::default()),
        Box::new(catalog),
        Platform::Other,
    )
    .unwrap()
}

#[test]
fn shortcut_opens_search_once() {
    let mut service = test_service();
    let chord = KeyEvent::new("k").with_ctrl();

    assert_eq!(service.handle_key(&chord), Some(SessionAction::Opened));
    assert_eq!(service.handle_key(&chord), Some(SessionAction::FocusExisting));
    assert_eq!(service.handle_key(&KeyEvent::new("k")), None);
    assert!(service.session().is_open());
}

#[test]
fn shortcut_is_ignored_inside_intercepting_editor() {
    let mut service = test_service();
    let chord = KeyEvent::new("k")
        .with_ctrl()
        .in_focus(FocusContext::InterceptingTextEntry);

    assert_eq!(service.handle_key(&chord), None);
    assert!(!service.session().is_open());
}

#[test]
fn search_then_select_by_id_navigates() {
    let mut service = test_service();
    service.open_search();
    let session = service.search("binary");
    assert_eq!(session.results().len(), 2);

    let target = service.select_result(Some("ch-binary")).unwrap();
    assert_eq!(target.as_deref(), Some("/challenges/binary-search"));
    assert!(!service.session().is_open());
    assert_eq!(service.navigator().current(), Some("/challenges/binary-search"));

    assert_eq!(service.select_result(Some("ch-binary")).unwrap(), None);
    assert_eq!(service.navigator().history().len(), 1);
}

#[test]
fn select_unknown_id_returns_typed_error() {
    let mut service = test_service();
    service.open_search();
    service.search("binary");

    match service.select_result(Some("missing")) {
        Err(ServiceError::ItemNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(service.session().is_open());
}

#[test]
fn preference_changes_reach_presentation() {
    let mut service = test_service();
    assert_eq!(service.preferences(), PreferenceRecord::default());

    service.update_preference(PreferenceChange::ToggleHighContrast);
    service.update_preference(PreferenceChange::FontScale(137));

    assert_eq!(service.preferences().font_scale_percent, 140);
    assert!(service.presentation().has_class(HIGH_CONTRAST_CLASS));
    assert_eq!(service.presentation().font_size_style(), "140%");

    service.reset_preferences();
    assert!(!service.presentation().has_class(HIGH_CONTRAST_CLASS));
}

#[test]
fn invalid_config_is_rejected() {
    let config = Config {
        shortcut: "Hyper+K".to_string(),
        ..Default::default()
    };
    let result = CoreService::with_parts(
        &config,
        Box::new(MemoryStorage::default()),
        Box::new(StaticCatalog::default()),
        Platform::Other,
    );
    assert!(matches!(result, Err(ServiceError::Config(_))));
}

#[test]
fn new_service_reads_fixture_catalog_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json5");
    std::fs::write(
        &catalog_path,
        r#"[{ id: "j-1", title: "Frontend Engineer", description: "React", category: "job", targetUrl: "/jobs/1" }]"#,
    )
    .unwrap();

    let config = Config {
        storage_dir: dir.path().join("storage"),
        catalog_path: Some(catalog_path),
        ..Default::default()
    };
    let mut service = CoreService::new(config).unwrap();
    service.open_search();
    assert_eq!(service.search("react").results().len(), 1);

    service.update_preference(PreferenceChange::ToggleReducedMotion);
    assert!(dir
        .path()
        .join("storage")
        .join("learnhub.preferences.json")
        .exists());
}

#[test]
fn configured_debounce_window_gates_queued_queries() {
    let config = Config {
        debounce_ms: 250,
        ..Default::default()
    };
    let mut service = CoreService::with_parts(
        &config,
        Box::new(MemoryStorage::default()),
        Box::new(StaticCatalog::default()),
        Platform::Other,
    )
    .unwrap();
    assert_eq!(service.debouncer().window(), Duration::from_millis(250));

    let start = Instant::now();
    service.queue_query("bin", start);
    assert!(!service.debouncer().is_pending());

    service.open_search();
    service.queue_query("b", start);
    service.queue_query("bin", start + Duration::from_millis(100));
    assert!(!service.flush_query(start + Duration::from_millis(300)));
    assert!(service.flush_query(start + Duration::from_millis(350)));
    assert_eq!(service.session().query(), "bin");
    assert!(!service.debouncer().is_pending());

    service.queue_query("tree", start + Duration::from_millis(400));
    service.dismiss_search();
    assert!(!service.debouncer().is_pending());
    assert!(!service.flush_query(start + Duration::from_secs(5)));
}

#[test]
fn debounced_query_runs_against_catalog() {
    let mut service = test_service();
    assert_eq!(service.debouncer().window(), Duration::from_millis(200));

    let start = Instant::now();
    service.open_search();
    service.queue_query("challenge", start);
    assert!(service.session().results().is_empty());
    assert!(service.flush_query(start + Duration::from_millis(200)));

    let ids: Vec<&str> = service
        .session()
        .results()
        .iter()
        .map(|result| result.id.as_str())
        .collect();
    assert_eq!(ids, vec!["ch-binary"]);
}
