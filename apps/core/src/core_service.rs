use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::catalog::{CatalogError, CatalogProvider, SqliteCatalog, StaticCatalog};
use crate::config::{validate, Config};
use crate::contract::{
    CoreRequest, CoreResponse, PreferencesResponse, PresentationDto, SelectionResponse,
    SessionResponse,
};
use crate::hotkey::{KeyEvent, Platform};
use crate::navigation::HistoryNavigator;
use crate::preferences::{
    FileStorage, PreferenceChange, PreferenceRecord, PreferenceStorage, PreferenceStore,
};
use crate::presentation::DocumentPresentation;
use crate::search_session::{QueryDebouncer, SearchSession, SelectOutcome, SessionAction};
use crate::shortcut::{ShortcutError, ShortcutRegistry, ShortcutSubscription};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(String),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("shortcut error: {0}")]
    Shortcut(#[from] ShortcutError),
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Everything the dashboard shell talks to: preferences, the search session,
/// the catalog behind it and the search shortcut.
pub struct CoreService {
    preferences: PreferenceStore<Box<dyn PreferenceStorage>, DocumentPresentation>,
    catalog: Box<dyn CatalogProvider>,
    session: SearchSession,
    debouncer: QueryDebouncer,
    navigator: HistoryNavigator,
    shortcuts: ShortcutRegistry,
    shortcut_fired: Rc<Cell<bool>>,
    _search_shortcut: ShortcutSubscription,
}

impl CoreService {
    pub fn new(config: Config) -> Result<Self, ServiceError> {
        validate(&config).map_err(ServiceError::Config)?;
        let storage = Box::new(FileStorage::new(config.storage_dir.clone()));
        let catalog = open_catalog(&config)?;
        Self::with_parts(&config, storage, catalog, Platform::current())
    }

    pub fn with_parts(
        config: &Config,
        storage: Box<dyn PreferenceStorage>,
        catalog: Box<dyn CatalogProvider>,
        platform: Platform,
    ) -> Result<Self, ServiceError> {
        validate(config).map_err(ServiceError::Config)?;
        let preferences = PreferenceStore::new(
            &config.preferences_key,
            storage,
            DocumentPresentation::default(),
        );

        let shortcuts = ShortcutRegistry::new(platform);
        let shortcut_fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&shortcut_fired);
        let search_shortcut = shortcuts.subscribe(&config.shortcut, move |_| flag.set(true))?;

        Ok(Self {
            preferences,
            catalog,
            session: SearchSession::default(),
            debouncer: QueryDebouncer::new(Duration::from_millis(config.debounce_ms)),
            navigator: HistoryNavigator::default(),
            shortcuts,
            shortcut_fired,
            _search_shortcut: search_shortcut,
        })
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn debouncer(&self) -> &QueryDebouncer {
        &self.debouncer
    }

    pub fn navigator(&self) -> &HistoryNavigator {
        &self.navigator
    }

    pub fn preferences(&self) -> PreferenceRecord {
        self.preferences.record()
    }

    pub fn presentation(&self) -> &DocumentPresentation {
        self.preferences.surface()
    }

    /// Routes a key event through the shortcut registry. Returns the session
    /// transition when the search chord fired.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<SessionAction> {
        self.shortcut_fired.set(false);
        self.shortcuts.dispatch(event);
        if self.shortcut_fired.replace(false) {
            return Some(self.session.open());
        }
        None
    }

    pub fn open_search(&mut self) -> SessionAction {
        self.session.open()
    }

    pub fn search(&mut self, query: &str) -> &SearchSession {
        self.session.set_query(query, self.catalog.as_ref());
        &self.session
    }

    /// Holds a keystroke's query until typing pauses. Ignored while closed.
    pub fn queue_query(&mut self, query: &str, now: Instant) {
        if self.session.is_open() {
            self.debouncer.push(query, now);
        }
    }

    /// Runs the pending query once the debounce window has elapsed. Returns
    /// whether a search ran.
    pub fn flush_query(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(query) if self.session.is_open() => {
                self.session.set_query(&query, self.catalog.as_ref());
                true
            }
            _ => false,
        }
    }

    pub fn move_selection(&mut self, direction: i32) -> usize {
        self.session.move_selection(direction)
    }

    /// Selects a result by id from the current list, or the highlighted row.
    /// Returns the navigation target, or `None` when the session was already
    /// closed.
    pub fn select_result(&mut self, id: Option<&str>) -> Result<Option<String>, ServiceError> {
        let outcome = match id {
            Some(id) => {
                if !self.session.is_open() {
                    return Ok(None);
                }
                let result = self
                    .session
                    .results()
                    .iter()
                    .find(|result| result.id == id)
                    .cloned()
                    .ok_or_else(|| ServiceError::ItemNotFound(id.to_string()))?;
                self.session.select_result(&result, &mut self.navigator)
            }
            None => self.session.select_current(&mut self.navigator),
        };

        match outcome {
            SelectOutcome::Navigated(target) => Ok(Some(target)),
            SelectOutcome::AlreadyClosed => Ok(None),
            SelectOutcome::NothingSelected => Err(ServiceError::InvalidRequest(
                "no result selected".to_string(),
            )),
        }
    }

    pub fn dismiss_search(&mut self) -> bool {
        self.debouncer.cancel();
        self.session.dismiss()
    }

    pub fn update_preference(&mut self, change: PreferenceChange) -> PreferenceRecord {
        self.preferences.change(change)
    }

    pub fn reset_preferences(&mut self) -> PreferenceRecord {
        self.preferences.reset()
    }

    pub fn handle_command(&mut self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        let response = match request {
            CoreRequest::OpenSearch => {
                self.open_search();
                self.session_response()
            }
            CoreRequest::KeyPress(event) => {
                self.handle_key(&event);
                self.session_response()
            }
            CoreRequest::Search(request) => {
                if !self.session.is_open() {
                    return Err(ServiceError::InvalidRequest(
                        "search surface is closed".to_string(),
                    ));
                }
                self.search(&request.query);
                self.session_response()
            }
            CoreRequest::MoveSelection(request) => {
                self.move_selection(request.direction);
                self.session_response()
            }
            CoreRequest::SelectResult(request) => {
                let navigated_to = self.select_result(request.id.as_deref())?;
                CoreResponse::Selection(SelectionResponse { navigated_to })
            }
            CoreRequest::DismissSearch => {
                self.dismiss_search();
                self.session_response()
            }
            CoreRequest::GetPreferences => self.preferences_response(),
            CoreRequest::UpdatePreference(change) => {
                self.update_preference(change);
                self.preferences_response()
            }
            CoreRequest::ResetPreferences => {
                self.reset_preferences();
                self.preferences_response()
            }
        };
        Ok(response)
    }

    fn session_response(&self) -> CoreResponse {
        CoreResponse::Session(SessionResponse::from(&self.session))
    }

    fn preferences_response(&self) -> CoreResponse {
        CoreResponse::Preferences(PreferencesResponse {
            preferences: self.preferences.record(),
            persistence: self.preferences.persistence(),
            presentation: PresentationDto::from(self.preferences.surface()),
        })
    }
}

/// SQLite catalog when configured (seeded from fixtures if both are set),
/// otherwise the fixture files, otherwise an empty catalog.
fn open_catalog(config: &Config) -> Result<Box<dyn CatalogProvider>, ServiceError> {
    let fixtures = config
        .catalog_path
        .as_deref()
        .map(StaticCatalog::from_path)
        .transpose()?;

    match (&config.catalog_db_path, fixtures) {
        (Some(db_path), fixtures) => {
            let catalog = SqliteCatalog::open(db_path)?;
            if let Some(fixtures) = fixtures {
                let count = catalog.import(fixtures.items())?;
                log::info!("event=catalog_import rows={count}");
            }
            Ok(Box::new(catalog))
        }
        (None, Some(fixtures)) => {
            if fixtures.is_empty() {
                log::warn!("event=catalog_open status=empty reason=no_fixture_items");
            }
            Ok(Box::new(fixtures))
        }
        (None, None) => {
            log::warn!("event=catalog_open status=empty reason=no_catalog_configured");
            Ok(Box::new(StaticCatalog::default()))
        }
    }
}
