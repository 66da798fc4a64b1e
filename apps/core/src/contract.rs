use serde::{Deserialize, Serialize};

use crate::hotkey::KeyEvent;
use crate::model::SearchResult;
use crate::preferences::{Persistence, PreferenceChange, PreferenceRecord};
use crate::presentation::DocumentPresentation;
use crate::search_session::{SearchSession, SearchStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveSelectionRequest {
    pub direction: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectResultRequest {
    /// Result to open; the highlighted row when absent.
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub target_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionResponse {
    pub open: bool,
    pub query: String,
    pub results: Vec<SearchResultDto>,
    pub selected_index: usize,
    pub status: SearchStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionResponse {
    pub navigated_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationDto {
    pub font_size: String,
    pub root_classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferencesResponse {
    pub preferences: PreferenceRecord,
    pub persistence: Persistence,
    pub presentation: PresentationDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    OpenSearch,
    KeyPress(KeyEvent),
    Search(SearchRequest),
    MoveSelection(MoveSelectionRequest),
    SelectResult(SelectResultRequest),
    DismissSearch,
    GetPreferences,
    UpdatePreference(PreferenceChange),
    ResetPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    Session(SessionResponse),
    Selection(SelectionResponse),
    Preferences(PreferencesResponse),
}

impl From<&SearchResult> for SearchResultDto {
    fn from(value: &SearchResult) -> Self {
        Self {
            id: value.id.clone(),
            title: value.title.clone(),
            description: value.description.clone(),
            category: value.category.to_string(),
            icon: value.icon().to_string(),
            target_url: value.target_url.clone(),
        }
    }
}

impl From<&SearchSession> for SessionResponse {
    fn from(session: &SearchSession) -> Self {
        Self {
            open: session.is_open(),
            query: session.query().to_string(),
            results: session.results().iter().map(SearchResultDto::from).collect(),
            selected_index: session.selected_index(),
            status: session.status(),
        }
    }
}

impl From<&DocumentPresentation> for PresentationDto {
    fn from(document: &DocumentPresentation) -> Self {
        Self {
            font_size: document.font_size_style(),
            root_classes: document.root_classes().map(str::to_string).collect(),
        }
    }
}
