use serde::{Deserialize, Serialize};

/// Closed set of catalog categories the dashboard knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Course,
    Challenge,
    Project,
    User,
    Document,
    Discussion,
    Job,
    Other,
}

impl Category {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "course" => Self::Course,
            "challenge" => Self::Challenge,
            "project" => Self::Project,
            "user" => Self::User,
            "document" => Self::Document,
            "discussion" => Self::Discussion,
            "job" => Self::Job,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Challenge => "challenge",
            Self::Project => "project",
            Self::User => "user",
            Self::Document => "document",
            Self::Discussion => "discussion",
            Self::Job => "job",
            Self::Other => "other",
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icon shown next to a result row. Unknown categories get the generic file icon.
pub fn category_icon(category: Category) -> &'static str {
    match category {
        Category::Course => "book-open",
        Category::Challenge => "code",
        Category::Project => "folder-git",
        Category::User => "user",
        Category::Document => "file-text",
        Category::Discussion => "message-square",
        Category::Job => "briefcase",
        Category::Other => "file",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("catalog entry is missing an id")]
    MissingId,
    #[error("catalog entry '{0}' has an empty target url")]
    MissingTargetUrl(String),
    #[error("catalog entry id '{0}' appears more than once")]
    DuplicateId(String),
}

/// Catalog row as it appears in fixture files, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSearchResult")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub target_url: String,
    #[serde(skip)]
    normalized_title: String,
    #[serde(skip)]
    normalized_description: String,
}

impl SearchResult {
    /// Builds a validated result. Blank ids and blank targets are rejected
    /// rather than defaulted.
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        category: Category,
        target_url: &str,
    ) -> Result<Self, ValidationError> {
        Self::from_owned(
            id.to_string(),
            title.to_string(),
            description.to_string(),
            category,
            target_url.to_string(),
        )
    }

    pub fn from_owned(
        id: String,
        title: String,
        description: String,
        category: Category,
        target_url: String,
    ) -> Result<Self, ValidationError> {
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(ValidationError::MissingId);
        }
        let target_url = target_url.trim().to_string();
        if target_url.is_empty() {
            return Err(ValidationError::MissingTargetUrl(id));
        }

        let normalized_title = normalize_for_search(&title);
        let normalized_description = normalize_for_search(&description);
        Ok(Self {
            id,
            title,
            description,
            category,
            target_url,
            normalized_title,
            normalized_description,
        })
    }

    pub fn normalized_title(&self) -> &str {
        &self.normalized_title
    }

    pub fn normalized_description(&self) -> &str {
        &self.normalized_description
    }

    pub fn icon(&self) -> &'static str {
        category_icon(self.category)
    }
}

impl TryFrom<RawSearchResult> for SearchResult {
    type Error = ValidationError;

    fn try_from(raw: RawSearchResult) -> Result<Self, Self::Error> {
        let category = raw
            .category
            .as_deref()
            .map(Category::parse)
            .unwrap_or(Category::Other);
        Self::from_owned(
            raw.id.unwrap_or_default(),
            raw.title,
            raw.description,
            category,
            raw.target_url,
        )
    }
}

/// Case folding used on both sides of a substring match.
pub fn normalize_for_search(input: &str) -> String {
    input.to_lowercase()
}
