#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("empty navigation target")]
    EmptyTarget,
    #[error("navigation target must be an app path or http(s) url: {0}")]
    UnsupportedTarget(String),
}

/// Client-side view transition. Fire-and-forget: callers get no result.
pub trait Navigator {
    fn navigate(&mut self, target: &str);
}

pub fn normalize_target(target: &str) -> Result<String, NavigationError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(NavigationError::EmptyTarget);
    }

    let lower = trimmed.to_ascii_lowercase();
    if trimmed.starts_with('/') || lower.starts_with("https://") || lower.starts_with("http://") {
        return Ok(trimmed.to_string());
    }

    Err(NavigationError::UnsupportedTarget(trimmed.to_string()))
}

/// In-process router: records every transition it performs.
#[derive(Debug, Clone, Default)]
pub struct HistoryNavigator {
    entries: Vec<String>,
}

impl HistoryNavigator {
    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn history(&self) -> &[String] {
        &self.entries
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&mut self, target: &str) {
        match normalize_target(target) {
            Ok(path) => {
                log::info!("event=navigate target={path}");
                self.entries.push(path);
            }
            Err(error) => log::warn!("event=navigate status=rejected error={error}"),
        }
    }
}
