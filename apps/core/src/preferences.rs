//! Accessibility and display preferences.
//!
//! A [`PreferenceStore`] owns the in-memory record, the durable storage it is
//! mirrored to, and the presentation surface it is reflected on. Every
//! mutation updates the record, applies it, then saves it, in that order.
//!
//! Storage problems never reach the caller. A failed read yields defaults; a
//! failed write switches the store to in-memory-only mode for the rest of the
//! session.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::presentation::{
    PresentationSurface, DYSLEXIC_FONT_CLASS, HIGH_CONTRAST_CLASS, REDUCED_MOTION_CLASS,
};

pub const DEFAULT_PREFERENCES_KEY: &str = "learnhub.preferences";
pub const MIN_FONT_SCALE_PERCENT: u8 = 80;
pub const MAX_FONT_SCALE_PERCENT: u8 = 150;
pub const FONT_SCALE_STEP: u8 = 10;
pub const DEFAULT_FONT_SCALE_PERCENT: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    pub font_scale_percent: u8,
    pub high_contrast: bool,
    pub reduced_motion: bool,
    pub dyslexic_font: bool,
}

impl Default for PreferenceRecord {
    fn default() -> Self {
        Self {
            font_scale_percent: DEFAULT_FONT_SCALE_PERCENT,
            high_contrast: false,
            reduced_motion: false,
            dyslexic_font: false,
        }
    }
}

impl PreferenceRecord {
    pub fn is_valid(&self) -> bool {
        (MIN_FONT_SCALE_PERCENT..=MAX_FONT_SCALE_PERCENT).contains(&self.font_scale_percent)
            && self.font_scale_percent % FONT_SCALE_STEP == 0
    }

    /// Parses a stored payload. Anything unparsable or off the slider grid is
    /// treated as absent.
    pub fn from_stored(payload: &str) -> Option<Self> {
        serde_json::from_str::<Self>(payload)
            .ok()
            .filter(Self::is_valid)
    }
}

/// Clamps to the slider range and snaps to the nearest step.
pub fn snap_font_scale(value: i32) -> u8 {
    let min = i32::from(MIN_FONT_SCALE_PERCENT);
    let max = i32::from(MAX_FONT_SCALE_PERCENT);
    let step = i32::from(FONT_SCALE_STEP);
    let clamped = value.clamp(min, max);
    let snapped = ((clamped - min + step / 2) / step) * step + min;
    snapped.clamp(min, max) as u8
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded writing '{key}'")]
    QuotaExceeded { key: String },
    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Durable key/value storage for small serialized records.
pub trait PreferenceStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: PreferenceStorage + ?Sized> PreferenceStorage for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// One JSON file per key inside a storage directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_stem}.json"))
    }
}

impl PreferenceStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        // Undecodable bytes are a malformed payload, not a storage failure.
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Write-then-rename keeps the key atomic for readers.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|source| StorageError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryMode {
    Available,
    Unavailable,
    Quota(usize),
}

/// Process-local storage. Also stands in for disabled or full browser storage.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    mode: MemoryMode,
    writes: usize,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            mode: MemoryMode::Available,
            writes: 0,
        }
    }
}

impl MemoryStorage {
    pub fn unavailable() -> Self {
        Self {
            mode: MemoryMode::Unavailable,
            ..Self::default()
        }
    }

    /// Rejects any write whose value is longer than `max_bytes`.
    pub fn with_quota(max_bytes: usize) -> Self {
        Self {
            mode: MemoryMode::Quota(max_bytes),
            ..Self::default()
        }
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl PreferenceStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.mode == MemoryMode::Unavailable {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self.mode {
            MemoryMode::Unavailable => {
                return Err(StorageError::Unavailable("storage disabled".to_string()))
            }
            MemoryMode::Quota(max_bytes) if value.len() > max_bytes => {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                })
            }
            _ => {}
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    Durable,
    InMemoryOnly,
}

/// A single user-facing preference change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PreferenceChange {
    FontScale(i32),
    IncreaseFontScale,
    DecreaseFontScale,
    ToggleHighContrast,
    ToggleReducedMotion,
    ToggleDyslexicFont,
}

pub struct PreferenceStore<S, P> {
    key: String,
    storage: S,
    surface: P,
    record: PreferenceRecord,
    persistence: Persistence,
}

impl<S, P> PreferenceStore<S, P>
where
    S: PreferenceStorage,
    P: PresentationSurface,
{
    /// Loads the stored record and applies it. Loading never writes.
    pub fn new(key: &str, storage: S, surface: P) -> Self {
        let mut store = Self {
            key: key.to_string(),
            storage,
            surface,
            record: PreferenceRecord::default(),
            persistence: Persistence::Durable,
        };
        let record = store.load();
        store.record = record;
        store.apply(record);
        store
    }

    /// Reads the durable copy, falling back to defaults when it is missing,
    /// malformed or unreadable.
    pub fn load(&mut self) -> PreferenceRecord {
        match self.storage.read(&self.key) {
            Ok(Some(payload)) => PreferenceRecord::from_stored(&payload).unwrap_or_else(|| {
                log::warn!(
                    "event=preferences_load status=malformed key={} action=use_defaults",
                    self.key
                );
                PreferenceRecord::default()
            }),
            Ok(None) => {
                log::debug!("event=preferences_load status=absent key={}", self.key);
                PreferenceRecord::default()
            }
            Err(error) => {
                log::warn!(
                    "event=preferences_load status=storage_error key={} error={} action=in_memory_only",
                    self.key,
                    error
                );
                self.persistence = Persistence::InMemoryOnly;
                PreferenceRecord::default()
            }
        }
    }

    pub fn apply(&mut self, record: PreferenceRecord) {
        self.surface
            .set_text_scale_percent(record.font_scale_percent);
        self.surface
            .set_root_flag(HIGH_CONTRAST_CLASS, record.high_contrast);
        self.surface
            .set_root_flag(REDUCED_MOTION_CLASS, record.reduced_motion);
        self.surface
            .set_root_flag(DYSLEXIC_FONT_CLASS, record.dyslexic_font);
    }

    /// Overwrites the durable copy. Skipped once the session is in-memory-only.
    pub fn save(&mut self, record: &PreferenceRecord) -> Result<(), StorageError> {
        if self.persistence == Persistence::InMemoryOnly {
            return Ok(());
        }
        let payload = serde_json::to_string(record)
            .map_err(|error| StorageError::Unavailable(error.to_string()))?;
        self.storage.write(&self.key, &payload)
    }

    pub fn record(&self) -> PreferenceRecord {
        self.record
    }

    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn surface(&self) -> &P {
        &self.surface
    }

    pub fn change(&mut self, change: PreferenceChange) -> PreferenceRecord {
        match change {
            PreferenceChange::FontScale(value) => self.set_font_scale(value),
            PreferenceChange::IncreaseFontScale => self.increase_font_scale(),
            PreferenceChange::DecreaseFontScale => self.decrease_font_scale(),
            PreferenceChange::ToggleHighContrast => self.toggle_high_contrast(),
            PreferenceChange::ToggleReducedMotion => self.toggle_reduced_motion(),
            PreferenceChange::ToggleDyslexicFont => self.toggle_dyslexic_font(),
        }
    }

    pub fn set_font_scale(&mut self, value: i32) -> PreferenceRecord {
        let mut next = self.record;
        next.font_scale_percent = snap_font_scale(value);
        self.commit(next)
    }

    pub fn increase_font_scale(&mut self) -> PreferenceRecord {
        let current = i32::from(self.record.font_scale_percent);
        self.set_font_scale(current + i32::from(FONT_SCALE_STEP))
    }

    pub fn decrease_font_scale(&mut self) -> PreferenceRecord {
        let current = i32::from(self.record.font_scale_percent);
        self.set_font_scale(current - i32::from(FONT_SCALE_STEP))
    }

    pub fn toggle_high_contrast(&mut self) -> PreferenceRecord {
        let mut next = self.record;
        next.high_contrast = !next.high_contrast;
        self.commit(next)
    }

    pub fn toggle_reduced_motion(&mut self) -> PreferenceRecord {
        let mut next = self.record;
        next.reduced_motion = !next.reduced_motion;
        self.commit(next)
    }

    pub fn toggle_dyslexic_font(&mut self) -> PreferenceRecord {
        let mut next = self.record;
        next.dyslexic_font = !next.dyslexic_font;
        self.commit(next)
    }

    pub fn reset(&mut self) -> PreferenceRecord {
        self.commit(PreferenceRecord::default())
    }

    /// Update, apply, save.
    fn commit(&mut self, next: PreferenceRecord) -> PreferenceRecord {
        self.record = next;
        self.apply(next);
        if let Err(error) = self.save(&next) {
            log::warn!(
                "event=preferences_save status=error key={} error={} action=in_memory_only",
                self.key,
                error
            );
            self.persistence = Persistence::InMemoryOnly;
        }
        self.record
    }
}
