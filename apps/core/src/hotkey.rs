use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

pub const DEFAULT_SEARCH_CHORD: &str = "Mod+K";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    /// Platform command modifier: Cmd on macOS, Ctrl elsewhere.
    Primary,
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl Modifier {
    fn label(self) -> &'static str {
        match self {
            Self::Primary => "Mod",
            Self::Ctrl => "Ctrl",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
            Self::Meta => "Meta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }

    fn primary(self) -> Modifier {
        match self {
            Self::MacOs => Modifier::Meta,
            Self::Other => Modifier::Ctrl,
        }
    }
}

/// Where keyboard focus sits when a key event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusContext {
    #[default]
    Document,
    TextEntry,
    /// A text field (e.g. a code editor) that binds the same chord itself.
    InterceptingTextEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub focus: FocusContext,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_focus(mut self, focus: FocusContext) -> Self {
        self.focus = focus;
        self
    }

    fn modifiers(&self) -> BTreeSet<Modifier> {
        let mut modifiers = BTreeSet::new();
        if self.ctrl {
            modifiers.insert(Modifier::Ctrl);
        }
        if self.alt {
            modifiers.insert(Modifier::Alt);
        }
        if self.shift {
            modifiers.insert(Modifier::Shift);
        }
        if self.meta {
            modifiers.insert(Modifier::Meta);
        }
        modifiers
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    modifiers: BTreeSet<Modifier>,
    key: String,
}

impl Chord {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.modifiers.iter().copied()
    }

    /// Concrete modifier set once `Mod` is resolved for a platform.
    pub fn resolve(&self, platform: Platform) -> BTreeSet<Modifier> {
        self.modifiers
            .iter()
            .map(|modifier| match modifier {
                Modifier::Primary => platform.primary(),
                other => *other,
            })
            .collect()
    }

    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        if event.focus == FocusContext::InterceptingTextEntry {
            return false;
        }
        event.key.eq_ignore_ascii_case(&self.key) && event.modifiers() == self.resolve(platform)
    }
}

impl Display for Chord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.label())?;
        }
        f.write_str(&self.key)
    }
}

pub fn parse_chord(input: &str) -> Result<Chord, String> {
    let parts: Vec<&str> = input
        .split('+')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() < 2 {
        return Err("Shortcut must include at least one modifier and one key.".to_string());
    }

    let key = normalize_key(parts[parts.len() - 1])?;
    let mut modifiers = BTreeSet::new();
    for part in &parts[..parts.len() - 1] {
        modifiers.insert(normalize_modifier(part)?);
    }

    Ok(Chord { modifiers, key })
}

fn normalize_modifier(input: &str) -> Result<Modifier, String> {
    match input.to_ascii_lowercase().as_str() {
        "mod" | "primary" | "cmdorctrl" => Ok(Modifier::Primary),
        "ctrl" | "control" => Ok(Modifier::Ctrl),
        "alt" | "option" => Ok(Modifier::Alt),
        "shift" => Ok(Modifier::Shift),
        "meta" | "cmd" | "command" | "super" => Ok(Modifier::Meta),
        _ => Err(format!(
            "Unsupported modifier '{input}'. Use Mod, Ctrl, Alt, Shift, or Meta."
        )),
    }
}

fn normalize_key(input: &str) -> Result<String, String> {
    let upper = input.trim().to_ascii_uppercase();
    if upper.len() == 1 {
        let c = upper.chars().next().unwrap_or_default();
        if c.is_ascii_alphanumeric() || c == '/' {
            return Ok(upper);
        }
    }
    Err("Key must be A-Z, 0-9, or '/'.".to_string())
}
