//! Scoped keyboard-shortcut subscriptions.
//!
//! A [`ShortcutSubscription`] keeps its handler registered for as long as it
//! is alive. Dropping it (or calling [`ShortcutSubscription::dispose`])
//! releases the handler, so a torn-down view never leaves a listener behind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::hotkey::{parse_chord, Chord, KeyEvent, Platform};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShortcutError {
    #[error("invalid shortcut: {0}")]
    InvalidChord(String),
}

type Handler = Box<dyn FnMut(&KeyEvent)>;

struct Binding {
    id: u64,
    chord: Chord,
    // Taken out while the handler runs so it may drop subscriptions itself.
    handler: Option<Handler>,
}

#[derive(Default)]
struct Bindings {
    next_id: u64,
    entries: Vec<Binding>,
}

pub struct ShortcutRegistry {
    platform: Platform,
    bindings: Rc<RefCell<Bindings>>,
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl ShortcutRegistry {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            bindings: Rc::new(RefCell::new(Bindings::default())),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn subscribe<F>(&self, chord: &str, handler: F) -> Result<ShortcutSubscription, ShortcutError>
    where
        F: FnMut(&KeyEvent) + 'static,
    {
        let chord = parse_chord(chord).map_err(ShortcutError::InvalidChord)?;
        let mut bindings = self.bindings.borrow_mut();
        bindings.next_id += 1;
        let id = bindings.next_id;
        log::debug!("event=shortcut_subscribed id={id} chord={chord}");
        bindings.entries.push(Binding {
            id,
            chord,
            handler: Some(Box::new(handler)),
        });

        Ok(ShortcutSubscription {
            id,
            bindings: Rc::downgrade(&self.bindings),
        })
    }

    /// Runs every handler whose chord matches. Returns whether any fired.
    pub fn dispatch(&self, event: &KeyEvent) -> bool {
        let matching: Vec<u64> = self
            .bindings
            .borrow()
            .entries
            .iter()
            .filter(|binding| binding.chord.matches(event, self.platform))
            .map(|binding| binding.id)
            .collect();

        let mut fired = false;
        for id in matching {
            let handler = self
                .bindings
                .borrow_mut()
                .entries
                .iter_mut()
                .find(|binding| binding.id == id)
                .and_then(|binding| binding.handler.take());
            let Some(mut handler) = handler else {
                continue;
            };

            handler(event);
            fired = true;

            if let Some(binding) = self
                .bindings
                .borrow_mut()
                .entries
                .iter_mut()
                .find(|binding| binding.id == id)
            {
                binding.handler = Some(handler);
            }
        }
        fired
    }

    pub fn active_count(&self) -> usize {
        self.bindings.borrow().entries.len()
    }
}

#[must_use = "dropping the subscription unregisters its handler"]
pub struct ShortcutSubscription {
    id: u64,
    bindings: Weak<RefCell<Bindings>>,
}

impl ShortcutSubscription {
    pub fn dispose(self) {}
}

impl Drop for ShortcutSubscription {
    fn drop(&mut self) {
        let Some(bindings) = self.bindings.upgrade() else {
            return;
        };
        let Ok(mut bindings) = bindings.try_borrow_mut() else {
            return;
        };
        bindings.entries.retain(|binding| binding.id != self.id);
        log::debug!("event=shortcut_released id={}", self.id);
    }
}
