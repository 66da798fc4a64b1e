use std::collections::BTreeSet;

pub const HIGH_CONTRAST_CLASS: &str = "high-contrast";
pub const REDUCED_MOTION_CLASS: &str = "reduced-motion";
pub const DYSLEXIC_FONT_CLASS: &str = "dyslexic-font";

/// The one place preference changes reach the rendered document.
pub trait PresentationSurface {
    fn set_text_scale_percent(&mut self, percent: u8);
    fn set_root_flag(&mut self, class_name: &str, enabled: bool);
}

/// Document root as seen by the shell: a text scale plus a set of root classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPresentation {
    text_scale_percent: u8,
    root_classes: BTreeSet<String>,
}

impl Default for DocumentPresentation {
    fn default() -> Self {
        Self {
            text_scale_percent: 100,
            root_classes: BTreeSet::new(),
        }
    }
}

impl DocumentPresentation {
    pub fn text_scale_percent(&self) -> u8 {
        self.text_scale_percent
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.root_classes.contains(class_name)
    }

    pub fn root_classes(&self) -> impl Iterator<Item = &str> {
        self.root_classes.iter().map(String::as_str)
    }

    /// Value for the root `font-size` style, e.g. `"120%"`.
    pub fn font_size_style(&self) -> String {
        format!("{}%", self.text_scale_percent)
    }
}

impl PresentationSurface for DocumentPresentation {
    fn set_text_scale_percent(&mut self, percent: u8) {
        self.text_scale_percent = percent;
    }

    fn set_root_flag(&mut self, class_name: &str, enabled: bool) {
        if enabled {
            self.root_classes.insert(class_name.to_string());
        } else {
            self.root_classes.remove(class_name);
        }
    }
}
