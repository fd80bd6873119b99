//! Labelled on/off switch.

/// Element id derived from a label: lowercase, whitespace runs become `-`.
#[must_use]
pub fn toggle_id(label: &str) -> String {
    let mut id = String::with_capacity(label.len());
    let mut in_space = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !in_space {
                id.push('-');
            }
            in_space = true;
        } else {
            id.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    id
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub label: String,
    pub description: Option<String>,
    pub checked: bool,
    pub disabled: bool,
    id: Option<String>,
}

impl Toggle {
    #[must_use]
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self { label: label.into(), description: None, checked, disabled: false, id: None }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Explicit id if set, otherwise derived from the label.
    #[must_use]
    pub fn id(&self) -> String {
        self.id.clone().unwrap_or_else(|| toggle_id(&self.label))
    }

    /// Flip the switch. Disabled toggles stay put. Returns the new state.
    pub fn flip(&mut self) -> bool {
        if !self.disabled {
            self.checked = !self.checked;
        }
        self.checked
    }

    /// `[x] Label - description`, with `(disabled)` appended when disabled.
    #[must_use]
    pub fn render(&self) -> String {
        let mark = if self.checked { 'x' } else { ' ' };
        let mut line = format!("[{mark}] {}", self.label);
        if let Some(description) = &self.description {
            line.push_str(" - ");
            line.push_str(description);
        }
        if self.disabled {
            line.push_str(" (disabled)");
        }
        line
    }
}

#[cfg(test)]
#[path = "toggle_test.rs"]
mod tests;
