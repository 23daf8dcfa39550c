//! Manual keyed-entry channel

/// The scan input field
///
/// Both channels write here: the operator types into it, the camera loop
/// drops a recognized number into it. Whoever confirms last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualChannel {
    text: String,
    focused: bool,
}

impl ManualChannel {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            focused: true,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Confirmation (Enter): hand the current text downstream
    pub fn confirm(&self) -> String {
        self.text.trim().to_string()
    }

    /// Ready for the next scan
    pub fn clear_and_focus(&mut self) {
        self.text.clear();
        self.focused = true;
    }
}
