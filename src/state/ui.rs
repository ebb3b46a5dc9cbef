/// State management for UI-specific state
pub struct UiState {
    pub should_quit: bool,
    pub show_footer: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            should_quit: false,
            show_footer: true,
        }
    }
}

impl UiState {
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn toggle_footer(&mut self) {
        self.show_footer = !self.show_footer;
    }
}
