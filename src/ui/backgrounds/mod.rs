use ratatui::{Frame, layout::Rect};
use crate::app::App;
use crate::ui::backgrounds::matrixrain::MatrixRainBackground;
use crate::ui::backgrounds::still::StillBackground;

pub mod matrixrain;
pub mod still;

/// Decorative full-screen layer drawn under everything else.
pub trait Background {
    fn name(&self) -> &'static str;
    fn draw_background(&self, f: &mut Frame, app: &App, area: Rect);
}

pub struct BackgroundManager {
    backgrounds: Vec<Box<dyn Background>>,
    current_index: usize,
}

impl BackgroundManager {
    pub fn new() -> Self {
        let backgrounds: Vec<Box<dyn Background>> = vec![
            Box::new(MatrixRainBackground),
            Box::new(StillBackground),
        ];
        Self {
            backgrounds,
            current_index: 0,
        }
    }

    pub fn get_current_background(&self) -> Option<&dyn Background> {
        self.backgrounds.get(self.current_index).map(|b| b.as_ref())
    }

    #[cfg(test)]
    pub fn get_background_name(&self) -> &str {
        self.get_current_background().map(|b| b.name()).unwrap_or("None")
    }

    pub fn set_background_by_name(&mut self, name: &str) {
        let found = self.backgrounds.iter().position(|b| b.name().eq_ignore_ascii_case(name));
        if let Some(idx) = found {
            self.current_index = idx;
        }
    }
}
