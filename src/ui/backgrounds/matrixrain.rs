use ratatui::{Frame, layout::Rect};
use crate::app::App;
use crate::ui::backgrounds::Background;

/// Shows whatever the rain loop has painted onto its cell surface.
pub struct MatrixRainBackground;

impl Background for MatrixRainBackground {
    fn name(&self) -> &'static str { "MatrixRain" }
    fn draw_background(&self, f: &mut Frame, app: &App, area: Rect) {
        if let Some(surface) = app.rain.surface() {
            f.render_widget(surface, area);
        }
    }
}
