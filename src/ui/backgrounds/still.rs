use ratatui::{Frame, layout::Rect, style::{Style, Color}, buffer::Buffer};
use crate::app::App;
use crate::rain::render_loop::DEFAULT_GLYPHS;
use crate::ui::backgrounds::Background;

/// Non-animated stand-in for the rain: a fixed scatter of dim glyphs.
pub struct StillBackground;

impl Background for StillBackground {
    fn name(&self) -> &'static str {
        "Still"
    }

    fn draw_background(&self, f: &mut Frame, _app: &App, area: Rect) {
        draw_still(f.buffer_mut(), area);
    }
}

/// Same picture for the same area, every time.
pub fn draw_still(buf: &mut Buffer, area: Rect) {
    let glyphs: Vec<char> = DEFAULT_GLYPHS.chars().collect();
    for y in 0..area.height {
        for x in 0..area.width {
            let seed = x as usize * 17 + y as usize * 23;
            if seed % 29 != 0 && (x as usize * 7 + y as usize) % 31 != 0 {
                continue;
            }
            let color = if (x as usize + y as usize) % 3 == 0 {
                Color::Green
            } else {
                Color::DarkGray
            };
            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_char(glyphs[seed % glyphs.len()]).set_style(Style::default().fg(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_is_deterministic() {
        let area = Rect::new(0, 0, 40, 12);
        let mut a = Buffer::empty(area);
        let mut b = Buffer::empty(area);
        draw_still(&mut a, area);
        draw_still(&mut b, area);
        assert_eq!(a, b);
        assert_ne!(a, Buffer::empty(area));
    }
}
