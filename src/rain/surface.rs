use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::state::{AppError, AppResult};

/// Drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn full_rect(&self) -> PxRect {
        PxRect {
            x: 0.0,
            y: 0.0,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PxRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The three primitives the rain needs from a 2-D render target.
pub trait Surface {
    fn resize(&mut self, width: f32, height: f32);
    /// Paints `color` over `rect` at `alpha` opacity.
    fn fill_rect(&mut self, rect: PxRect, color: Color, alpha: f32);
    /// Paints one glyph whose top-left corner sits at `(x, y)`.
    fn draw_text(&mut self, glyph: char, x: f32, y: f32, color: Color, alpha: f32);
}

// Cells fainter than this are wiped by the next overlay.
const CLEAR_BELOW: f32 = 0.02;
// Cells fainter than this are not worth a terminal write.
const VISIBLE_FROM: f32 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Color,
    intensity: f32,
}

impl Cell {
    const BLANK: Cell = Cell {
        glyph: ' ',
        color: Color::Reset,
        intensity: 0.0,
    };
}

/// Character-cell surface. Pixels map onto cells through the terminal's font
/// cell size; overlays fade cell intensity instead of blending colours, which
/// keeps the trail accumulation while staying cheap to render.
#[derive(Debug, Clone)]
pub struct CellSurface {
    cell_w: f32,
    cell_h: f32,
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl CellSurface {
    pub fn acquire(bounds: Bounds, font_size: (u16, u16)) -> AppResult<Self> {
        if font_size.0 == 0 || font_size.1 == 0 {
            return Err(AppError::SurfaceUnavailable(format!(
                "font cell size {}x{} px",
                font_size.0, font_size.1
            )));
        }
        let mut surface = Self {
            cell_w: font_size.0 as f32,
            cell_h: font_size.1 as f32,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
        };
        surface.resize(bounds.width, bounds.height);
        Ok(surface)
    }

    #[cfg(test)]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    #[cfg(test)]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    #[cfg(test)]
    /// Glyph and intensity at a cell, if anything visible is there.
    pub fn glyph_at(&self, col: u16, row: u16) -> Option<(char, f32)> {
        let cell = self.cells.get(self.index(col, row)?)?;
        (cell.intensity > 0.0).then_some((cell.glyph, cell.intensity))
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.cols && row < self.rows)
            .then(|| row as usize * self.cols as usize + col as usize)
    }

    fn to_cells(&self, px: f32, cell: f32, limit: u16) -> u16 {
        (px / cell).floor().clamp(0.0, limit as f32) as u16
    }
}

impl Surface for CellSurface {
    fn resize(&mut self, width: f32, height: f32) {
        let cols = (width.max(0.0) / self.cell_w).floor().min(u16::MAX as f32) as u16;
        let rows = (height.max(0.0) / self.cell_h).floor().min(u16::MAX as f32) as u16;
        if cols == self.cols && rows == self.rows {
            return;
        }
        let mut cells = vec![Cell::BLANK; cols as usize * rows as usize];
        for row in 0..rows.min(self.rows) {
            for col in 0..cols.min(self.cols) {
                if let Some(old) = self.index(col, row) {
                    cells[row as usize * cols as usize + col as usize] = self.cells[old];
                }
            }
        }
        self.cols = cols;
        self.rows = rows;
        self.cells = cells;
    }

    fn fill_rect(&mut self, rect: PxRect, _color: Color, alpha: f32) {
        let keep = 1.0 - alpha.clamp(0.0, 1.0);
        let c0 = self.to_cells(rect.x, self.cell_w, self.cols);
        let r0 = self.to_cells(rect.y, self.cell_h, self.rows);
        let right = (rect.x + rect.width + self.cell_w - 1.0).max(0.0);
        let bottom = (rect.y + rect.height + self.cell_h - 1.0).max(0.0);
        let c1 = self.to_cells(right, self.cell_w, self.cols);
        let r1 = self.to_cells(bottom, self.cell_h, self.rows);
        for row in r0..r1 {
            for col in c0..c1 {
                let i = row as usize * self.cols as usize + col as usize;
                let cell = &mut self.cells[i];
                cell.intensity *= keep;
                if cell.intensity < CLEAR_BELOW {
                    *cell = Cell::BLANK;
                }
            }
        }
    }

    fn draw_text(&mut self, glyph: char, x: f32, y: f32, color: Color, alpha: f32) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let col = (x / self.cell_w).floor();
        let row = (y / self.cell_h).floor();
        if col >= self.cols as f32 || row >= self.rows as f32 {
            return;
        }
        if let Some(i) = self.index(col as u16, row as u16) {
            self.cells[i] = Cell {
                glyph,
                color,
                intensity: alpha.clamp(0.0, 1.0),
            };
        }
    }
}

fn shade(color: Color, intensity: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let scale = |c: u8| (c as f32 * intensity).round() as u8;
            Color::Rgb(scale(r), scale(g), scale(b))
        }
        other if intensity >= 0.5 => other,
        _ => Color::DarkGray,
    }
}

impl Widget for &CellSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..self.rows.min(area.height) {
            for col in 0..self.cols.min(area.width) {
                let cell = self.cells[row as usize * self.cols as usize + col as usize];
                if cell.intensity < VISIBLE_FROM {
                    continue;
                }
                if let Some(out) = buf.cell_mut((area.x + col, area.y + row)) {
                    out.set_char(cell.glyph).set_fg(shade(cell.color, cell.intensity));
                }
            }
        }
    }
}

/// Records draw calls instead of painting them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub size: Bounds,
    pub fills: Vec<(PxRect, f32)>,
    pub glyphs: Vec<(char, f32, f32, f32)>,
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn resize(&mut self, width: f32, height: f32) {
        self.size = Bounds::new(width, height);
    }

    fn fill_rect(&mut self, rect: PxRect, _color: Color, alpha: f32) {
        self.fills.push((rect, alpha));
    }

    fn draw_text(&mut self, glyph: char, x: f32, y: f32, _color: Color, alpha: f32) {
        self.glyphs.push((glyph, x, y, alpha));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Color = Color::Rgb(0, 255, 70);

    fn surface() -> CellSurface {
        CellSurface::acquire(Bounds::new(100.0, 100.0), (10, 20)).unwrap()
    }

    #[test]
    fn test_acquire_measures_cells() {
        let s = surface();
        assert_eq!((s.cols(), s.rows()), (10, 5));
        assert!(CellSurface::acquire(Bounds::new(100.0, 100.0), (0, 20)).is_err());
    }

    #[test]
    fn test_draw_text_maps_pixels_to_cells() {
        let mut s = surface();
        s.draw_text('ア', 25.0, 41.0, GREEN, 0.8);
        assert_eq!(s.glyph_at(2, 2), Some(('ア', 0.8)));
        s.draw_text('x', -1.0, 0.0, GREEN, 1.0);
        s.draw_text('x', 0.0, 100.0, GREEN, 1.0);
        assert_eq!(s.glyph_at(0, 0), None);
    }

    #[test]
    fn test_overlay_fades_then_clears() {
        let mut s = surface();
        s.draw_text('1', 0.0, 0.0, GREEN, 1.0);
        s.fill_rect(Bounds::new(100.0, 100.0).full_rect(), Color::Black, 0.5);
        assert_eq!(s.glyph_at(0, 0), Some(('1', 0.5)));
        for _ in 0..10 {
            s.fill_rect(Bounds::new(100.0, 100.0).full_rect(), Color::Black, 0.5);
        }
        assert_eq!(s.glyph_at(0, 0), None);
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut s = surface();
        s.draw_text('7', 10.0, 20.0, GREEN, 1.0);
        s.resize(200.0, 100.0);
        assert_eq!((s.cols(), s.rows()), (20, 5));
        assert_eq!(s.glyph_at(1, 1), Some(('7', 1.0)));
        s.resize(10.0, 20.0);
        assert_eq!(s.glyph_at(1, 1), None);
    }

    #[test]
    fn test_render_shades_by_intensity() {
        let mut s = surface();
        s.draw_text('Z', 0.0, 0.0, GREEN, 0.5);
        s.draw_text('Q', 10.0, 0.0, GREEN, 0.01);
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        (&s).render(area, &mut buf);
        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.symbol(), "Z");
        assert_eq!(cell.fg, Color::Rgb(0, 128, 35));
        assert_eq!(buf.cell((1, 0)).unwrap().symbol(), " ");
    }
}
