//! Main UI module. Draws the background layer and the status footer.

pub mod backgrounds;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::App;
use crate::rain::MountPhase;

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    if let Some(background) = app.backgrounds.get_current_background() {
        background.draw_background(f, app, size);
    }

    if app.ui.show_footer {
        let footer_height = app.config.footer_height.min(size.height);
        let footer = Rect::new(
            size.x,
            size.y + size.height - footer_height,
            size.width,
            footer_height,
        );
        draw_footer(f, app, footer);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    f.render_widget(Clear, area);

    let footer_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50), // Help text area
            Constraint::Percentage(50), // Status area
        ])
        .split(area);

    f.render_widget(
        Paragraph::new("[M] Motion | [H] Hide footer | [Q]/[Esc] Quit")
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP)),
        footer_chunks[0],
    );

    f.render_widget(
        Paragraph::new(Span::styled(status_line(app), Style::default().fg(Color::Yellow)))
            .alignment(Alignment::Right)
            .block(Block::default().borders(Borders::TOP)),
        footer_chunks[1],
    );
}

pub fn status_line(app: &App) -> String {
    let caps = app.rain.capabilities();
    let config = app.rain.config();
    let profile = if caps.is_low_end { "low-end" } else { "high-end" };
    let motion = match app.rain.phase() {
        MountPhase::Animated => "MOTION on",
        MountPhase::Still if caps.reduced_motion => "MOTION off",
        MountPhase::Still => "STATIC",
        MountPhase::Unmounted => "STOPPED",
    };
    match app.rain.render_loop() {
        Some(render_loop) => {
            let stats = render_loop.stats();
            format!(
                "{} | {} {}fps | cols {} | frames {}/{}",
                motion,
                profile,
                config.target_fps,
                render_loop.columns().len(),
                stats.accepted,
                stats.accepted + stats.skipped,
            )
        }
        None => format!("{} | {} {}fps", motion, profile, config.target_fps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rain::{Capabilities, LoopTuning};
    use ratatui::{backend::TestBackend, Terminal};

    fn app(reduced_motion: bool) -> App {
        let caps = Capabilities {
            is_low_end: false,
            reduced_motion,
        };
        App::new(caps, LoopTuning { seed: Some(3), ..LoopTuning::default() }, (30, 10), (10, 20))
    }

    #[test]
    fn test_status_line() {
        let app = app(true);
        assert_eq!(status_line(&app), "MOTION off | high-end 30fps");
        let app = self::app(false);
        assert!(status_line(&app).starts_with("MOTION on | high-end 30fps | cols 21"));
    }

    #[test]
    fn test_draws_without_panicking_on_tiny_terminals() {
        for (w, h) in [(30, 10), (5, 1)] {
            let mut app = app(false);
            app.on_tick();
            let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
            terminal.draw(|f| ui(f, &app)).unwrap();
        }
    }
}
