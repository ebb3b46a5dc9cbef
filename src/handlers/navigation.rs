use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle global shortcuts that work in every phase
pub fn handle_global_shortcuts(key: KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
            true
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
            true
        }
        _ => false,
    }
}

/// Keys that change what is shown
pub fn handle_display_keys(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('m') => app.toggle_reduced_motion(),
        KeyCode::Char('h') => app.ui.toggle_footer(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rain::{Capabilities, LoopTuning};

    fn app() -> App {
        let caps = Capabilities {
            is_low_end: true,
            reduced_motion: false,
        };
        App::new(caps, LoopTuning::default(), (20, 10), (10, 20))
    }

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = app();
            assert!(handle_global_shortcuts(KeyEvent::new(code, KeyModifiers::NONE), &mut app));
            assert!(app.ui.should_quit);
        }
        let mut app = app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(handle_global_shortcuts(ctrl_c, &mut app));
        assert!(app.ui.should_quit);
    }

    #[test]
    fn test_footer_toggle() {
        let mut app = app();
        let h = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE);
        assert!(!handle_global_shortcuts(h, &mut app));
        handle_display_keys(h, &mut app);
        assert!(!app.ui.show_footer);
    }
}
