pub mod navigation;

use crate::app::App;
use crossterm::event::{KeyEvent, KeyEventKind};

/// Main input handler dispatcher
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    // Some terminals report releases too; act on presses only.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if navigation::handle_global_shortcuts(key, app) {
        return;
    }

    navigation::handle_display_keys(key, app);
}
