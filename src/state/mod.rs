pub mod ui;

pub use ui::UiState;

use thiserror::Error;

/// Configuration constants for the application
pub struct AppConfig {
    /// Native refresh cadence of the host; the rain loop gates its own rate below this.
    pub refresh_interval_ms: u64,
    /// Font cell size in pixels when the terminal can't be queried.
    pub default_font_size: (u16, u16),
    pub footer_height: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 16,
            default_font_size: (10, 20),
            footer_height: 3,
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Preferences error: {0}")]
    Prefs(#[from] serde_json::Error),
    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),
}

pub type AppResult<T> = Result<T, AppError>;
