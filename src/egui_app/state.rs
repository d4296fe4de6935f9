//! Shared state types for the egui UI.

use egui::Color32;

/// Tone of the current status message, mapped to the badge color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    /// Nothing in flight.
    Idle,
    /// A source is loading or connecting.
    Busy,
    /// The source is ready or a loop is running.
    Active,
    /// Something went wrong; the message says what.
    Error,
}

impl StatusTone {
    /// Badge color for the status footer.
    pub fn color(self) -> Color32 {
        match self {
            StatusTone::Idle => Color32::from_rgb(110, 110, 110),
            StatusTone::Busy => Color32::from_rgb(222, 177, 66),
            StatusTone::Active => Color32::from_rgb(96, 196, 112),
            StatusTone::Error => Color32::from_rgb(221, 84, 84),
        }
    }
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    /// Main status message text.
    pub text: String,
    /// Tone driving the badge color.
    pub tone: StatusTone,
}

impl StatusBarState {
    /// Default status shown before any source is selected.
    pub fn idle() -> Self {
        Self {
            text: "Load a YouTube URL or pick a local file to get started".into(),
            tone: StatusTone::Idle,
        }
    }
}

/// Top-level UI model consumed by the egui renderer.
#[derive(Clone, Debug)]
pub struct UiState {
    /// Footer status.
    pub status: StatusBarState,
    /// URL text field contents.
    pub url_input: String,
    /// Start-time text field contents (displays `m:ss`, accepts seconds).
    pub start_input: String,
    /// End-time text field contents (displays `m:ss`, accepts seconds).
    pub end_input: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: StatusBarState::idle(),
            url_input: String::new(),
            start_input: String::new(),
            end_input: String::new(),
        }
    }
}
