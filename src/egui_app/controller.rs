//! Maintains app state and bridges the loop core to the egui UI.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rfd::FileDialog;
use tracing::{info, warn};

use crate::config::{self, AppConfig};
use crate::egui_app::state::{StatusTone, UiState};
use crate::looper::LoopController;
use crate::player::{HostedPlayer, LocalPlayer, SourceBinding, SourceKind, extract_video_id};
use crate::window::{RepeatBudget, SliderHandle, WindowStore, format_mmss, parse_seconds};

/// File extensions offered by the local-file picker.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "webm", "mov", "mp3", "wav", "flac", "ogg", "m4a",
];

/// Application controller: source selection, loop control, status reporting.
pub struct AppController {
    /// UI model consumed by the renderer.
    pub ui: UiState,
    store: WindowStore,
    looper: LoopController,
    source: Option<SourceBinding>,
    ready_announced: bool,
    config: AppConfig,
}

impl AppController {
    /// Create a controller from the persisted configuration.
    pub fn new() -> Result<Self, String> {
        let config =
            config::load_or_default().map_err(|err| format!("Failed to load config: {err}"))?;
        let store = WindowStore::new(config.default_window_end);
        let looper = LoopController::new(Duration::from_millis(config.poll_interval_ms.max(1)));
        let mut controller = Self {
            ui: UiState::default(),
            store,
            looper,
            source: None,
            ready_announced: false,
            config,
        };
        controller.refresh_time_inputs();
        Ok(controller)
    }

    /// Loop poll cadence, for repaint scheduling.
    pub fn poll_interval(&self) -> Duration {
        self.looper.poll_interval()
    }

    /// Read access to the window/budget store.
    pub fn store(&self) -> &WindowStore {
        &self.store
    }

    /// True while a loop session is running.
    pub fn is_looping(&self) -> bool {
        self.looper.is_looping()
    }

    /// Kind of the active source, if any.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.source.as_ref().map(SourceBinding::kind)
    }

    /// Display label of the active source, if any.
    pub fn source_label(&self) -> Option<&str> {
        self.source.as_ref().map(SourceBinding::label)
    }

    /// True once the active source can be looped.
    pub fn source_ready(&self) -> bool {
        self.source
            .as_ref()
            .map(|source| source.adapter().is_ready())
            .unwrap_or(false)
    }

    /// Set the footer status.
    pub fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.ui.status.text = text.into();
        self.ui.status.tone = tone;
    }

    /// Advance everything that runs off the frame loop: backend events,
    /// readiness transitions, and the loop poll.
    pub fn tick(&mut self, now: Instant) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        if let Some(error) = source.adapter_mut().pump() {
            warn!(%error, "Source backend failed");
            self.looper.cancel();
            self.set_status(error.to_string(), StatusTone::Error);
            return;
        }
        if !self.ready_announced && source.adapter().is_ready() {
            self.announce_ready();
            return;
        }

        let was_looping = self.looper.is_looping();
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let crossed = self
            .looper
            .tick(&mut self.store, source.adapter_mut(), now);
        if crossed && was_looping && !self.looper.is_looping() {
            self.set_status("Loop finished", StatusTone::Idle);
        }
    }

    fn announce_ready(&mut self) {
        let Some(source) = self.source.as_ref() else {
            return;
        };
        let Some(duration) = source.adapter().duration() else {
            return;
        };
        let label = source.label().to_string();
        let kind = source.kind();
        self.store.set_duration(duration);
        self.ready_announced = true;
        self.refresh_time_inputs();
        info!(%label, %kind, duration, "Source ready");
        self.set_status(
            format!("{label} ready ({})", format_mmss(duration)),
            StatusTone::Active,
        );
    }

    /// Replace the active source, cancelling any running loop first.
    fn bind_source(&mut self, binding: SourceBinding) {
        self.looper.cancel();
        self.ready_announced = false;
        self.store.clear_duration();
        self.source = Some(binding);
    }

    /// Load the URL currently sitting in the input field as a hosted video.
    pub fn load_hosted_source(&mut self) {
        let url = self.ui.url_input.trim().to_string();
        if url.is_empty() {
            self.set_status("Enter a YouTube URL first", StatusTone::Error);
            return;
        }
        let Some(video_id) = extract_video_id(&url) else {
            self.set_status(
                "Not a recognizable YouTube URL (watch?v=… or youtu.be/…)",
                StatusTone::Error,
            );
            return;
        };
        match HostedPlayer::connect(&video_id, &self.config.widget_host) {
            Ok(player) => {
                self.bind_source(SourceBinding::new(
                    SourceKind::HostedVideo,
                    video_id.clone(),
                    Box::new(player),
                ));
                self.set_status(
                    format!("Connecting widget host for {video_id}…"),
                    StatusTone::Busy,
                );
            }
            Err(error) => self.set_status(error.to_string(), StatusTone::Error),
        }
    }

    /// Open the file picker and load the chosen media file.
    pub fn browse_local_source(&mut self) {
        let picked = FileDialog::new()
            .add_filter("media", MEDIA_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            self.load_local_source(path);
        }
    }

    /// Load a media file from disk as the active source.
    pub fn load_local_source(&mut self, path: PathBuf) {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match LocalPlayer::load(&path, self.config.volume) {
            Ok(player) => {
                self.bind_source(SourceBinding::new(
                    SourceKind::LocalFile,
                    label.clone(),
                    Box::new(player),
                ));
                self.set_status(format!("Loading {label}…"), StatusTone::Busy);
            }
            Err(error) => self.set_status(error.to_string(), StatusTone::Error),
        }
    }

    /// Start looping the current window.
    pub fn start_loop(&mut self) {
        let Some(source) = self.source.as_mut() else {
            self.set_status("Load a source first", StatusTone::Error);
            return;
        };
        match self
            .looper
            .start(&self.store, source.adapter_mut(), Instant::now())
        {
            Ok(()) => {
                let window = self.store.window();
                let budget = self.store.budget();
                self.set_status(
                    format!(
                        "Looping {} – {} ({budget}×)",
                        format_mmss(window.start()),
                        format_mmss(window.end())
                    ),
                    StatusTone::Active,
                );
            }
            Err(error) => self.set_status(error.to_string(), StatusTone::Error),
        }
    }

    /// Stop looping and restore the default settings.
    pub fn reset(&mut self) {
        match self.source.as_mut() {
            Some(source) => self.looper.reset(&mut self.store, source.adapter_mut()),
            None => {
                self.looper.cancel();
                self.store.reset();
            }
        }
        self.refresh_time_inputs();
        self.set_status("Settings reset", StatusTone::Idle);
    }

    /// Replace the repeat budget from the UI selector.
    pub fn set_budget(&mut self, budget: RepeatBudget) {
        self.store.set_budget(budget);
    }

    /// Apply a slider movement to the bound named by the moved handle.
    pub fn apply_slider(&mut self, handle: SliderHandle, value: f32) {
        self.store.apply_slider(handle, value);
        self.refresh_time_inputs();
    }

    /// Commit the start-time text field (plain seconds only).
    pub fn commit_start_text(&mut self) {
        if let Some(seconds) = parse_seconds(&self.ui.start_input) {
            self.store.set_start(seconds);
        }
        self.refresh_time_inputs();
    }

    /// Commit the end-time text field (plain seconds only).
    pub fn commit_end_text(&mut self) {
        if let Some(seconds) = parse_seconds(&self.ui.end_input) {
            self.store.set_end(seconds);
        }
        self.refresh_time_inputs();
    }

    /// Sync the time text fields with the store (`m:ss` display).
    pub fn refresh_time_inputs(&mut self) {
        let window = self.store.window();
        self.ui.start_input = format_mmss(window.start());
        self.ui.end_input = format_mmss(window.end());
    }
}
