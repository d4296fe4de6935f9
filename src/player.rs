//! Player adapters: a uniform control surface over the two source backends.
//!
//! The loop controller and the UI only ever talk to [`PlayerAdapter`]; which
//! backend sits behind it is decided once, when the user picks a source.

use std::path::PathBuf;

use thiserror::Error;

pub mod hosted;
pub mod local;

pub use hosted::{HostedPlayer, extract_video_id};
pub use local::LocalPlayer;

/// Uniform capability surface over the playback backends.
///
/// `current_time` is only meaningful once `is_ready` reports true; callers
/// gate on readiness before issuing timed operations.
pub trait PlayerAdapter {
    /// Drain pending backend events.
    ///
    /// Returns an error the first time an asynchronous failure is observed
    /// (e.g. the widget host exited); afterwards the adapter stays inert.
    fn pump(&mut self) -> Option<PlayerError>;

    /// True once the source duration is known and commands are valid.
    fn is_ready(&self) -> bool;

    /// Source duration in seconds, available after readiness.
    fn duration(&self) -> Option<f32>;

    /// Current playback position in seconds.
    fn current_time(&self) -> f32;

    /// Move the playback head, clamping silently to `[0, duration]`.
    fn seek_to(&mut self, seconds: f32);

    /// Begin or resume playback. No-op while already playing.
    fn play(&mut self);

    /// Pause playback. No-op while already paused.
    fn pause(&mut self);

    /// True while the backend is actively advancing the position.
    fn is_playing(&self) -> bool;
}

/// Which backend variant a source binding wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A media file picked from disk, decoded and played locally.
    LocalFile,
    /// A YouTube-hosted video rendered by the external widget host.
    HostedVideo,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::LocalFile => write!(f, "local file"),
            SourceKind::HostedVideo => write!(f, "hosted video"),
        }
    }
}

/// The active source: its kind, a display label, and the live adapter.
///
/// Replaced wholesale when the user switches source; never merged.
pub struct SourceBinding {
    kind: SourceKind,
    label: String,
    adapter: Box<dyn PlayerAdapter>,
}

impl SourceBinding {
    /// Wrap an adapter for display and dispatch.
    pub fn new(kind: SourceKind, label: impl Into<String>, adapter: Box<dyn PlayerAdapter>) -> Self {
        Self {
            kind,
            label: label.into(),
            adapter,
        }
    }

    /// Which backend variant is active.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Short human-readable name (file name or video id).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Shared access to the adapter.
    pub fn adapter(&self) -> &dyn PlayerAdapter {
        self.adapter.as_ref()
    }

    /// Exclusive access to the adapter.
    pub fn adapter_mut(&mut self) -> &mut dyn PlayerAdapter {
        self.adapter.as_mut()
    }
}

/// Failures from either playback backend.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The local media file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The local media file could not be decoded at all.
    #[error("Cannot decode {path}: {reason}")]
    UndecodableMedia { path: PathBuf, reason: String },
    /// The decoder produced no duration, so timed looping is impossible.
    #[error("Cannot determine the duration of {path}")]
    UnknownDuration { path: PathBuf },
    /// The audio output device could not be opened.
    #[error("Audio output failed: {0}")]
    AudioOutput(String),
    /// The widget host executable could not be spawned.
    #[error("Failed to launch widget host `{command}`: {source}")]
    SpawnWidgetHost {
        command: String,
        source: std::io::Error,
    },
    /// The widget host never accepted an IPC connection.
    #[error("Widget host IPC did not come up after {attempts} attempts")]
    ConnectTimeout { attempts: u32 },
    /// The widget host process exited.
    #[error("Widget host exited: {0}")]
    HostExited(String),
    /// The IPC connection dropped after it had been established.
    #[error("Widget host connection lost")]
    Disconnected,
    /// The widget host reported a playback error.
    #[error("Widget host error: {0}")]
    WidgetHost(String),
}
