//! Local file backend: decodes the picked media file and plays it through
//! the default audio output.
//!
//! The whole file is held in memory so seeks can rebuild the decoder without
//! touching the disk again. Position is tracked against a wall-clock anchor
//! while the sink is running.

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

use crate::player::{PlayerAdapter, PlayerError};

/// Adapter for media files picked from disk.
pub struct LocalPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    path: PathBuf,
    bytes: Vec<u8>,
    duration: f32,
    volume: f32,
    /// Position in seconds at the last play/pause/seek.
    position_base: f32,
    /// Wall-clock anchor; `Some` while the sink is running.
    started_at: Option<Instant>,
    pending_error: Option<PlayerError>,
}

impl LocalPlayer {
    /// Read and probe a media file.
    ///
    /// Metadata is resolved synchronously, so a successfully loaded local
    /// adapter is ready immediately; unreadable or undecodable files fail
    /// here with an explicit error instead of leaving an inert adapter.
    pub fn load(path: &Path, volume: f32) -> Result<Self, PlayerError> {
        let bytes = fs::read(path).map_err(|source| PlayerError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let probe = Decoder::new(Cursor::new(bytes.clone())).map_err(|error| {
            PlayerError::UndecodableMedia {
                path: path.to_path_buf(),
                reason: error.to_string(),
            }
        })?;
        let duration = probe
            .total_duration()
            .ok_or_else(|| PlayerError::UnknownDuration {
                path: path.to_path_buf(),
            })?
            .as_secs_f32();
        let (stream, handle) = OutputStream::try_default()
            .map_err(|error| PlayerError::AudioOutput(error.to_string()))?;
        debug!(path = %path.display(), duration, "Loaded local media");
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
            path: path.to_path_buf(),
            bytes,
            duration,
            volume: volume.clamp(0.0, 1.0),
            position_base: 0.0,
            started_at: None,
            pending_error: None,
        })
    }

    fn start_sink_at(&mut self, seconds: f32) -> Result<(), PlayerError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let mut source =
            Decoder::new(Cursor::new(self.bytes.clone())).map_err(|error| {
                PlayerError::UndecodableMedia {
                    path: self.path.clone(),
                    reason: error.to_string(),
                }
            })?;
        let offset = Duration::from_secs_f32(seconds.max(0.0));
        if source.try_seek(offset).is_err() {
            // Some decoders cannot seek; fall back to skipping samples.
            let sink = Sink::try_new(&self.handle)
                .map_err(|error| PlayerError::AudioOutput(error.to_string()))?;
            sink.set_volume(self.volume);
            sink.append(source.skip_duration(offset));
            self.sink = Some(sink);
            return Ok(());
        }
        let sink = Sink::try_new(&self.handle)
            .map_err(|error| PlayerError::AudioOutput(error.to_string()))?;
        sink.set_volume(self.volume);
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn live_position(&self) -> f32 {
        let elapsed = self
            .started_at
            .map(|anchor| anchor.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        (self.position_base + elapsed).min(self.duration)
    }
}

impl PlayerAdapter for LocalPlayer {
    fn pump(&mut self) -> Option<PlayerError> {
        // A sink that drained on its own means playback hit the end of file.
        if self.started_at.is_some()
            && self
                .sink
                .as_ref()
                .map(|sink| sink.empty())
                .unwrap_or(true)
        {
            self.position_base = self.duration;
            self.started_at = None;
            self.sink = None;
        }
        self.pending_error.take()
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn duration(&self) -> Option<f32> {
        Some(self.duration)
    }

    fn current_time(&self) -> f32 {
        self.live_position()
    }

    fn seek_to(&mut self, seconds: f32) {
        let target = seconds.clamp(0.0, self.duration);
        let was_playing = self.started_at.is_some();
        self.position_base = target;
        if was_playing {
            match self.start_sink_at(target) {
                Ok(()) => self.started_at = Some(Instant::now()),
                Err(error) => {
                    self.started_at = None;
                    self.pending_error = Some(error);
                }
            }
        } else if let Some(sink) = self.sink.take() {
            // Paused sink is stale after a seek; the next play() rebuilds.
            sink.stop();
        }
    }

    fn play(&mut self) {
        if self.started_at.is_some() {
            return;
        }
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
            self.started_at = Some(Instant::now());
            return;
        }
        let target = if self.position_base >= self.duration {
            0.0
        } else {
            self.position_base
        };
        self.position_base = target;
        match self.start_sink_at(target) {
            Ok(()) => self.started_at = Some(Instant::now()),
            Err(error) => self.pending_error = Some(error),
        }
    }

    fn pause(&mut self) {
        if self.started_at.is_none() {
            return;
        }
        self.position_base = self.live_position();
        self.started_at = None;
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }
}
