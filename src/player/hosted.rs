//! Hosted video backend: drives an external "widget host" player process
//! (mpv) over its JSON IPC socket.
//!
//! The adapter owns the whole lifecycle: it spawns the host with a
//! per-instance socket endpoint, retries the connect with a bounded backoff,
//! subscribes to position/duration/pause updates, and surfaces failures as
//! events instead of dying silently. Nothing here is process-global, so
//! several adapters can coexist and tests can exercise the protocol parsing
//! directly.

use std::{
    io::{BufRead, BufReader, Read, Write},
    process::{Child, Command, Stdio},
    sync::{
        LazyLock,
        atomic::{AtomicU32, Ordering},
        mpsc::{Receiver, Sender, channel},
    },
    thread,
    time::Duration,
};

use regex::Regex;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::WidgetHostConfig;
use crate::player::{PlayerAdapter, PlayerError};

static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([A-Za-z0-9_-]{11})|youtu\.be/([A-Za-z0-9_-]{11})",
    )
    .expect("video id pattern is valid")
});

static ENDPOINT_NONCE: AtomicU32 = AtomicU32::new(0);

/// Pull the 11-character video id out of a `watch?v=` or `youtu.be` URL.
///
/// Any other string yields `None`; the caller decides how to report that.
pub fn extract_video_id(url: &str) -> Option<String> {
    let captures = VIDEO_ID_PATTERN.captures(url)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|id| id.as_str().to_string())
}

/// Canonical watch URL handed to the widget host.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Per-instance IPC endpoint so multiple adapters never collide.
fn ipc_endpoint() -> String {
    let pid = std::process::id();
    let nonce = ENDPOINT_NONCE.fetch_add(1, Ordering::Relaxed);
    if cfg!(windows) {
        format!(r"\\.\pipe\ritornello-widget-{pid}-{nonce}")
    } else {
        std::env::temp_dir()
            .join(format!("ritornello-widget-{pid}-{nonce}.sock"))
            .to_string_lossy()
            .into_owned()
    }
}

enum WidgetCommand {
    Send(Value),
    Shutdown,
}

enum WidgetEvent {
    Connected,
    Duration(f32),
    Time(f32),
    Paused(bool),
    Failed(PlayerError),
    Closed,
}

/// Adapter for YouTube-hosted videos rendered by the widget host process.
pub struct HostedPlayer {
    cmd_tx: Sender<WidgetCommand>,
    evt_rx: Receiver<WidgetEvent>,
    connected: bool,
    duration: Option<f32>,
    time: f32,
    paused: bool,
    dead: bool,
}

impl HostedPlayer {
    /// Spawn the widget host for a video id and begin the IPC handshake.
    ///
    /// Returns as soon as the process is launched; readiness arrives
    /// asynchronously through [`PlayerAdapter::pump`] once the host reports
    /// the video duration. The host starts paused so looping begins under
    /// controller control.
    pub fn connect(video_id: &str, config: &WidgetHostConfig) -> Result<Self, PlayerError> {
        let endpoint = ipc_endpoint();
        let child = Command::new(&config.command)
            .arg(format!("--input-ipc-server={endpoint}"))
            .arg("--pause")
            .arg("--keep-open=yes")
            .arg("--force-window=yes")
            .arg("--no-terminal")
            .args(&config.extra_args)
            .arg(watch_url(video_id))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlayerError::SpawnWidgetHost {
                command: config.command.clone(),
                source,
            })?;
        debug!(video_id, %endpoint, "Spawned widget host");

        let (cmd_tx, cmd_rx) = channel();
        let (evt_tx, evt_rx) = channel();
        let io_config = config.clone();
        thread::spawn(move || run_widget_io(child, endpoint, io_config, cmd_rx, evt_tx));

        Ok(Self {
            cmd_tx,
            evt_rx,
            connected: false,
            duration: None,
            time: 0.0,
            paused: true,
            dead: false,
        })
    }

    fn send(&self, command: Value) {
        let _ = self.cmd_tx.send(WidgetCommand::Send(command));
    }
}

impl PlayerAdapter for HostedPlayer {
    fn pump(&mut self) -> Option<PlayerError> {
        let mut failure = None;
        while let Ok(event) = self.evt_rx.try_recv() {
            match event {
                WidgetEvent::Connected => self.connected = true,
                WidgetEvent::Duration(duration) => self.duration = Some(duration),
                WidgetEvent::Time(time) => self.time = time,
                WidgetEvent::Paused(paused) => self.paused = paused,
                WidgetEvent::Failed(error) => {
                    self.dead = true;
                    failure.get_or_insert(error);
                }
                WidgetEvent::Closed => {
                    if !self.dead {
                        self.dead = true;
                        failure.get_or_insert(PlayerError::Disconnected);
                    }
                }
            }
        }
        failure
    }

    fn is_ready(&self) -> bool {
        !self.dead && self.connected && self.duration.is_some()
    }

    fn duration(&self) -> Option<f32> {
        self.duration
    }

    fn current_time(&self) -> f32 {
        self.time
    }

    fn seek_to(&mut self, seconds: f32) {
        let upper = self.duration.unwrap_or(f32::INFINITY);
        let target = seconds.clamp(0.0, upper);
        // Record the target immediately; the observed time-pos catches up a
        // poll or two later and must not re-trigger the old position.
        self.time = target;
        self.send(json!({ "command": ["seek", target, "absolute"] }));
    }

    fn play(&mut self) {
        self.paused = false;
        self.send(json!({ "command": ["set_property", "pause", false] }));
    }

    fn pause(&mut self) {
        self.paused = true;
        self.send(json!({ "command": ["set_property", "pause", true] }));
    }

    fn is_playing(&self) -> bool {
        self.connected && !self.dead && !self.paused
    }
}

impl Drop for HostedPlayer {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WidgetCommand::Shutdown);
    }
}

/// Writer half of the IPC session; owns the child process.
///
/// Connects with a bounded retry, hands the read half to its own thread,
/// then forwards queued commands until shutdown or a write failure. The
/// child is killed and reaped on the way out.
fn run_widget_io(
    mut child: Child,
    endpoint: String,
    config: WidgetHostConfig,
    cmd_rx: Receiver<WidgetCommand>,
    evt_tx: Sender<WidgetEvent>,
) {
    let interval = Duration::from_millis(config.connect_interval_ms.max(1));
    let mut streams = None;
    for _ in 0..config.connect_attempts.max(1) {
        thread::sleep(interval);
        match open_ipc(&endpoint) {
            Ok(pair) => {
                streams = Some(pair);
                break;
            }
            Err(_) => {
                if let Ok(Some(status)) = child.try_wait() {
                    warn!(%status, "Widget host exited before IPC came up");
                    let _ = evt_tx.send(WidgetEvent::Failed(PlayerError::HostExited(
                        status.to_string(),
                    )));
                    return;
                }
            }
        }
    }
    let Some((reader, mut writer)) = streams else {
        let _ = evt_tx.send(WidgetEvent::Failed(PlayerError::ConnectTimeout {
            attempts: config.connect_attempts,
        }));
        let _ = child.kill();
        let _ = child.wait();
        return;
    };

    let subscriptions = [
        json!({ "command": ["observe_property", 1, "time-pos"] }),
        json!({ "command": ["observe_property", 2, "duration"] }),
        json!({ "command": ["observe_property", 3, "pause"] }),
    ];
    for command in subscriptions {
        if write_line(&mut writer, &command).is_err() {
            let _ = evt_tx.send(WidgetEvent::Closed);
            let _ = child.kill();
            let _ = child.wait();
            return;
        }
    }
    let _ = evt_tx.send(WidgetEvent::Connected);

    let reader_events = evt_tx.clone();
    thread::spawn(move || {
        let mut lines = BufReader::new(reader).lines();
        while let Some(Ok(line)) = lines.next() {
            if let Some(event) = parse_event(&line) {
                if reader_events.send(event).is_err() {
                    return;
                }
            }
        }
        let _ = reader_events.send(WidgetEvent::Closed);
    });

    loop {
        match cmd_rx.recv() {
            Ok(WidgetCommand::Send(command)) => {
                if write_line(&mut writer, &command).is_err() {
                    let _ = evt_tx.send(WidgetEvent::Closed);
                    break;
                }
            }
            Ok(WidgetCommand::Shutdown) | Err(_) => {
                let _ = write_line(&mut writer, &json!({ "command": ["quit"] }));
                break;
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn write_line(writer: &mut impl Write, command: &Value) -> std::io::Result<()> {
    writer.write_all(command.to_string().as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Translate one IPC line into an adapter event, ignoring chatter we did not
/// subscribe to (request acks, idle notifications, ...).
fn parse_event(line: &str) -> Option<WidgetEvent> {
    let message: Value = serde_json::from_str(line).ok()?;
    match message.get("event").and_then(Value::as_str)? {
        "property-change" => {
            let name = message.get("name").and_then(Value::as_str)?;
            let data = message.get("data")?;
            match name {
                "time-pos" => data.as_f64().map(|t| WidgetEvent::Time(t as f32)),
                "duration" => data
                    .as_f64()
                    .filter(|d| *d > 0.0)
                    .map(|d| WidgetEvent::Duration(d as f32)),
                "pause" => data.as_bool().map(WidgetEvent::Paused),
                _ => None,
            }
        }
        "end-file" => {
            let reason = message.get("reason").and_then(Value::as_str).unwrap_or("");
            (reason == "error").then(|| {
                WidgetEvent::Failed(PlayerError::WidgetHost(
                    "playback ended with an error".into(),
                ))
            })
        }
        _ => None,
    }
}

#[cfg(unix)]
fn open_ipc(endpoint: &str) -> std::io::Result<(Box<dyn Read + Send>, Box<dyn Write + Send>)> {
    use std::os::unix::net::UnixStream;
    let stream = UnixStream::connect(endpoint)?;
    let reader = stream.try_clone()?;
    Ok((Box::new(reader), Box::new(stream)))
}

#[cfg(windows)]
fn open_ipc(endpoint: &str) -> std::io::Result<(Box<dyn Read + Send>, Box<dyn Write + Send>)> {
    use std::fs::OpenOptions;
    let pipe = OpenOptions::new().read(true).write(true).open(endpoint)?;
    let reader = pipe.try_clone()?;
    Ok((Box::new(reader), Box::new(pipe)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_watch_urls() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(id.as_deref(), Some("dQw4w9WgXcQ"));
        let id = extract_video_id("youtube.com/watch?v=abcDEF12345");
        assert_eq!(id.as_deref(), Some("abcDEF12345"));
    }

    #[test]
    fn extracts_id_from_short_urls() {
        let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn rejects_other_strings() {
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
    }

    #[test]
    fn watch_url_is_canonical() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn endpoints_are_unique_per_instance() {
        assert_ne!(ipc_endpoint(), ipc_endpoint());
    }

    #[test]
    fn parses_time_and_duration_properties() {
        let time = parse_event(r#"{"event":"property-change","id":1,"name":"time-pos","data":12.5}"#);
        assert!(matches!(time, Some(WidgetEvent::Time(t)) if (t - 12.5).abs() < f32::EPSILON));

        let duration =
            parse_event(r#"{"event":"property-change","id":2,"name":"duration","data":213.0}"#);
        assert!(matches!(duration, Some(WidgetEvent::Duration(d)) if (d - 213.0).abs() < f32::EPSILON));

        let paused = parse_event(r#"{"event":"property-change","id":3,"name":"pause","data":true}"#);
        assert!(matches!(paused, Some(WidgetEvent::Paused(true))));
    }

    #[test]
    fn ignores_null_properties_and_acks() {
        assert!(parse_event(r#"{"event":"property-change","id":1,"name":"time-pos","data":null}"#).is_none());
        assert!(parse_event(r#"{"error":"success","request_id":1}"#).is_none());
        assert!(parse_event("not json").is_none());
    }

    #[test]
    fn end_file_error_becomes_failure() {
        let event = parse_event(r#"{"event":"end-file","reason":"error"}"#);
        assert!(matches!(event, Some(WidgetEvent::Failed(_))));
        assert!(parse_event(r#"{"event":"end-file","reason":"eof"}"#).is_none());
    }
}
