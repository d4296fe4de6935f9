mod support;

use std::time::Instant;

use support::env::ConfigHomeGuard;
use tempfile::TempDir;

use ritornello::egui_app::controller::AppController;
use ritornello::egui_app::state::StatusTone;
use ritornello::window::{RepeatBudget, SliderHandle};

struct ControllerHarness {
    _config: ConfigHomeGuard,
    _temp: TempDir,
    controller: AppController,
}

impl ControllerHarness {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("create tempdir");
        let guard = ConfigHomeGuard::set(temp.path().join("config"));
        let controller = AppController::new().expect("create controller");
        Self {
            _config: guard,
            _temp: temp,
            controller,
        }
    }
}

#[test]
fn fresh_controller_shows_default_window_inputs() {
    let h = ControllerHarness::new();
    assert_eq!(h.controller.ui.start_input, "0:00");
    assert_eq!(h.controller.ui.end_input, "0:10");
    assert_eq!(h.controller.store().budget(), RepeatBudget::Unbounded);
    assert!(!h.controller.is_looping());
    assert_eq!(h.controller.ui.status.tone, StatusTone::Idle);
}

#[test]
fn committing_plain_seconds_updates_the_window() {
    let mut h = ControllerHarness::new();
    h.controller.ui.start_input = "3".into();
    h.controller.commit_start_text();
    assert_eq!(h.controller.store().window().start(), 3.0);
    // The field snaps back to the display format.
    assert_eq!(h.controller.ui.start_input, "0:03");
}

#[test]
fn committing_garbage_retains_the_previous_value() {
    let mut h = ControllerHarness::new();
    h.controller.ui.end_input = "1:05".into();
    h.controller.commit_end_text();
    assert_eq!(h.controller.store().window().end(), 10.0);
    assert_eq!(h.controller.ui.end_input, "0:10");
}

#[test]
fn slider_events_write_the_moved_handle_only() {
    let mut h = ControllerHarness::new();
    h.controller.apply_slider(SliderHandle::End, 8.0);
    assert_eq!(h.controller.store().window().end(), 8.0);
    assert_eq!(h.controller.store().window().start(), 0.0);
    assert_eq!(h.controller.ui.end_input, "0:08");
}

#[test]
fn start_without_a_source_reports_an_error() {
    let mut h = ControllerHarness::new();
    h.controller.start_loop();
    assert_eq!(h.controller.ui.status.tone, StatusTone::Error);
    assert!(!h.controller.is_looping());
}

#[test]
fn unrecognizable_url_reports_source_unavailable() {
    let mut h = ControllerHarness::new();
    h.controller.ui.url_input = "https://example.com/clip.mp4".into();
    h.controller.load_hosted_source();
    assert_eq!(h.controller.ui.status.tone, StatusTone::Error);
    assert!(h.controller.source_kind().is_none());
}

#[test]
fn reset_restores_defaults_and_inputs() {
    let mut h = ControllerHarness::new();
    h.controller.set_budget(RepeatBudget::Finite(4));
    h.controller.apply_slider(SliderHandle::End, 9.0);
    h.controller.reset();
    assert_eq!(h.controller.store().budget(), RepeatBudget::Unbounded);
    assert_eq!(h.controller.ui.start_input, "0:00");
    assert_eq!(h.controller.ui.end_input, "0:10");
}

#[test]
fn tick_without_a_source_is_inert() {
    let mut h = ControllerHarness::new();
    h.controller.tick(Instant::now());
    assert_eq!(h.controller.ui.status.tone, StatusTone::Idle);
}
