//! Playback window and repeat budget state shared between the UI widgets and
//! the loop controller.
//!
//! The store is the single source of truth for the loop bounds. Every writer
//! (slider, text inputs, loop controller) goes through the clamping setters,
//! so `0 <= start <= end <= duration` holds at all times.

use std::fmt;

/// The `[start, end]` timestamp range to loop, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackWindow {
    start_seconds: f32,
    end_seconds: f32,
}

impl PlaybackWindow {
    /// Create a window, forcing `start >= 0` and `end >= start`.
    pub fn new(start_seconds: f32, end_seconds: f32) -> Self {
        let start = start_seconds.max(0.0);
        Self {
            start_seconds: start,
            end_seconds: end_seconds.max(start),
        }
    }

    /// Start bound in seconds.
    pub fn start(&self) -> f32 {
        self.start_seconds
    }

    /// End bound in seconds.
    pub fn end(&self) -> f32 {
        self.end_seconds
    }

    /// True when the window covers a playable, non-zero span.
    pub fn has_extent(&self) -> bool {
        self.end_seconds > self.start_seconds
    }
}

/// Remaining loop count, finite or unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatBudget {
    /// Loop forever until the user resets.
    Unbounded,
    /// Loop this many more times. Never goes negative.
    Finite(u32),
}

/// What a boundary crossing did to the budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BudgetOutcome {
    /// Keep looping; seek back to the window start.
    Continue,
    /// The budget is spent; playback must stop.
    Exhausted,
}

impl RepeatBudget {
    /// Consume one boundary crossing.
    ///
    /// A finite budget decrements (saturating at zero) and reports
    /// `Exhausted` once it reaches zero, so a budget that is already zero
    /// stops at the first crossing instead of counting below zero.
    pub fn consume(&mut self) -> BudgetOutcome {
        match self {
            RepeatBudget::Unbounded => BudgetOutcome::Continue,
            RepeatBudget::Finite(remaining) => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    BudgetOutcome::Exhausted
                } else {
                    BudgetOutcome::Continue
                }
            }
        }
    }
}

impl fmt::Display for RepeatBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatBudget::Unbounded => write!(f, "∞"),
            RepeatBudget::Finite(count) => write!(f, "{count}"),
        }
    }
}

/// Which handle of the range slider moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliderHandle {
    /// The left handle, bound to the window start.
    Start,
    /// The right handle, bound to the window end.
    End,
}

/// Shared store for the loop bounds, the repeat budget and the known
/// source duration.
#[derive(Clone, Debug)]
pub struct WindowStore {
    window: PlaybackWindow,
    budget: RepeatBudget,
    duration: Option<f32>,
    default_end: f32,
}

impl WindowStore {
    /// Create a store with the default window `{0, default_end}` and an
    /// unbounded budget.
    pub fn new(default_end: f32) -> Self {
        let default_end = default_end.max(0.0);
        Self {
            window: PlaybackWindow::new(0.0, default_end),
            budget: RepeatBudget::Unbounded,
            duration: None,
            default_end,
        }
    }

    /// Current playback window.
    pub fn window(&self) -> PlaybackWindow {
        self.window
    }

    /// Current repeat budget.
    pub fn budget(&self) -> RepeatBudget {
        self.budget
    }

    /// Replace the repeat budget.
    pub fn set_budget(&mut self, budget: RepeatBudget) {
        self.budget = budget;
    }

    /// Consume one boundary crossing from the live budget.
    ///
    /// Read-modify-write on the stored value, so mid-loop edits from the UI
    /// are honored and every decrement is observable there.
    pub fn consume_budget(&mut self) -> BudgetOutcome {
        let mut budget = self.budget;
        let outcome = budget.consume();
        self.budget = budget;
        outcome
    }

    /// Source duration, once known.
    pub fn duration(&self) -> Option<f32> {
        self.duration
    }

    /// Record the source duration and re-clamp the window against it.
    pub fn set_duration(&mut self, duration: f32) {
        let duration = duration.max(0.0);
        self.duration = Some(duration);
        let end = self.window.end().min(duration);
        let start = self.window.start().min(end);
        self.window = PlaybackWindow::new(start, end);
    }

    /// Forget the duration, e.g. when the active source is replaced.
    ///
    /// The bounds keep their values and re-clamp once the new source
    /// reports its duration.
    pub fn clear_duration(&mut self) {
        self.duration = None;
    }

    /// Write the start bound, clamped into `[0, end]`.
    ///
    /// Out-of-order input is clamped against the opposite bound rather than
    /// rejected, so the caller never observes a refused edit.
    pub fn set_start(&mut self, seconds: f32) {
        if !seconds.is_finite() {
            return;
        }
        let start = seconds.clamp(0.0, self.window.end());
        self.window = PlaybackWindow::new(start, self.window.end());
    }

    /// Write the end bound, clamped into `[start, duration]`.
    pub fn set_end(&mut self, seconds: f32) {
        if !seconds.is_finite() {
            return;
        }
        let upper = self.duration.unwrap_or(f32::INFINITY);
        let end = seconds.clamp(self.window.start(), upper);
        self.window = PlaybackWindow::new(self.window.start(), end);
    }

    /// Apply a slider update to the bound named by the moved handle; the
    /// other bound stays unchanged.
    pub fn apply_slider(&mut self, handle: SliderHandle, value: f32) {
        match handle {
            SliderHandle::Start => self.set_start(value),
            SliderHandle::End => self.set_end(value),
        }
    }

    /// Restore the default window and an unbounded budget.
    ///
    /// The known duration is kept; the default end bound is clamped to it.
    pub fn reset(&mut self) {
        let end = match self.duration {
            Some(duration) => self.default_end.min(duration),
            None => self.default_end,
        };
        self.window = PlaybackWindow::new(0.0, end);
        self.budget = RepeatBudget::Unbounded;
    }
}

/// Render seconds as `minutes:seconds`, seconds zero-padded to two digits.
pub fn format_mmss(seconds: f32) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Parse free-text input as a plain seconds value.
///
/// Only a bare non-negative number is accepted; the `m:ss` display format
/// does not round-trip. That asymmetry matches the shipped behavior and is
/// kept on purpose.
pub fn parse_seconds(text: &str) -> Option<f32> {
    let value: f32 = text.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
