//! Dual-handle range slider bound to `[0, max]` with a fixed step.
//!
//! Reports which handle moved so the caller can write exactly one bound of
//! the playback window; the other bound is left alone.

use egui::{Color32, Pos2, Sense, Stroke, Ui, Vec2};

use crate::window::SliderHandle;

const TRACK_HEIGHT: f32 = 4.0;
const HANDLE_RADIUS: f32 = 7.0;

/// Draw the slider and return `(handle, value)` when a handle was dragged to
/// a new stepped value.
pub fn range_slider(
    ui: &mut Ui,
    start: f32,
    end: f32,
    max: f32,
    step: f32,
    enabled: bool,
) -> Option<(SliderHandle, f32)> {
    let desired = Vec2::new(ui.available_width(), HANDLE_RADIUS * 2.0 + 10.0);
    let sense = if enabled {
        Sense::click_and_drag()
    } else {
        Sense::hover()
    };
    let (rect, response) = ui.allocate_exact_size(desired, sense);
    if !ui.is_rect_visible(rect) {
        return None;
    }

    let x_min = rect.left() + HANDLE_RADIUS;
    let x_max = rect.right() - HANDLE_RADIUS;
    let center_y = rect.center().y;
    let span = max.max(step);
    let to_x = |value: f32| egui::remap_clamp(value, 0.0..=span, x_min..=x_max);
    let start_x = to_x(start);
    let end_x = to_x(end);

    let painter = ui.painter();
    let track_color = Color32::from_rgb(48, 48, 48);
    let (fill_color, handle_color) = if enabled {
        (Color32::from_rgb(66, 133, 196), Color32::from_rgb(230, 230, 230))
    } else {
        (Color32::from_rgb(70, 70, 70), Color32::from_rgb(120, 120, 120))
    };
    painter.line_segment(
        [Pos2::new(x_min, center_y), Pos2::new(x_max, center_y)],
        Stroke::new(TRACK_HEIGHT, track_color),
    );
    painter.line_segment(
        [Pos2::new(start_x, center_y), Pos2::new(end_x, center_y)],
        Stroke::new(TRACK_HEIGHT, fill_color),
    );
    for x in [start_x, end_x] {
        painter.circle_filled(Pos2::new(x, center_y), HANDLE_RADIUS, handle_color);
        painter.circle_stroke(
            Pos2::new(x, center_y),
            HANDLE_RADIUS,
            Stroke::new(1.0, Color32::from_rgb(20, 20, 20)),
        );
    }

    if !enabled {
        return None;
    }

    let id = response.id;
    if response.drag_started() {
        if let Some(pointer) = response.interact_pointer_pos() {
            let handle = nearest_handle(pointer.x, start_x, end_x);
            ui.memory_mut(|memory| memory.data.insert_temp(id, handle));
        }
    }
    if response.drag_stopped() {
        ui.memory_mut(|memory| memory.data.remove::<SliderHandle>(id));
        return None;
    }
    if !response.dragged() {
        return None;
    }
    let active: Option<SliderHandle> = ui.memory(|memory| memory.data.get_temp(id));
    let (handle, pointer) = match (active, response.interact_pointer_pos()) {
        (Some(handle), Some(pointer)) => (handle, pointer),
        _ => return None,
    };

    let raw = egui::remap_clamp(pointer.x, x_min..=x_max, 0.0..=span);
    let stepped = (raw / step).round() * step;
    let current = match handle {
        SliderHandle::Start => start,
        SliderHandle::End => end,
    };
    (stepped != current).then_some((handle, stepped))
}

/// Pick the handle closest to the pointer; on a tie the pointer side wins,
/// so overlapping handles can still be pulled apart.
fn nearest_handle(pointer_x: f32, start_x: f32, end_x: f32) -> SliderHandle {
    let to_start = (pointer_x - start_x).abs();
    let to_end = (pointer_x - end_x).abs();
    if to_start < to_end {
        SliderHandle::Start
    } else if to_end < to_start {
        SliderHandle::End
    } else if pointer_x < start_x {
        SliderHandle::Start
    } else {
        SliderHandle::End
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_handle_prefers_the_closer_one() {
        assert_eq!(nearest_handle(10.0, 8.0, 50.0), SliderHandle::Start);
        assert_eq!(nearest_handle(48.0, 8.0, 50.0), SliderHandle::End);
    }

    #[test]
    fn overlapping_handles_split_by_pointer_side() {
        assert_eq!(nearest_handle(10.0, 30.0, 30.0), SliderHandle::Start);
        assert_eq!(nearest_handle(45.0, 30.0, 30.0), SliderHandle::End);
    }
}
