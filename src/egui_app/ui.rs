//! egui renderer for the application UI.

use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText, Sense, Vec2};

use crate::egui_app::controller::AppController;
use crate::window::{RepeatBudget, format_mmss};

pub mod range_slider;

use range_slider::range_slider;

/// Upper bound on how long the UI sleeps without input, so loop polls keep
/// firing even when the user walks away.
const MAX_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// Renders the egui UI using the shared controller state.
pub struct EguiApp {
    controller: AppController,
    visuals_set: bool,
}

impl EguiApp {
    /// Create the app, loading persisted configuration.
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            controller: AppController::new()?,
            visuals_set: false,
        })
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = Color32::from_rgb(12, 12, 12);
        visuals.panel_fill = Color32::from_rgb(16, 16, 16);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Ritornello").strong().color(Color32::WHITE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(Vec2::splat(14.0), Sense::hover());
                ui.painter()
                    .circle_filled(rect.center(), 5.0, self.controller.ui.status.tone.color());
                ui.label(self.controller.ui.status.text.clone());
            });
        });
    }

    fn render_source_section(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 110.0).max(120.0);
            ui.add(
                egui::TextEdit::singleline(&mut self.controller.ui.url_input)
                    .desired_width(width)
                    .hint_text("Enter YouTube URL"),
            );
            if ui.button("Load video").clicked() {
                self.controller.load_hosted_source();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Pick local file…").clicked() {
                self.controller.browse_local_source();
            }
            ui.label(self.source_summary());
        });
    }

    fn source_summary(&self) -> String {
        match (self.controller.source_kind(), self.controller.source_label()) {
            (Some(kind), Some(label)) => {
                let readiness = match self.controller.store().duration() {
                    Some(duration) if self.controller.source_ready() => {
                        format!("ready, {}", format_mmss(duration))
                    }
                    _ => "loading…".to_string(),
                };
                format!("{kind}: {label} ({readiness})")
            }
            _ => "No source loaded".to_string(),
        }
    }

    fn render_window_section(&mut self, ui: &mut egui::Ui) {
        let window = self.controller.store().window();
        let duration = self.controller.store().duration();
        let ready = self.controller.source_ready();

        let max = duration.unwrap_or_else(|| window.end().max(10.0));
        let moved = range_slider(ui, window.start(), window.end(), max, 1.0, ready);
        if let Some((handle, value)) = moved {
            self.controller.apply_slider(handle, value);
        }

        ui.horizontal(|ui| {
            ui.label("Start");
            let start_response = ui.add(
                egui::TextEdit::singleline(&mut self.controller.ui.start_input)
                    .desired_width(64.0),
            );
            if start_response.lost_focus() {
                self.controller.commit_start_text();
            } else if !start_response.has_focus() {
                self.controller.ui.start_input = format_mmss(window.start());
            }

            ui.label("End");
            let end_response = ui.add(
                egui::TextEdit::singleline(&mut self.controller.ui.end_input).desired_width(64.0),
            );
            if end_response.lost_focus() {
                self.controller.commit_end_text();
            } else if !end_response.has_focus() {
                self.controller.ui.end_input = format_mmss(window.end());
            }
        });
    }

    fn render_repeat_section(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Repeat count");
            let current = self.controller.store().budget();
            let mut selection = current;
            egui::ComboBox::from_id_salt("repeat_count")
                .selected_text(current.to_string())
                .show_ui(ui, |ui| {
                    for count in 1..=10 {
                        ui.selectable_value(
                            &mut selection,
                            RepeatBudget::Finite(count),
                            count.to_string(),
                        );
                    }
                    ui.selectable_value(&mut selection, RepeatBudget::Unbounded, "∞");
                });
            if selection != current {
                self.controller.set_budget(selection);
            }
            if self.controller.is_looping() {
                ui.label(format!("remaining: {}", self.controller.store().budget()));
            }
        });
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let can_start = !self.controller.is_looping() && self.controller.source_ready();
            if ui
                .add_enabled(can_start, egui::Button::new("Start loop"))
                .clicked()
            {
                self.controller.start_loop();
            }
            if ui.button("Reset").clicked() {
                self.controller.reset();
            }
        });
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.controller.tick(Instant::now());

        self.render_top_bar(ctx);
        self.render_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_source_section(ui);
            ui.separator();
            self.render_window_section(ui);
            ui.add_space(4.0);
            self.render_repeat_section(ui);
            ui.add_space(8.0);
            self.render_controls(ui);
        });

        // The loop controller only runs from this frame loop; keep frames
        // coming even when the user is idle.
        ctx.request_repaint_after(self.controller.poll_interval().min(MAX_REPAINT_INTERVAL));
    }
}
