use super::{FileStatus, QuestionSetUploader};
use eframe::egui::{self, Align2, Color32, RichText};

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);

impl QuestionSetUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        let controls = self.ui.controls().clone();
        let blocked = !self.alerts.is_empty();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Question Set Uploader");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Turn your notes into a shareable question set")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);

                    ui.group(|ui| {
                        ui.horizontal(|ui| {
                            ui.label("Server");
                            ui.add_enabled(
                                controls.submit_enabled,
                                egui::TextEdit::singleline(&mut self.server_url)
                                    .desired_width(ui.available_width())
                                    .hint_text("http://127.0.0.1:8080"),
                            );
                        });
                    });

                    ui.add_space(10.0);

                    ui.group(|ui| {
                        ui.horizontal(|ui| {
                            let pick = ui.add_enabled(
                                controls.file_picker_enabled,
                                egui::Button::new("📁 Select Files"),
                            );
                            if pick.clicked() {
                                self.pick_files();
                            }
                            ui.label(controls.selection_label.as_str());

                            if controls.clear_visible {
                                let clear = ui
                                    .add_enabled(controls.clear_enabled, egui::Button::new("🔄"))
                                    .on_hover_text("Clear selection");
                                if clear.clicked() {
                                    self.clear();
                                }
                            }
                        });

                        if !self.selection.is_empty() {
                            ui.add_space(6.0);
                            for file in self.selection.files() {
                                ui.label(
                                    RichText::new(format!("{} ({})", file.name, file.size_label()))
                                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                                );
                            }
                        }
                    });

                    ui.add_space(20.0);

                    ui.vertical_centered(|ui| {
                        let submit = ui.add_enabled(
                            controls.submit_enabled,
                            egui::Button::new("📤 Upload Files").min_size(egui::vec2(200.0, 40.0)),
                        );
                        if submit.clicked() {
                            self.submit();
                        }

                        if controls.loader_visible {
                            ui.add_space(10.0);
                            ui.add(egui::Spinner::new().size(24.0));
                        }

                        ui.add_space(10.0);
                        let open = ui.add_enabled(
                            controls.artifact_enabled(),
                            egui::Button::new(RichText::new("Open Question Set").color(ACCENT)),
                        );
                        if open.clicked() {
                            self.open_artifact();
                        }
                    });

                    if !self.file_statuses.is_empty() {
                        ui.add_space(20.0);
                        self.render_details(ui);
                    }
                });
            });
        });

        self.render_alert(ctx);
    }

    fn render_details(&mut self, ui: &mut egui::Ui) {
        if ui
            .button(if self.show_details {
                "Hide Details"
            } else {
                "Show Details"
            })
            .clicked()
        {
            self.show_details = !self.show_details;
        }

        if !self.show_details {
            return;
        }

        egui::Frame::none()
            .fill(ui.style().visuals.extreme_bg_color)
            .show(ui, |ui| {
                ui.add_space(8.0);
                for (name, status) in &self.file_statuses {
                    ui.horizontal(|ui| match status {
                        FileStatus::Uploaded { terms, definitions } => {
                            ui.label("✅");
                            ui.colored_label(
                                Color32::from_rgb(0, 180, 0),
                                format!("{} - {} terms, {} definitions", name, terms, definitions),
                            );
                        }
                        FileStatus::Failed(message) => {
                            ui.label("❌");
                            ui.colored_label(
                                Color32::from_rgb(220, 50, 50),
                                format!("{} - {}", name, message),
                            );
                        }
                    });
                    ui.add_space(4.0);
                }
                ui.add_space(8.0);
            });
    }

    /// Oldest pending alert as a modal; the rest of the window is disabled meanwhile.
    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alerts.front().cloned() else {
            return;
        };

        let mut acknowledged = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        acknowledged = true;
                    }
                });
            });

        if acknowledged {
            self.alerts.pop_front();
        }
    }
}
