use super::{DownloadControl, HdrEmojiApp};
use crate::utils::file_size::format_size;
use crate::utils::image_file::ALLOWED_EXTENSIONS;
use egui::{Color32, RichText};
use rfd::FileDialog;
use std::time::Instant;

impl HdrEmojiApp {
    pub fn render(&mut self, ctx: &egui::Context, now: Instant) {
        let view = self.controller.state().view(now);

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                ui.heading("HDR Emoji Maker");
                ui.add_space(3.0);
                ui.label(
                    RichText::new("Pick an image to brighten it into an HDR emoji")
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            });
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                if ui.button("🖼 Select Image").clicked() {
                    if let Some(path) = FileDialog::new()
                        .add_filter("Images", &ALLOWED_EXTENSIONS)
                        .pick_file()
                    {
                        self.controller.select_file(path);
                    }
                }

                if let Some(label) = view.busy_label {
                    ui.spinner();
                    ui.label(label);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_download(ui, view.download, view.status_visible);
                });
            });

            let session = &self.controller.state().session;
            if let Some(path) = &session.source_file {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let size = session.source_bytes.map(format_size).unwrap_or_default();
                ui.label(
                    RichText::new(format!("{} {}", name, size))
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            }
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_canvas(ui);
        });
    }

    fn render_download(
        &mut self,
        ui: &mut egui::Ui,
        control: DownloadControl,
        status_visible: bool,
    ) {
        if status_visible {
            ui.label("Download in progress…");
            ui.spinner();
        }

        match control {
            DownloadControl::Hidden => {}
            DownloadControl::Enabled => {
                let button = egui::Button::new("⬇ Download").min_size(egui::vec2(140.0, 32.0));
                if ui.add(button).clicked() {
                    self.start_download();
                }
            }
            DownloadControl::Disabled => {
                let button = egui::Button::new("⬇ Download")
                    .min_size(egui::vec2(140.0, 32.0))
                    .fill(Color32::GRAY);
                ui.add_enabled(false, button)
                    .on_disabled_hover_text("Processing failed; select the image again");
            }
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let canvas = &self.controller.state().canvas;
        let Some(pixels) = canvas.pixels() else {
            self.canvas_texture = None;
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("No image selected").color(Color32::from_rgb(150, 150, 150)),
                );
            });
            return;
        };

        let generation = canvas.generation();
        let stale = !matches!(&self.canvas_texture, Some((cached, _)) if *cached == generation);
        if stale {
            let (width, height) = canvas.dimensions();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [width as usize, height as usize],
                pixels.as_raw(),
            );
            let texture = ui.ctx().load_texture(
                format!("canvas:{}", generation),
                color_image,
                egui::TextureOptions::LINEAR,
            );
            self.canvas_texture = Some((generation, texture));
        }

        if let Some((_, texture)) = &self.canvas_texture {
            let (width, height) = canvas.dimensions();
            let size = egui::vec2(width as f32, height as f32);
            egui::ScrollArea::both().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                        texture.id(),
                        size,
                    )));
                    ui.label(
                        RichText::new(format!("{} × {}", width, height))
                            .color(ui.visuals().text_color().gamma_multiply(0.6)),
                    );
                });
            });
        }
    }
}
