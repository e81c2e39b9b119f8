use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use image::RgbaImage;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::controller::{RunDispatcher, UiController};
use crate::pipeline::Pipeline;

pub const WINDOW_TITLE: &str = "PDF Summarizer";
pub const WINDOW_SIZE: [f32; 2] = [900.0, 700.0];
pub const TRIGGER_LABEL: &str = "Select PDF and Summarize";

struct Textures {
    version: u64,
    bar_chart: TextureHandle,
    word_cloud: TextureHandle,
}

/// Main window: one trigger button, a status line, the summary and both images.
pub struct SummarizerApp {
    controller: UiController,
    dispatcher: RunDispatcher,
    pipeline: Arc<Pipeline>,
    textures: Option<Textures>,
}

impl SummarizerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, pipeline: Arc<Pipeline>, mut dispatcher: RunDispatcher) -> Self {
        let ctx = cc.egui_ctx.clone();
        dispatcher.set_repaint_hook(move || ctx.request_repaint());

        Self {
            controller: UiController::new(),
            dispatcher,
            pipeline,
            textures: None,
        }
    }

    fn on_trigger(&mut self) {
        if !self.controller.begin_selection() {
            return;
        }

        let picked = rfd::FileDialog::new()
            .set_title("Select a PDF")
            .add_filter("PDF files", &["pdf"])
            .pick_file();

        let Some(path) = picked else {
            debug!("File selection cancelled");
            self.controller.cancel_selection();
            return;
        };

        if let Some(run_id) = self.controller.start_processing(path.clone()) {
            let pipeline = Arc::clone(&self.pipeline);
            self.dispatcher.dispatch(run_id, move || pipeline.run(&path));
        }
    }

    fn drain_results(&mut self) {
        while let Some(message) = self.dispatcher.try_next() {
            self.controller.finish(message);
        }
    }

    fn show_pending_error(&mut self) {
        if let Some(message) = self.controller.take_error() {
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Error")
                .set_description(message.as_str())
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
        }
    }

    fn refresh_textures(&mut self, ctx: &egui::Context) {
        let Some(visuals) = self.controller.visuals() else {
            return;
        };
        let version = self.controller.visuals_version();
        if self.textures.as_ref().map_or(false, |t| t.version == version) {
            return;
        }

        info!(version, "Uploading visualization textures");
        self.textures = Some(Textures {
            version,
            bar_chart: ctx.load_texture("bar_chart", to_color_image(&visuals.bar_chart), TextureOptions::LINEAR),
            word_cloud: ctx.load_texture("word_cloud", to_color_image(&visuals.word_cloud), TextureOptions::LINEAR),
        });
    }
}

fn to_color_image(image: &RgbaImage) -> ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, image.as_raw())
}

fn show_image(ui: &mut egui::Ui, title: &str, texture: &TextureHandle) {
    ui.label(egui::RichText::new(title).strong());
    let [w, h] = texture.size();
    let width = ui.available_width().min(w as f32);
    let height = width * h as f32 / w as f32;
    ui.add(egui::Image::from_texture(texture).fit_to_exact_size([width, height].into()));
    ui.add_space(10.0);
}

impl eframe::App for SummarizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_results();
        self.show_pending_error();
        self.refresh_textures(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(WINDOW_TITLE);
            ui.add_space(5.0);

            let trigger = ui.add_enabled(self.controller.trigger_enabled(), egui::Button::new(TRIGGER_LABEL));
            if trigger.clicked() {
                self.on_trigger();
            }

            ui.label(self.controller.status());
            if self.controller.active_path().is_some() {
                ui.spinner();
            }
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.label(egui::RichText::new("Summary").strong());
                ui.add(
                    egui::TextEdit::multiline(&mut self.controller.summary())
                        .desired_width(f32::INFINITY)
                        .desired_rows(10),
                );
                ui.add_space(10.0);

                if let Some(textures) = &self.textures {
                    show_image(ui, "Top 10 Words", &textures.bar_chart);
                    show_image(ui, "Word Cloud", &textures.word_cloud);
                }
            });
        });

        // Keep polling while a run is in flight in case a wakeup is missed
        if !self.controller.trigger_enabled() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
