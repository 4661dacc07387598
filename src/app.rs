use std::path::Path;

use eframe::egui;
use log::error;

use crate::crop::{CropHit, CropRect, EDGE_HIT_MARGIN, Edge};
use crate::io;
use crate::session::Session;

const CONTROLS_WIDTH: f32 = 250.0;
const CANVAS_PADDING: f32 = 20.0;
const MAX_TARGET_SIZE: u32 = 10_000;

struct DragState {
    hit: CropHit,
    /// Press position in working-image coordinates.
    start: egui::Pos2,
    rect_at_press: CropRect,
}

pub struct ResizerApp {
    session: Option<Session>,
    texture: Option<egui::TextureHandle>,
    texture_dirty: bool,
    target_width: u32,
    target_height: u32,
    keep_aspect: bool,
    crop_width: u32,
    crop_height: u32,
    show_crop_dialog: bool,
    /// The crop workflow only makes sense over a freshly scaled image.
    can_set_crop: bool,
    drag: Option<DragState>,
    display_scale: f32,
    status: Option<String>,
}

impl ResizerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            session: None,
            texture: None,
            texture_dirty: false,
            target_width: 800,
            target_height: 600,
            keep_aspect: true,
            crop_width: 800,
            crop_height: 600,
            show_crop_dialog: false,
            can_set_crop: false,
            drag: None,
            display_scale: 1.0,
            status: None,
        }
    }

    fn open_image(&mut self, path: &Path) {
        let loaded = io::load_image(path).and_then(|img| Session::load(img).map_err(Into::into));
        match loaded {
            Ok(session) => {
                let (w, h) = session.original_size();
                self.target_width = w;
                self.target_height = h;
                self.session = Some(session);
                self.texture_dirty = true;
                self.can_set_crop = false;
                self.drag = None;
                self.status = None;
            }
            Err(err) => {
                error!("{err:#}");
                self.status = Some(format!("Could not open image: {err}"));
            }
        }
    }

    fn resize_image(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        match session.resize(self.target_width, self.target_height, self.keep_aspect) {
            Ok(()) => {
                self.can_set_crop = true;
                self.texture_dirty = true;
                self.drag = None;
                self.status = None;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn begin_crop(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        match session.begin_crop(self.crop_width, self.crop_height) {
            Ok(()) => {
                self.drag = None;
                self.status = None;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn commit_crop(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        match session.commit_crop() {
            Ok(()) => {
                let (w, h) = session.working_size();
                self.target_width = w;
                self.target_height = h;
                self.texture_dirty = true;
                self.drag = None;
                self.status = None;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn save_image(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(path) = io::pick_save_path() else {
            return;
        };
        match io::save_image(session.working(), &path) {
            Ok(_) => self.status = None,
            Err(err) => {
                error!("{err:#}");
                self.status = Some(format!("Could not save image: {err}"));
            }
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if let Some(session) = &self.session {
            let image = session.working();
            let size = [image.width() as _, image.height() as _];
            let image_buffer = image.to_rgba8();
            let pixels = image_buffer.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            self.texture =
                Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        if ui.button("Open Image").clicked() {
            if let Some(path) = io::pick_image() {
                self.open_image(&path);
            }
        }

        ui.separator();
        ui.label("Target Size:");

        let aspect_ratio = self.session.as_ref().map(|s| s.aspect_ratio());

        ui.horizontal(|ui| {
            ui.label("Width:");
            let response = ui.add(
                egui::DragValue::new(&mut self.target_width).range(1..=MAX_TARGET_SIZE),
            );
            if response.changed() && self.keep_aspect {
                if let Some(ratio) = aspect_ratio {
                    self.target_height =
                        (self.target_width as f32 / ratio).round().max(1.0) as u32;
                }
            }
        });
        ui.horizontal(|ui| {
            ui.label("Height:");
            let response = ui.add(
                egui::DragValue::new(&mut self.target_height).range(1..=MAX_TARGET_SIZE),
            );
            if response.changed() && self.keep_aspect {
                if let Some(ratio) = aspect_ratio {
                    self.target_width =
                        (self.target_height as f32 * ratio).round().max(1.0) as u32;
                }
            }
        });
        ui.checkbox(&mut self.keep_aspect, "Keep aspect ratio");

        let has_session = self.session.is_some();
        let has_crop = self.session.as_ref().is_some_and(|s| s.crop.is_some());

        if ui
            .add_enabled(has_session, egui::Button::new("Resize"))
            .clicked()
        {
            self.resize_image();
        }
        if ui
            .add_enabled(self.can_set_crop, egui::Button::new("Set Crop Size"))
            .clicked()
        {
            self.show_crop_dialog = true;
        }
        if ui.add_enabled(has_crop, egui::Button::new("Done")).clicked() {
            self.commit_crop();
        }
        if ui
            .add_enabled(has_session, egui::Button::new("Save"))
            .clicked()
        {
            self.save_image();
        }

        ui.separator();
        ui.label("Zoom:");
        ui.horizontal(|ui| {
            if let Some(session) = &mut self.session {
                if ui.button("−").clicked() {
                    session.zoom_out();
                }
                ui.label(format!("{}%", (self.display_scale * 100.0).round() as i32));
                if ui.button("+").clicked() {
                    session.zoom_in();
                }
                if ui.button("Reset").clicked() {
                    session.reset_zoom();
                }
            }
        });

        if let Some(status) = &self.status {
            ui.separator();
            ui.colored_label(ui.visuals().error_fg_color, status);
        }
    }

    fn crop_size_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_crop_dialog {
            return;
        }
        egui::Window::new("Set Crop Size")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Width:");
                    ui.add(egui::DragValue::new(&mut self.crop_width).range(1..=MAX_TARGET_SIZE));
                });
                ui.horizontal(|ui| {
                    ui.label("Height:");
                    ui.add(egui::DragValue::new(&mut self.crop_height).range(1..=MAX_TARGET_SIZE));
                });
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        self.show_crop_dialog = false;
                        self.begin_crop();
                    }
                    if ui.button("Cancel").clicked() {
                        self.show_crop_dialog = false;
                    }
                });
            });
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (Some(texture), Some(session)) = (&self.texture, &mut self.session) else {
            ui.centered_and_justified(|ui| {
                ui.label("Open an image (or drop one here) to begin");
            });
            return;
        };

        let image_size = texture.size_vec2();

        // Fit to the visible viewport, then apply the session zoom on top.
        let viewport = ui.available_size();
        let max_size = viewport - egui::vec2(CANVAS_PADDING * 2.0, CANVAS_PADDING * 2.0);
        let fit_scale = (max_size.x / image_size.x)
            .min(max_size.y / image_size.y)
            .max(0.01);
        let scale = fit_scale * session.zoom;
        self.display_scale = scale;
        let display_size = image_size * scale;
        let total_size = display_size + egui::vec2(CANVAS_PADDING * 2.0, CANVAS_PADDING * 2.0);

        egui::ScrollArea::both().auto_shrink(false).show(ui, |ui| {
            // Center within the viewport; at high zoom the scroll area takes over.
            let canvas_size = egui::vec2(
                viewport.x.max(total_size.x),
                viewport.y.max(total_size.y),
            );
            let canvas_rect = egui::Rect::from_min_size(ui.cursor().min, canvas_size);
            let response = ui.allocate_rect(canvas_rect, egui::Sense::drag());
            let painter = ui.painter_at(canvas_rect);

            let image_rect = egui::Rect::from_min_size(
                canvas_rect.min + (canvas_size - display_size) / 2.0,
                display_size,
            );

            painter.image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let to_image = |pos: egui::Pos2| ((pos - image_rect.min) / scale).to_pos2();
            let to_screen =
                |rect: egui::Rect| egui::Rect::from_min_max(
                    image_rect.min + rect.min.to_vec2() * scale,
                    image_rect.min + rect.max.to_vec2() * scale,
                );
            let (img_w, img_h) = (image_size.x, image_size.y);

            if response.drag_started() {
                if let (Some(pos), Some(rect)) = (response.interact_pointer_pos(), session.crop) {
                    let image_pos = to_image(pos);
                    if let Some(hit) = rect.hit(image_pos, EDGE_HIT_MARGIN) {
                        self.drag = Some(DragState {
                            hit,
                            start: image_pos,
                            rect_at_press: rect,
                        });
                    }
                }
            }

            if response.dragged() {
                if let (Some(drag), Some(pos), Some(rect)) =
                    (&self.drag, response.interact_pointer_pos(), session.crop)
                {
                    let image_pos = to_image(pos);
                    session.crop = Some(match drag.hit {
                        CropHit::Edge(edge) => rect.drag_edge(edge, image_pos, img_w, img_h),
                        CropHit::Move => drag
                            .rect_at_press
                            .drag_move(image_pos - drag.start, img_w, img_h),
                    });
                }
            }

            if response.drag_stopped() {
                self.drag = None;
            }

            if let Some(rect) = session.crop {
                // cursor affordance for the interaction the pointer would start
                let hover_hit = match &self.drag {
                    Some(drag) => Some(drag.hit),
                    None => response
                        .hover_pos()
                        .and_then(|pos| rect.hit(to_image(pos), EDGE_HIT_MARGIN)),
                };
                if let Some(hit) = hover_hit {
                    let icon = match hit {
                        CropHit::Edge(Edge::Left | Edge::Right) => {
                            egui::CursorIcon::ResizeHorizontal
                        }
                        CropHit::Edge(Edge::Top | Edge::Bottom) => egui::CursorIcon::ResizeVertical,
                        CropHit::Move if self.drag.is_some() => egui::CursorIcon::Grabbing,
                        CropHit::Move => egui::CursorIcon::Grab,
                    };
                    ui.ctx().output_mut(|o| o.cursor_icon = icon);
                }

                let overlay_color = egui::Color32::from_black_alpha(128);
                for strip in rect.overlay_strips(img_w, img_h) {
                    painter.rect_filled(to_screen(strip), 0.0, overlay_color);
                }

                painter.rect_stroke(
                    to_screen(rect.to_rect()),
                    0.0,
                    egui::Stroke::new(2.0, egui::Color32::RED),
                );
            }
        });
    }
}

impl eframe::App for ResizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle dropped files
        if !ctx.input(|i| i.raw.dropped_files.is_empty()) {
            let dropped_files = ctx.input(|i| i.raw.dropped_files.clone());
            if let Some(file) = dropped_files.first() {
                if let Some(path) = &file.path {
                    self.open_image(path);
                }
            }
        }

        if self.texture_dirty {
            self.refresh_texture(ctx);
            self.texture_dirty = false;
        }

        egui::SidePanel::left("controls")
            .exact_width(CONTROLS_WIDTH)
            .resizable(false)
            .show(ctx, |ui| self.controls(ui));

        self.crop_size_dialog(ctx);

        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));
    }
}
