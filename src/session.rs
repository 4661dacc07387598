use image::DynamicImage;
use image::imageops::FilterType;
use log::info;
use thiserror::Error;

use crate::crop::CropRect;

pub const ZOOM_STEP: f32 = 1.2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("image has no pixels")]
    EmptyImage,
    #[error("width and height must be at least 1")]
    InvalidSize,
    #[error("no crop rectangle is active")]
    NoCrop,
}

/// One editing session: the image as loaded, the working copy currently on
/// screen, an optional crop rectangle over the working copy, and the view
/// zoom. Everything runs on the UI thread; handlers below are the only
/// mutators.
pub struct Session {
    original: DynamicImage,
    working: DynamicImage,
    pub crop: Option<CropRect>,
    /// Multiplier on top of the fit-to-view scale. 1.0 = fit.
    pub zoom: f32,
}

impl Session {
    pub fn load(image: DynamicImage) -> Result<Self, SessionError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SessionError::EmptyImage);
        }
        info!("loaded image {}x{}", image.width(), image.height());
        Ok(Self {
            working: image.clone(),
            original: image,
            crop: None,
            zoom: 1.0,
        })
    }

    pub fn working(&self) -> &DynamicImage {
        &self.working
    }

    pub fn working_size(&self) -> (u32, u32) {
        (self.working.width(), self.working.height())
    }

    pub fn original_size(&self) -> (u32, u32) {
        (self.original.width(), self.original.height())
    }

    /// Width over height of the image as loaded. Drives the linked
    /// target-size fields.
    pub fn aspect_ratio(&self) -> f32 {
        self.original.width() as f32 / self.original.height() as f32
    }

    /// Rescale to the target size with a smooth filter and make the result
    /// the new working image. Always resamples from the image as loaded, so
    /// repeated resizes do not compound. With `keep_aspect` the result fits
    /// within the target box and one axis may come out smaller. Any active
    /// crop rectangle is discarded.
    pub fn resize(&mut self, target_w: u32, target_h: u32, keep_aspect: bool) -> Result<(), SessionError> {
        if target_w == 0 || target_h == 0 {
            return Err(SessionError::InvalidSize);
        }
        self.working = if keep_aspect {
            self.original.resize(target_w, target_h, FilterType::CatmullRom)
        } else {
            self.original.resize_exact(target_w, target_h, FilterType::CatmullRom)
        };
        self.crop = None;
        self.zoom = 1.0;
        info!(
            "resized to {}x{} (requested {}x{})",
            self.working.width(),
            self.working.height(),
            target_w,
            target_h
        );
        Ok(())
    }

    /// Place a centered crop rectangle of the requested size over the
    /// working image. Oversized requests clamp to the image; zero sizes are
    /// rejected and the prior state is kept.
    pub fn begin_crop(&mut self, req_w: u32, req_h: u32) -> Result<(), SessionError> {
        let (w, h) = self.working_size();
        match CropRect::centered(w, h, req_w, req_h) {
            Some(rect) => {
                self.crop = Some(rect);
                Ok(())
            }
            None => Err(SessionError::InvalidSize),
        }
    }

    /// Replace the working image with the pixels inside the crop rectangle.
    /// The rectangle is discarded afterwards: its coordinate space is gone.
    pub fn commit_crop(&mut self) -> Result<(), SessionError> {
        let rect = self.crop.ok_or(SessionError::NoCrop)?;
        let (img_w, img_h) = self.working_size();
        let (x, y, w, h) = rect.to_pixels();
        let x = x.min(img_w - 1);
        let y = y.min(img_h - 1);
        let w = w.min(img_w - x);
        let h = h.min(img_h - y);
        self.working = self.working.crop_imm(x, y, w, h);
        self.crop = None;
        self.zoom = 1.0;
        info!("cropped to {}x{} at ({}, {})", w, h, x, y);
        Ok(())
    }

    pub fn zoom_in(&mut self) {
        self.zoom *= ZOOM_STEP;
    }

    pub fn zoom_out(&mut self) {
        self.zoom /= ZOOM_STEP;
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::Edge;
    use eframe::egui::pos2;

    fn session(w: u32, h: u32) -> Session {
        Session::load(DynamicImage::new_rgba8(w, h)).unwrap()
    }

    #[test]
    fn load_rejects_empty_image() {
        assert!(matches!(
            Session::load(DynamicImage::new_rgba8(0, 100)),
            Err(SessionError::EmptyImage)
        ));
        assert!(matches!(
            Session::load(DynamicImage::new_rgba8(100, 0)),
            Err(SessionError::EmptyImage)
        ));
    }

    #[test]
    fn resize_exact_ignores_aspect() {
        let mut s = session(200, 100);
        s.resize(50, 50, false).unwrap();
        assert_eq!(s.working_size(), (50, 50));
    }

    #[test]
    fn resize_keeping_aspect_fits_within_target() {
        let mut s = session(200, 100);
        s.resize(100, 100, true).unwrap();
        assert_eq!(s.working_size(), (100, 50));
    }

    #[test]
    fn resize_always_starts_from_the_loaded_image() {
        let mut s = session(400, 400);
        s.resize(100, 100, true).unwrap();
        assert_eq!(s.working_size(), (100, 100));
        // a second resize is not 100 * 300/400
        s.resize(300, 300, true).unwrap();
        assert_eq!(s.working_size(), (300, 300));
    }

    #[test]
    fn resize_rejects_zero_and_keeps_state() {
        let mut s = session(200, 100);
        assert_eq!(s.resize(0, 50, true), Err(SessionError::InvalidSize));
        assert_eq!(s.working_size(), (200, 100));
    }

    #[test]
    fn resize_discards_crop() {
        let mut s = session(200, 100);
        s.begin_crop(50, 50).unwrap();
        assert!(s.crop.is_some());
        s.resize(100, 50, true).unwrap();
        assert!(s.crop.is_none());
    }

    #[test]
    fn begin_crop_rejects_zero_and_keeps_state() {
        let mut s = session(200, 100);
        s.begin_crop(50, 40).unwrap();
        let before = s.crop;
        assert_eq!(s.begin_crop(0, 40), Err(SessionError::InvalidSize));
        assert_eq!(s.crop, before);
    }

    #[test]
    fn commit_without_crop_is_rejected() {
        let mut s = session(200, 100);
        assert_eq!(s.commit_crop(), Err(SessionError::NoCrop));
    }

    #[test]
    fn commit_output_matches_rect_size() {
        let mut s = session(1000, 1000);
        s.begin_crop(400, 300).unwrap();
        s.commit_crop().unwrap();
        assert_eq!(s.working_size(), (400, 300));
        assert!(s.crop.is_none());
    }

    #[test]
    fn drag_left_edge_then_commit_scenario() {
        let mut s = session(1000, 1000);
        s.begin_crop(400, 300).unwrap();
        let rect = s.crop.unwrap();
        assert_eq!((rect.left, rect.top), (300.0, 350.0));
        s.crop = Some(rect.drag_edge(Edge::Left, pos2(100.0, 500.0), 1000.0, 1000.0));
        s.commit_crop().unwrap();
        assert_eq!(s.working_size(), (600, 300));
    }

    #[test]
    fn oversized_crop_request_clamps_to_image() {
        let mut s = session(300, 200);
        s.begin_crop(800, 600).unwrap();
        s.commit_crop().unwrap();
        assert_eq!(s.working_size(), (300, 200));
    }
}
