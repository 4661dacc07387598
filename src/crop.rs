use eframe::egui::{Pos2, Rect, Vec2, pos2};

/// Pointer distance, in working-image pixels, within which an edge drag is
/// picked up instead of a move.
pub const EDGE_HIT_MARGIN: f32 = 10.0;

/// Edges never collapse below this, and never invert.
const MIN_SIZE: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CropHit {
    Edge(Edge),
    Move,
}

/// Axis-aligned crop rectangle in working-image pixel coordinates.
///
/// Stays fully inside the image it was created over: `0 <= left`,
/// `0 <= top`, `right() <= image width`, `bottom() <= image height`,
/// `width >= 1`, `height >= 1`. Every mutating operation clamps back into
/// these bounds, so reapplying one to an already-valid rectangle is a no-op.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRect {
    /// Rectangle of size `min(requested, image bounds)` centered on the image.
    ///
    /// Oversized requests shrink silently to fit. Returns `None` when the
    /// image or the requested size has a zero dimension.
    pub fn centered(img_w: u32, img_h: u32, req_w: u32, req_h: u32) -> Option<Self> {
        if img_w == 0 || img_h == 0 || req_w == 0 || req_h == 0 {
            return None;
        }
        let width = req_w.min(img_w) as f32;
        let height = req_h.min(img_h) as f32;
        Some(Self {
            left: (img_w as f32 - width) / 2.0,
            top: (img_h as f32 - height) / 2.0,
            width,
            height,
        })
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        pos.x >= self.left && pos.x <= self.right() && pos.y >= self.top && pos.y <= self.bottom()
    }

    /// First edge (left, right, top, bottom, in that order) within `margin`
    /// of `pos`, counting only hits alongside the edge's segment.
    pub fn classify_edge(&self, pos: Pos2, margin: f32) -> Option<Edge> {
        let along_x = pos.x >= self.left - margin && pos.x <= self.right() + margin;
        let along_y = pos.y >= self.top - margin && pos.y <= self.bottom() + margin;

        if along_y && (pos.x - self.left).abs() < margin {
            Some(Edge::Left)
        } else if along_y && (pos.x - self.right()).abs() < margin {
            Some(Edge::Right)
        } else if along_x && (pos.y - self.top).abs() < margin {
            Some(Edge::Top)
        } else if along_x && (pos.y - self.bottom()).abs() < margin {
            Some(Edge::Bottom)
        } else {
            None
        }
    }

    /// What a drag starting at `pos` would do: resize one edge, move the
    /// whole rectangle, or nothing (pointer outside the rectangle).
    pub fn hit(&self, pos: Pos2, margin: f32) -> Option<CropHit> {
        if let Some(edge) = self.classify_edge(pos, margin) {
            Some(CropHit::Edge(edge))
        } else if self.contains(pos) {
            Some(CropHit::Move)
        } else {
            None
        }
    }

    /// Set one edge's coordinate to the pointer position, clamped to the
    /// image bounds and to a minimum 1 px width/height.
    pub fn drag_edge(&self, edge: Edge, pos: Pos2, img_w: f32, img_h: f32) -> Self {
        let mut rect = *self;
        match edge {
            Edge::Left => {
                let left = pos.x.clamp(0.0, self.right() - MIN_SIZE);
                rect.width = self.right() - left;
                rect.left = left;
            }
            Edge::Right => {
                let right = pos.x.clamp(self.left + MIN_SIZE, img_w);
                rect.width = right - self.left;
            }
            Edge::Top => {
                let top = pos.y.clamp(0.0, self.bottom() - MIN_SIZE);
                rect.height = self.bottom() - top;
                rect.top = top;
            }
            Edge::Bottom => {
                let bottom = pos.y.clamp(self.top + MIN_SIZE, img_h);
                rect.height = bottom - self.top;
            }
        }
        rect
    }

    /// Translate by `delta` (pointer position minus press position), clamped
    /// so the rectangle stays fully inside the image. Size never changes.
    pub fn drag_move(&self, delta: Vec2, img_w: f32, img_h: f32) -> Self {
        Self {
            left: (self.left + delta.x).clamp(0.0, img_w - self.width),
            top: (self.top + delta.y).clamp(0.0, img_h - self.height),
            ..*self
        }
    }

    /// Up to four non-overlapping strips covering every pixel outside the
    /// rectangle: left and right strips span the full image height, top and
    /// bottom strips are confined to the rectangle's horizontal extent, so
    /// no corner is covered twice.
    pub fn overlay_strips(&self, img_w: f32, img_h: f32) -> Vec<Rect> {
        let mut strips = Vec::with_capacity(4);
        if self.left > 0.0 {
            strips.push(Rect::from_min_max(pos2(0.0, 0.0), pos2(self.left, img_h)));
        }
        if self.right() < img_w {
            strips.push(Rect::from_min_max(pos2(self.right(), 0.0), pos2(img_w, img_h)));
        }
        if self.top > 0.0 {
            strips.push(Rect::from_min_max(
                pos2(self.left, 0.0),
                pos2(self.right(), self.top),
            ));
        }
        if self.bottom() < img_h {
            strips.push(Rect::from_min_max(
                pos2(self.left, self.bottom()),
                pos2(self.right(), img_h),
            ));
        }
        strips
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_min_size(
            pos2(self.left, self.top),
            eframe::egui::vec2(self.width, self.height),
        )
    }

    /// Whole-pixel rectangle for the actual crop, rounded to nearest.
    pub fn to_pixels(&self) -> (u32, u32, u32, u32) {
        (
            self.left.round().max(0.0) as u32,
            self.top.round().max(0.0) as u32,
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}
