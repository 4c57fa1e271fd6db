//! Viewport over campaign worlds.

use glam::Vec2;
use tower_siege_core::{WorldBounds, TILE_HEIGHT, TILE_WIDTH};

const MIN_ZOOM: f32 = 0.35;
const MAX_ZOOM: f32 = 2.2;
/// Share of the viewport the camera may drift past the world edge.
const EDGE_PADDING: f32 = 0.25;
/// Share of the viewport a fitted world fills.
const FIT_MARGIN: f32 = 0.92;

/// Top-left offset and zoom factor of the view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Camera {
    pub(crate) offset: Vec2,
    pub(crate) zoom: f32,
}

impl Camera {
    /// Unzoomed view anchored at the origin.
    pub(crate) const fn fixed() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Zooms out until the whole world fits and centers it.
    pub(crate) fn fitting(bounds: WorldBounds) -> Self {
        let size = bounds.size();
        let zoom = (TILE_WIDTH * FIT_MARGIN / size.x)
            .min(TILE_HEIGHT * FIT_MARGIN / size.y)
            .clamp(MIN_ZOOM, 1.0);
        let mut camera = Self {
            offset: Vec2::ZERO,
            zoom,
        };
        camera.center_on((bounds.min + bounds.max) * 0.5, bounds);
        camera
    }

    fn view_size(&self) -> Vec2 {
        Vec2::new(TILE_WIDTH, TILE_HEIGHT) / self.zoom
    }

    pub(crate) fn center_on(&mut self, point: Vec2, bounds: WorldBounds) {
        self.offset = point - self.view_size() * 0.5;
        self.clamp_to(bounds);
    }

    pub(crate) fn pan(&mut self, delta: Vec2, bounds: WorldBounds) {
        self.offset += delta;
        self.clamp_to(bounds);
    }

    /// Changes the zoom while keeping the view center in place.
    pub(crate) fn zoom_by(&mut self, delta: f32, bounds: WorldBounds) {
        let center = self.offset + self.view_size() * 0.5;
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        self.center_on(center, bounds);
    }

    fn clamp_to(&mut self, bounds: WorldBounds) {
        let view = self.view_size();
        let low = bounds.min - view * EDGE_PADDING;
        let high = bounds.max - view + view * EDGE_PADDING;
        self.offset = Vec2::new(
            clamp_axis(self.offset.x, low.x, high.x),
            clamp_axis(self.offset.y, low.y, high.y),
        );
    }
}

fn clamp_axis(value: f32, low: f32, high: f32) -> f32 {
    if high < low {
        (low + high) * 0.5
    } else {
        value.clamp(low, high)
    }
}
