use std::sync::Arc;

use parking_lot::RwLock;

/// Provides the current viewport dimensions.
pub trait ViewportProvider: Send + Sync {
    fn viewport_size(&self) -> (u32, u32);

    /// Aspect ratio of the viewport; falls back to 1.0 on a zero height.
    fn aspect(&self) -> f32 {
        let (width, height) = self.viewport_size();
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}

/// Viewport that always reports the same resolution (headless runs).
#[derive(Debug, Clone, Copy)]
pub struct StaticViewport {
    pub width: u32,
    pub height: u32,
}

impl StaticViewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ViewportProvider for StaticViewport {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Viewport tracking a live window, updated from resize events.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<(u32, u32)>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }
}

impl ViewportProvider for WindowViewport {
    fn viewport_size(&self) -> (u32, u32) {
        *self.size.read()
    }
}

impl<T> ViewportProvider for Arc<T>
where
    T: ViewportProvider + ?Sized,
{
    fn viewport_size(&self) -> (u32, u32) {
        (**self).viewport_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_viewport_tracks_updates() {
        let viewport = WindowViewport::new(1024, 768);
        assert_eq!(viewport.viewport_size(), (1024, 768));
        assert_eq!(viewport.aspect(), 1024.0 / 768.0);
        viewport.update(800, 600);
        assert_eq!(viewport.viewport_size(), (800, 600));
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        let viewport = WindowViewport::new(0, 0);
        assert_eq!(viewport.viewport_size(), (1, 1));
    }

    #[test]
    fn static_viewport_aspect_handles_zero_height() {
        assert_eq!(StaticViewport::new(640, 0).aspect(), 1.0);
    }
}
