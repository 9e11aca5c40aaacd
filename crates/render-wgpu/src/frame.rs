use crate::OrbitCamera;
use showcase_render::{RenderView, Viewport};

/// Per-window view state: camera pose with its damping, and output size.
#[derive(Debug, Clone, Default)]
pub struct FrameState {
    pub camera: OrbitCamera,
    pub viewport: Viewport,
}

impl FrameState {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        let mut frame = Self::default();
        frame.resize(width, height, device_pixel_ratio);
        frame
    }

    /// Apply a window resize to both the viewport and the camera aspect.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
        self.viewport.resize(width, height, device_pixel_ratio);
        self.camera.aspect = self.viewport.aspect();
        tracing::debug!(
            width,
            height,
            pixel_ratio = self.viewport.pixel_ratio,
            "viewport resized"
        );
    }

    pub fn view(&self) -> RenderView {
        self.camera.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_aspect_and_size() {
        let mut frame = FrameState::new(1280, 720, 1.0);
        frame.resize(1000, 500, 3.0);
        assert_eq!((frame.viewport.width, frame.viewport.height), (1000, 500));
        assert_eq!(frame.viewport.pixel_ratio, 2.0);
        assert_eq!(frame.camera.aspect, 2.0);
        assert_eq!(frame.view().aspect, 2.0);
    }
}
