/// Upper bound on the device pixel ratio used for the drawing buffer.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Output surface size in logical pixels plus the pixel ratio applied to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        let mut viewport = Self {
            width: 1,
            height: 1,
            pixel_ratio: 1.0,
        };
        viewport.resize(width, height, device_pixel_ratio);
        viewport
    }

    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
        self.width = width;
        self.height = height;
        self.pixel_ratio = device_pixel_ratio.clamp(f32::MIN_POSITIVE, MAX_PIXEL_RATIO);
    }

    /// Width over height; 1 for a degenerate (zero-height) viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Size of the backing buffer in physical pixels, at least 1x1.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_sets_size_and_aspect() {
        let mut v = Viewport::default();
        v.resize(800, 400, 1.0);
        assert_eq!((v.width, v.height), (800, 400));
        assert_eq!(v.aspect(), 2.0);
        assert_eq!(v.drawing_buffer_size(), (800, 400));
    }

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        let v = Viewport::new(100, 50, 3.0);
        assert_eq!(v.pixel_ratio, 2.0);
        assert_eq!(v.drawing_buffer_size(), (200, 100));

        let v = Viewport::new(100, 50, 1.5);
        assert_eq!(v.pixel_ratio, 1.5);
        assert_eq!(v.drawing_buffer_size(), (150, 75));
    }

    #[test]
    fn zero_size_stays_drawable() {
        let v = Viewport::new(0, 0, 1.0);
        assert_eq!(v.aspect(), 1.0);
        assert_eq!(v.drawing_buffer_size(), (1, 1));
    }
}
