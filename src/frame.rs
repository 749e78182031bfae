//! Pixel buffer assembly.

use glam::Vec3;

/// Color written at allocation for every pixel. Miss pixels keep it; the
/// shading pass never writes them. Opaque black, chosen explicitly rather
/// than inheriting whatever the allocation held.
pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Row-major RGBA8 buffer, bottom row first (matching the ray generator's
/// upward y axis). Per-frame lifecycle: allocated, composited, handed to
/// the display layer, discarded.
pub struct Framebuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = (width * height) as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&BACKGROUND);
        }
        Framebuffer {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of pixel `index` in ray order.
    pub fn pixel(&self, index: usize) -> [u8; 4] {
        let at = index * 4;
        [
            self.data[at],
            self.data[at + 1],
            self.data[at + 2],
            self.data[at + 3],
        ]
    }

    /// Write one shaded sample (or miss) per pixel, in ray order. Hit
    /// channels are `clamp(c, 0, 1) * 255` truncated, alpha 255; misses
    /// leave the background untouched.
    pub fn composite<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = Option<Vec3>>,
    {
        let pixels = self.data.len() / 4;
        for (i, sample) in samples.into_iter().take(pixels).enumerate() {
            if let Some(color) = sample {
                let at = i * 4;
                self.data[at] = (color.x.clamp(0.0, 1.0) * 255.0) as u8;
                self.data[at + 1] = (color.y.clamp(0.0, 1.0) * 255.0) as u8;
                self.data[at + 2] = (color.z.clamp(0.0, 1.0) * 255.0) as u8;
                self.data[at + 3] = 255;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_background() {
        let frame = Framebuffer::new(3, 2);
        assert_eq!(frame.as_bytes().len(), 3 * 2 * 4);
        for i in 0..6 {
            assert_eq!(frame.pixel(i), BACKGROUND);
        }
    }

    #[test]
    fn test_composite_truncates_channels() {
        let mut frame = Framebuffer::new(1, 1);
        frame.composite([Some(Vec3::new(0.5, 1.0, 0.0))]);
        // 0.5 * 255 = 127.5 truncates to 127.
        assert_eq!(frame.pixel(0), [127, 255, 0, 255]);
    }

    #[test]
    fn test_composite_clamps_out_of_range() {
        let mut frame = Framebuffer::new(1, 1);
        frame.composite([Some(Vec3::new(2.0, -1.0, 1.0))]);
        assert_eq!(frame.pixel(0), [255, 0, 255, 255]);
    }

    #[test]
    fn test_miss_keeps_background() {
        let mut frame = Framebuffer::new(2, 1);
        frame.composite([None, Some(Vec3::ONE)]);
        assert_eq!(frame.pixel(0), BACKGROUND);
        assert_eq!(frame.pixel(1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_pixel_offsets_match_ray_order() {
        let mut frame = Framebuffer::new(2, 2);
        frame.composite([
            Some(Vec3::new(1.0, 0.0, 0.0)),
            Some(Vec3::new(0.0, 1.0, 0.0)),
            Some(Vec3::new(0.0, 0.0, 1.0)),
            None,
        ]);
        assert_eq!(&frame.as_bytes()[0..4], &[255, 0, 0, 255]);
        assert_eq!(&frame.as_bytes()[4..8], &[0, 255, 0, 255]);
        assert_eq!(&frame.as_bytes()[8..12], &[0, 0, 255, 255]);
        assert_eq!(&frame.as_bytes()[12..16], &BACKGROUND);
    }
}
