// THEORY:
// A `PixelBuffer` is the immutable snapshot handed from the capture layer to the
// locator. It is RGBA, row-major, top-to-bottom, and owned by exactly one
// acquisition cycle. An empty buffer is a legitimate value: it is how the capture
// layer says "nothing could be read this cycle".

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use image::RgbaImage;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A buffer of one repeated color.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        let bytes: [u8; CHANNELS] = pixel.into();
        let data = bytes.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
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

    /// The pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Pixel::try_from(&self.data[start..start + CHANNELS]).ok()
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|bytes| Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    /// Paints an axis-aligned rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, pixel: Pixel) {
        let bytes: [u8; CHANNELS] = pixel.into();
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + width as i64).min(self.width as i64);
        let y1 = (y as i64 + height as i64).min(self.height as i64);
        for row in y0..y1 {
            for col in x0..x1 {
                let start = (row as usize * self.width as usize + col as usize) * CHANNELS;
                self.data[start..start + CHANNELS].copy_from_slice(&bytes);
            }
        }
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}
