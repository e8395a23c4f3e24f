// THEORY:
// The `Mask` is the segmentation layer: a binary image the size of the captured
// buffer in which a cell is set exactly when its pixel falls inside the target
// `ColorRange`. It is the bridge between color analysis (single pixel) and shape
// analysis (connected regions), and it is rebuilt from scratch every cycle.

use crate::core_modules::color_range::ColorRange;
use crate::core_modules::pixel_buffer::PixelBuffer;
use image::GrayImage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Mask {
    /// Marks every pixel of `buffer` whose HSV form lies inside `range`.
    pub fn from_buffer(buffer: &PixelBuffer, range: &ColorRange) -> Self {
        let cells = if range.is_empty() {
            vec![false; buffer.width() as usize * buffer.height() as usize]
        } else {
            buffer.pixels().map(|pixel| range.contains(&pixel)).collect()
        };
        Self {
            width: buffer.width(),
            height: buffer.height(),
            cells,
        }
    }

    /// Builds a mask from rows of `'#'` (set) and anything else (clear).
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as u32;
        let mut cells = vec![false; width as usize * height as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                cells[y * width as usize + x] = ch == '#';
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `(x, y)` is set. Anything outside the mask reads as clear.
    #[inline]
    pub fn is_set(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    /// Set cells become white, clear cells black.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let set = self.cells[y as usize * self.width as usize + x as usize];
            image::Luma([if set { 255 } else { 0 }])
        })
    }
}
