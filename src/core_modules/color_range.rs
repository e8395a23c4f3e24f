// THEORY:
// A `ColorRange` is the entire definition of "what a target looks like". It is a
// box in 8-bit HSV space, inclusive on every face, and it is the only input the
// segmentation step needs besides the pixels themselves.

use crate::core_modules::pixel::pixel::{Hsv8, Pixel};

/// Inclusive lower/upper HSV bounds on the 8-bit scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    pub lower: Hsv8,
    pub upper: Hsv8,
}

impl ColorRange {
    pub const fn new(lower: Hsv8, upper: Hsv8) -> Self {
        Self { lower, upper }
    }

    pub fn contains_hsv(&self, hsv: Hsv8) -> bool {
        (self.lower.hue..=self.upper.hue).contains(&hsv.hue)
            && (self.lower.saturation..=self.upper.saturation).contains(&hsv.saturation)
            && (self.lower.value..=self.upper.value).contains(&hsv.value)
    }

    pub fn contains(&self, pixel: &Pixel) -> bool {
        self.contains_hsv(pixel.to_hsv8())
    }

    /// True when no color can satisfy the bounds on some channel.
    pub fn is_empty(&self) -> bool {
        self.lower.hue > self.upper.hue
            || self.lower.saturation > self.upper.saturation
            || self.lower.value > self.upper.value
    }
}

impl Default for ColorRange {
    /// Saturated, bright green.
    fn default() -> Self {
        Self::new(Hsv8::new(55, 200, 200), Hsv8::new(70, 255, 255))
    }
}
