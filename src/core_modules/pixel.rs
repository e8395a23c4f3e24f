// THEORY (Single-Pixel Color Heuristics):
// The `Pixel` module is the most fundamental unit of the acquisition pipeline. It is
// a "dumb" data container for one captured RGBA pixel plus the single-pixel color
// transform the segmentation layer needs. Nothing here knows about neighbors;
// grouping pixels into blobs is the job of the `contour` module.
//
// Color ranges are written on the 8-bit HSV scale (`Hsv8`): hue halved into
// 0..=179, saturation and value scaled to 0..=255. The conversion is integer
// fixed-point: hue and saturation are multiplied by precomputed reciprocal tables
// (12 fractional bits, one entry per possible divisor) and rounded half-up by a
// shift. Hand-tuned color bounds then select the same pixels they select in other
// vision toolkits using the same tables, including right at the range edges.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;

    pub const CHANNELS: usize = 4;
    /// Exclusive upper bound of the 8-bit hue scale.
    pub const HUE8_RANGE: i32 = 180;

    const HSV_SHIFT: u32 = 12;
    const HSV_HALF: i32 = 1 << (HSV_SHIFT - 1);

    /// `round(numerator / (scale * i))` for every `i` in `1..=255`, zero at `0`.
    const fn reciprocal_table(numerator: i32, scale: i32) -> [i32; 256] {
        let mut table = [0; 256];
        let mut i = 1;
        while i < 256 {
            let divisor = scale * i as i32;
            table[i] = (2 * numerator + divisor) / (2 * divisor);
            i += 1;
        }
        table
    }

    /// `255 / value` in fixed point.
    const SATURATION_TABLE: [i32; 256] = reciprocal_table(255 << HSV_SHIFT, 1);
    /// `180 / (6 * difference)` in fixed point.
    const HUE_TABLE: [i32; 256] = reciprocal_table(HUE8_RANGE << HSV_SHIFT, 6);

    /// A captured pixel. Alpha is carried along as padding and never inspected.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        pub alpha: Channel,
    }

    /// Hue/saturation/value on the 8-bit scale (H 0..=179, S and V 0..=255).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Hsv8 {
        pub hue: u8,
        pub saturation: u8,
        pub value: u8,
    }

    impl Hsv8 {
        pub const fn new(hue: u8, saturation: u8, value: u8) -> Self {
            Self {
                hue,
                saturation,
                value,
            }
        }
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        pub const fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            Self::new(red, green, blue, 255)
        }

        #[inline]
        fn max_channel(&self) -> Channel {
            self.red.max(self.green.max(self.blue))
        }

        #[inline]
        fn min_channel(&self) -> Channel {
            self.red.min(self.green.min(self.blue))
        }

        /// Converts to the 8-bit HSV scale used by color ranges.
        pub fn to_hsv8(&self) -> Hsv8 {
            let value = self.max_channel();
            let difference = (value - self.min_channel()) as usize;
            let (red, green, blue) = (self.red as i32, self.green as i32, self.blue as i32);
            let spread = difference as i32;

            let saturation = (spread * SATURATION_TABLE[value as usize] + HSV_HALF) >> HSV_SHIFT;

            // Hue in units of `difference`, spanning six sectors.
            let sectors = if value == self.red {
                green - blue
            } else if value == self.green {
                blue - red + 2 * spread
            } else {
                red - green + 4 * spread
            };
            let mut hue = (sectors * HUE_TABLE[difference] + HSV_HALF) >> HSV_SHIFT;
            if hue < 0 {
                hue += HUE8_RANGE;
            }

            Hsv8 {
                hue: hue as u8,
                saturation: saturation as u8,
                value,
            }
        }
    }

    impl TryFrom<&[Byte]> for Pixel {
        type Error = usize;

        /// Reads one RGBA pixel; the error carries the offending slice length.
        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            match bytes {
                [red, green, blue, alpha] => Ok(Pixel::new(*red, *green, *blue, *alpha)),
                _ => Err(bytes.len()),
            }
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }
}
