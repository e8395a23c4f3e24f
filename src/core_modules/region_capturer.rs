// THEORY:
// The `RegionCapturer` is the pipeline's only window onto the display. Each cycle it
// derives a square `CaptureRegion` centered on the display, clamps it so it never
// leaves the display, and asks a `DisplaySource` for a snapshot of that square.
//
// Key architectural principles:
// 1.  **Clamping before reading**: The region is pulled back inside the display
//     before any pixels are requested. The returned origin is the clamped one, so
//     absolute-coordinate math downstream stays correct near the edges.
// 2.  **Size is per-call**: Under clamping the square shrinks. Callers must read the
//     buffer's own dimensions instead of assuming `2 * radius`.
// 3.  **Failure is a value**: A missing display or a collapsed region produces an
//     empty buffer, never a panic. The locator turns that into "no target".
// 4.  **Pluggable source**: The OS capture primitive hides behind `DisplaySource`,
//     with an in-memory `SyntheticDisplay` for tests and demos.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::{CaptureError, CaptureResult};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};

/// A square window on the display, already clamped to the display bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub origin_x: i32,
    pub origin_y: i32,
    pub size: i32,
}

impl CaptureRegion {
    /// Centers a `2 * radius` square on the display and clamps it inside.
    pub fn centered(display_width: u32, display_height: u32, radius: i32) -> Self {
        let display_width = display_width.min(i32::MAX as u32) as i32;
        let display_height = display_height.min(i32::MAX as u32) as i32;
        let radius = radius.clamp(0, i32::MAX / 2);

        let mut size = radius * 2;
        let left = (display_width / 2 - radius).max(0);
        let top = (display_height / 2 - radius).max(0);

        if left + size > display_width {
            size = display_width - left;
        }
        if top + size > display_height {
            size = display_height - top;
        }

        Self {
            origin_x: left,
            origin_y: top,
            size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size <= 0
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }
}

/// A display that can report its size and hand out pixel snapshots.
pub trait DisplaySource: Send + Sync {
    /// Width and height of the display in pixels.
    fn dimensions(&self) -> CaptureResult<(u32, u32)>;

    /// Reads the given region. Implementations must return exactly
    /// `region.size × region.size` pixels or an error.
    fn snapshot(&self, region: &CaptureRegion) -> CaptureResult<PixelBuffer>;
}

/// The output of one capture: the pixels plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub buffer: PixelBuffer,
    pub region: CaptureRegion,
}

impl Capture {
    pub fn origin(&self) -> (i32, i32) {
        self.region.origin()
    }
}

pub struct RegionCapturer<S> {
    source: S,
}

impl<S: DisplaySource> RegionCapturer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Clamps the region for `radius` and reads it, reporting failures to the caller.
    pub fn try_capture(&self, radius: i32) -> CaptureResult<Capture> {
        let (width, height) = self.source.dimensions()?;
        let region = CaptureRegion::centered(width, height, radius);
        if region.is_empty() {
            return Err(CaptureError::EmptyRegion {
                origin_x: region.origin_x,
                origin_y: region.origin_y,
                size: region.size,
            });
        }

        let buffer = self.source.snapshot(&region)?;
        let expected = region.size as u32;
        if buffer.width() != expected || buffer.height() != expected {
            return Err(CaptureError::Backend(format!(
                "expected {expected}x{expected} snapshot, got {}x{}",
                buffer.width(),
                buffer.height()
            )));
        }
        Ok(Capture { buffer, region })
    }

    /// Like `try_capture`, but absorbs failures into an empty buffer.
    ///
    /// The origin of a failed capture is the clamped origin when it could be
    /// computed, `(0, 0)` otherwise.
    pub fn capture(&self, radius: i32) -> Capture {
        match self.try_capture(radius) {
            Ok(capture) => capture,
            Err(err) => {
                tracing::warn!(error = %err, radius, "capture unavailable");
                let region = match &err {
                    CaptureError::EmptyRegion {
                        origin_x,
                        origin_y,
                        size,
                    } => CaptureRegion {
                        origin_x: *origin_x,
                        origin_y: *origin_y,
                        size: *size,
                    },
                    _ => self
                        .source
                        .dimensions()
                        .map(|(w, h)| CaptureRegion::centered(w, h, radius))
                        .unwrap_or(CaptureRegion {
                            origin_x: 0,
                            origin_y: 0,
                            size: 0,
                        }),
                };
                Capture {
                    buffer: PixelBuffer::empty(),
                    region,
                }
            }
        }
    }
}

/// An in-memory display: a background color with solid rectangles painted on top.
pub struct SyntheticDisplay {
    width: u32,
    height: u32,
    background: Pixel,
    shapes: Mutex<Vec<(i32, i32, u32, u32, Pixel)>>,
    unavailable: AtomicBool,
}

impl SyntheticDisplay {
    pub fn new(width: u32, height: u32, background: Pixel) -> Self {
        Self {
            width,
            height,
            background,
            shapes: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Adds a rectangle in absolute display coordinates.
    pub fn with_rect(self, x: i32, y: i32, width: u32, height: u32, pixel: Pixel) -> Self {
        self.add_rect(x, y, width, height, pixel);
        self
    }

    pub fn add_rect(&self, x: i32, y: i32, width: u32, height: u32, pixel: Pixel) {
        self.shapes().push((x, y, width, height, pixel));
    }

    pub fn clear(&self) {
        self.shapes().clear();
    }

    /// The shape list stays usable after a panicking writer; every entry is complete.
    fn shapes(&self) -> MutexGuard<'_, Vec<(i32, i32, u32, u32, Pixel)>> {
        self.shapes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every subsequent capture fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl DisplaySource for SyntheticDisplay {
    fn dimensions(&self) -> CaptureResult<(u32, u32)> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CaptureError::Unavailable {
                reason: "synthetic display switched off".to_string(),
            });
        }
        Ok((self.width, self.height))
    }

    fn snapshot(&self, region: &CaptureRegion) -> CaptureResult<PixelBuffer> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CaptureError::Unavailable {
                reason: "synthetic display switched off".to_string(),
            });
        }
        let size = region.size.max(0) as u32;
        let mut buffer = PixelBuffer::filled(size, size, self.background);
        for &(x, y, width, height, pixel) in self.shapes().iter() {
            buffer.fill_rect(x - region.origin_x, y - region.origin_y, width, height, pixel);
        }
        Ok(buffer)
    }
}

impl<T: DisplaySource + ?Sized> DisplaySource for std::sync::Arc<T> {
    fn dimensions(&self) -> CaptureResult<(u32, u32)> {
        (**self).dimensions()
    }

    fn snapshot(&self, region: &CaptureRegion) -> CaptureResult<PixelBuffer> {
        (**self).snapshot(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const BLACK: Pixel = Pixel::rgb(0, 0, 0);
    const GREEN: Pixel = Pixel::rgb(0, 255, 0);

    #[test]
    fn centered_region_without_clamping_stays_square() {
        let region = CaptureRegion::centered(1920, 1080, 100);
        assert_eq!(region, CaptureRegion { origin_x: 860, origin_y: 440, size: 200 });
    }

    #[test]
    fn oversized_radius_is_clamped_to_display() {
        let region = CaptureRegion::centered(1920, 1080, 500);
        assert_eq!(region.origin(), (460, 40));
        assert_eq!(region.size, 1000);

        let region = CaptureRegion::centered(800, 600, 1000);
        assert_eq!(region.origin(), (0, 0));
        assert_eq!(region.size, 600);
    }

    #[test]
    fn clamped_region_never_leaves_the_display() {
        let displays = [(1, 1), (3, 7), (640, 480), (1920, 1080), (1080, 1920), (2560, 1440)];
        for (width, height) in displays {
            for radius in [-5, 0, 1, 2, 3, 50, 239, 240, 241, 500, 960, 5000] {
                let region = CaptureRegion::centered(width, height, radius);
                assert!(region.origin_x >= 0, "{width}x{height} r={radius}: {region:?}");
                assert!(region.origin_y >= 0, "{width}x{height} r={radius}: {region:?}");
                assert!(region.origin_x + region.size <= width as i32, "{width}x{height} r={radius}: {region:?}");
                assert!(region.origin_y + region.size <= height as i32, "{width}x{height} r={radius}: {region:?}");
            }
        }
    }

    #[test]
    fn zero_radius_collapses_to_empty_capture() {
        let capturer = RegionCapturer::new(SyntheticDisplay::new(100, 100, BLACK));
        assert!(matches!(capturer.try_capture(0), Err(CaptureError::EmptyRegion { .. })));

        let capture = capturer.capture(0);
        assert!(capture.buffer.is_empty());
        assert_eq!(capture.origin(), (50, 50));
    }

    #[test]
    fn capture_reads_region_relative_pixels() {
        let display = SyntheticDisplay::new(200, 100, BLACK).with_rect(100, 50, 1, 1, GREEN);
        let capturer = RegionCapturer::new(display);

        let capture = capturer.try_capture(20).expect("display available");
        assert_eq!(capture.origin(), (80, 30));
        assert_eq!((capture.buffer.width(), capture.buffer.height()), (40, 40));
        assert_eq!(capture.buffer.pixel(20, 20), Some(GREEN));
        assert_eq!(capture.buffer.pixel(19, 20), Some(BLACK));
    }

    #[test]
    fn poisoned_shape_list_keeps_working() {
        let display = SyntheticDisplay::new(10, 10, BLACK).with_rect(0, 0, 1, 1, GREEN);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = display.shapes.lock().expect("first lock");
            panic!("writer died holding the shape list");
        }));
        assert!(outcome.is_err());
        assert!(display.shapes.is_poisoned());

        display.add_rect(5, 5, 1, 1, GREEN);
        let region = CaptureRegion { origin_x: 0, origin_y: 0, size: 10 };
        let buffer = display.snapshot(&region).expect("poisoning is recovered");
        assert_eq!(buffer.pixel(0, 0), Some(GREEN));
        assert_eq!(buffer.pixel(5, 5), Some(GREEN));

        display.clear();
        let buffer = display.snapshot(&region).expect("poisoning is recovered");
        assert_eq!(buffer.pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn unavailable_display_yields_empty_buffer() {
        let display = Arc::new(SyntheticDisplay::new(200, 200, BLACK));
        let capturer = RegionCapturer::new(display.clone());

        display.set_unavailable(true);
        let capture = capturer.capture(50);
        assert!(capture.buffer.is_empty());
        assert!(matches!(capturer.try_capture(50), Err(CaptureError::Unavailable { .. })));

        display.set_unavailable(false);
        assert!(!capturer.capture(50).buffer.is_empty());
    }
}
