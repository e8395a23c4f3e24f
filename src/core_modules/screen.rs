// THEORY:
// `ScreenSource` is the real display behind the `DisplaySource` seam, backed by
// `xcap`. It remembers which monitor to read by index and re-resolves it for every
// grab, so the source itself holds no platform handles and can be shared across
// threads. Each snapshot grabs the monitor and crops the requested square out of it.
//
// Monitor enumeration is the expensive part, so it happens once per snapshot. The
// reported dimensions are the ones seen in the most recent frame; after a resolution
// change the next snapshot fails its bounds check and refreshes them.

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region_capturer::{CaptureRegion, DisplaySource};
use crate::error::{CaptureError, CaptureResult};
use image::imageops;
use std::sync::{Mutex, PoisonError};

pub struct ScreenSource {
    monitor_index: usize,
    dimensions: Mutex<(u32, u32)>,
}

impl ScreenSource {
    /// Uses the primary monitor, or the first one when none is flagged primary.
    pub fn primary() -> CaptureResult<Self> {
        let monitors = xcap::Monitor::all().map_err(unavailable)?;
        if monitors.is_empty() {
            return Err(CaptureError::Unavailable {
                reason: "no monitors reported".to_string(),
            });
        }
        let monitor_index = monitors
            .iter()
            .position(|monitor| monitor.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = &monitors[monitor_index];
        let dimensions = (
            monitor.width().map_err(unavailable)?,
            monitor.height().map_err(unavailable)?,
        );
        Ok(Self {
            monitor_index,
            dimensions: Mutex::new(dimensions),
        })
    }

    fn remember(&self, dimensions: (u32, u32)) {
        *self.dimensions.lock().unwrap_or_else(PoisonError::into_inner) = dimensions;
    }

    fn monitor(&self) -> CaptureResult<xcap::Monitor> {
        xcap::Monitor::all()
            .map_err(unavailable)?
            .into_iter()
            .nth(self.monitor_index)
            .ok_or_else(|| CaptureError::Unavailable {
                reason: format!("monitor {} disappeared", self.monitor_index),
            })
    }
}

fn unavailable(err: impl std::fmt::Display) -> CaptureError {
    CaptureError::Unavailable {
        reason: err.to_string(),
    }
}

impl DisplaySource for ScreenSource {
    fn dimensions(&self) -> CaptureResult<(u32, u32)> {
        Ok(*self.dimensions.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn snapshot(&self, region: &CaptureRegion) -> CaptureResult<PixelBuffer> {
        let frame = self.monitor()?.capture_image().map_err(unavailable)?;
        self.remember(frame.dimensions());
        let size = region.size.max(0) as u32;
        let (x, y) = (region.origin_x.max(0) as u32, region.origin_y.max(0) as u32);
        if x + size > frame.width() || y + size > frame.height() {
            return Err(CaptureError::Backend(format!(
                "region {size}px at ({x}, {y}) exceeds {}x{} frame",
                frame.width(),
                frame.height()
            )));
        }
        let cropped = imageops::crop_imm(&frame, x, y, size, size).to_image();
        Ok(PixelBuffer::from(cropped))
    }
}
