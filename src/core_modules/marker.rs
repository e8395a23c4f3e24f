// THEORY:
// The render collaborator only needs to know where to draw. `TargetMarker` is that
// answer: a square outline centered on a valid target, in display coordinates.
// Invalid targets, including the `(-1, -1)` sentinel, produce no marker at all, so a
// renderer can simply skip drawing when it gets `None`.

use crate::core_modules::target::Target;

pub const DEFAULT_MARKER_SIZE: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetMarker {
    pub top_left: (f32, f32),
    pub bottom_right: (f32, f32),
}

impl TargetMarker {
    pub fn for_target(target: &Target, size: f32) -> Option<Self> {
        let (x, y) = target.position()?;
        let half = size / 2.0;
        Some(Self {
            top_left: (x as f32 - half, y as f32 - half),
            bottom_right: (x as f32 + half, y as f32 + half),
        })
    }
}
