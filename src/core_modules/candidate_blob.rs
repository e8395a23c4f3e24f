// THEORY:
// A `CandidateBlob` is one connected region that survived the noise filters and is
// now competing to become the target. It is a transient, per-cycle summary: it
// lives only inside a single locator call and carries just enough to rank it
// (its centroid in region-local pixels, its area, and how far it sits from the
// capture center).

use crate::core_modules::contour::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateBlob {
    /// Centroid in capture-region pixels, truncated toward zero.
    pub centroid: Point,
    /// Area enclosed by the blob's outer boundary.
    pub area: f64,
    /// Euclidean distance from `centroid` to the capture center.
    pub distance_to_center: f64,
}

impl CandidateBlob {
    pub fn new(centroid: Point, area: f64, center: Point) -> Self {
        let dx = (centroid.x - center.x) as f64;
        let dy = (centroid.y - center.y) as f64;
        Self {
            centroid,
            area,
            distance_to_center: (dx * dx + dy * dy).sqrt(),
        }
    }
}
