// THEORY:
// The `TargetLocator` is the decision layer of the acquisition pipeline. Given one
// captured buffer it answers a single question: which color-matching object, if
// any, is the target this cycle?
//
// Algorithm steps:
// 1.  **Segmentation**: Build a `Mask` of pixels inside the `ColorRange`.
// 2.  **Shape Extraction**: Trace the outer boundary of every outermost connected
//     region; regions nested inside another region's hole are skipped.
// 3.  **Noise Filtering**: Drop regions whose boundary encloses `MIN_BLOB_AREA` or
//     less, then drop regions whose zeroth moment is zero (no centroid exists).
// 4.  **Ranking**: Measure each survivor's centroid distance to the buffer center.
// 5.  **Selection**: Walk candidates in extraction order. A candidate replaces the
//     current best only if it lies within `radius` and is strictly closer. The best
//     distance starts at `radius + 1`, so nothing outside the radius can win. Ties
//     keep the earlier candidate; extraction is raster-ordered, so that choice is
//     deterministic for a given frame.
//
// The locator is a pure function. "No target" is a normal answer, not an error.

use crate::core_modules::candidate_blob::CandidateBlob;
use crate::core_modules::color_range::ColorRange;
use crate::core_modules::contour::{Point, find_external_contours};
use crate::core_modules::mask::Mask;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::target::Target;

pub mod target_locator {
    use super::*;

    /// Regions enclosing this area or less are treated as noise.
    pub const MIN_BLOB_AREA: f64 = 100.0;

    /// Finds the target nearest the center of `buffer`, translated by `offset`.
    pub fn locate(
        buffer: &PixelBuffer,
        radius: i32,
        offset: (i32, i32),
        color_range: &ColorRange,
    ) -> Target {
        if buffer.is_empty() {
            return Target::invalid();
        }

        let candidates = find_candidates(buffer, color_range);
        match select_nearest(&candidates, radius) {
            Some(best) => Target::at(best.centroid.x + offset.0, best.centroid.y + offset.1),
            None => Target::invalid(),
        }
    }

    /// All regions of `buffer` matching `color_range` that pass the area and moment
    /// filters, in extraction order.
    pub fn find_candidates(buffer: &PixelBuffer, color_range: &ColorRange) -> Vec<CandidateBlob> {
        if buffer.is_empty() {
            return Vec::new();
        }

        let mask = Mask::from_buffer(buffer, color_range);
        let center = Point::new((buffer.width() / 2) as i32, (buffer.height() / 2) as i32);

        find_external_contours(&mask)
            .into_iter()
            .filter_map(|contour| {
                let area = contour.area();
                if area <= MIN_BLOB_AREA {
                    return None;
                }
                let (cx, cy) = contour.moments().centroid()?;
                let centroid = Point::new(cx as i32, cy as i32);
                Some(CandidateBlob::new(centroid, area, center))
            })
            .collect()
    }

    /// The closest candidate within `radius`, earliest first on ties.
    pub fn select_nearest(candidates: &[CandidateBlob], radius: i32) -> Option<&CandidateBlob> {
        let radius = radius as f64;
        let mut closest_distance = radius + 1.0;
        let mut best = None;

        for candidate in candidates {
            let distance = candidate.distance_to_center;
            if distance <= radius && distance < closest_distance {
                closest_distance = distance;
                best = Some(candidate);
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::target_locator::*;
    use super::*;
    use crate::core_modules::pixel::pixel::{Hsv8, Pixel};

    const BACKGROUND: Pixel = Pixel::rgb(20, 20, 40);
    const GREEN: Pixel = Pixel::rgb(0, 255, 0);

    fn scene(size: u32, squares: &[(i32, i32, u32)]) -> PixelBuffer {
        let mut buffer = PixelBuffer::filled(size, size, BACKGROUND);
        for &(x, y, side) in squares {
            buffer.fill_rect(x, y, side, side, GREEN);
        }
        buffer
    }

    #[test]
    fn empty_buffer_never_yields_a_target() {
        let ranges = [
            ColorRange::default(),
            ColorRange::new(Hsv8::new(0, 0, 0), Hsv8::new(179, 255, 255)),
        ];
        for range in ranges {
            for radius in [-1, 0, 1, 500] {
                for offset in [(0, 0), (-10, 20), (1920, 1080)] {
                    let target = locate(&PixelBuffer::empty(), radius, offset, &range);
                    assert_eq!(target, Target::invalid());
                }
            }
        }
    }

    #[test]
    fn single_square_centroid_is_translated_by_offset() {
        // 20x20 square at (60, 70): centroid (69.5, 79.5) truncates to (69, 79).
        let buffer = scene(200, &[(60, 70, 20)]);
        let target = locate(&buffer, 100, (1000, 500), &ColorRange::default());
        assert_eq!(target, Target::at(1069, 579));
    }

    #[test]
    fn blob_at_exactly_radius_is_accepted() {
        // 12x12 square starting at 125 has centroid x = 130.5 -> 130, 30px from center.
        let buffer = scene(200, &[(125, 95, 12)]);
        let target = locate(&buffer, 30, (0, 0), &ColorRange::default());
        assert_eq!(target, Target::at(130, 100));
    }

    #[test]
    fn blob_one_pixel_past_radius_is_rejected() {
        let buffer = scene(200, &[(126, 95, 12)]);
        let target = locate(&buffer, 30, (0, 0), &ColorRange::default());
        assert_eq!(target, Target::invalid());
    }

    #[test]
    fn nearest_blob_wins_regardless_of_order() {
        // The far blob is first in raster order.
        let buffer = scene(200, &[(10, 10, 15), (120, 120, 15)]);
        let candidates = find_candidates(&buffer, &ColorRange::default());
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].distance_to_center > candidates[1].distance_to_center);

        let target = locate(&buffer, 150, (5, 5), &ColorRange::default());
        assert_eq!(target, Target::at(127 + 5, 127 + 5));
    }

    #[test]
    fn equal_distances_keep_the_earlier_candidate() {
        // Mirror images around the center (100, 100): centroids (70, 100) and (130, 100).
        let buffer = scene(200, &[(125, 95, 12), (65, 95, 12)]);
        let candidates = find_candidates(&buffer, &ColorRange::default());
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].distance_to_center, candidates[1].distance_to_center);

        let best = select_nearest(&candidates, 50).expect("both in range");
        assert_eq!(best.centroid, candidates[0].centroid);
    }

    #[test]
    fn small_blobs_are_noise() {
        // 11x11 encloses exactly 100 square pixels and is discarded; 12x12 survives.
        let buffer = scene(200, &[(95, 95, 11)]);
        assert!(find_candidates(&buffer, &ColorRange::default()).is_empty());

        let buffer = scene(200, &[(95, 95, 12)]);
        let candidates = find_candidates(&buffer, &ColorRange::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].area, 121.0);
    }

    #[test]
    fn island_inside_a_hollow_outline_is_ignored() {
        // 80x80 outline, 3px thick, at (100, 60); a 15x15 island sits in its hole
        // closer to the center than the outline's own centroid.
        let mut buffer = PixelBuffer::filled(200, 200, BACKGROUND);
        buffer.fill_rect(100, 60, 80, 80, GREEN);
        buffer.fill_rect(103, 63, 74, 74, BACKGROUND);
        buffer.fill_rect(104, 93, 15, 15, GREEN);

        let candidates = find_candidates(&buffer, &ColorRange::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].centroid, Point::new(139, 99));
        assert_eq!(candidates[0].area, 6241.0);

        let target = locate(&buffer, 100, (0, 0), &ColorRange::default());
        assert_eq!(target, Target::at(139, 99));
    }

    #[test]
    fn out_of_range_colors_are_ignored() {
        let mut buffer = PixelBuffer::filled(200, 200, BACKGROUND);
        buffer.fill_rect(90, 90, 20, 20, Pixel::rgb(255, 0, 0));
        assert_eq!(locate(&buffer, 100, (0, 0), &ColorRange::default()), Target::invalid());
    }

    #[test]
    fn selection_respects_sentinel_and_radius() {
        let center = Point::new(0, 0);
        let candidates = [
            CandidateBlob::new(Point::new(11, 0), 200.0, center),
            CandidateBlob::new(Point::new(10, 0), 200.0, center),
            CandidateBlob::new(Point::new(0, 9), 200.0, center),
        ];
        assert_eq!(select_nearest(&candidates, 10).map(|c| c.centroid), Some(Point::new(0, 9)));
        assert_eq!(select_nearest(&candidates[..2], 10).map(|c| c.centroid), Some(Point::new(10, 0)));
        assert!(select_nearest(&candidates[..1], 10).is_none());
        assert!(select_nearest(&[], 10).is_none());
    }
}
