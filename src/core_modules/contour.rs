// THEORY:
// The `contour` module is the shape-analysis layer. It takes the binary `Mask` and
// turns it into a list of outer boundaries, one per connected region, plus the
// geometry the locator needs from each boundary: enclosed area and centroid.
//
// Key architectural principles & algorithm steps:
// 1.  **Component Discovery**: The mask is scanned in raster order. Every unvisited
//     set cell seeds a flood fill over its 8-connected neighborhood, so diagonal
//     touches join regions. The seed is always the top-most, left-most cell of its
//     region, which guarantees its west and northern neighbors are clear.
// 2.  **Boundary Tracing**: From the seed, a Moore-neighbor walk follows the outer
//     edge clockwise, always resuming the scan from the last clear cell it saw. The
//     walk ends when it re-enters the seed heading for the same second cell it
//     visited first. Holes are never traced; only the outer edge matters.
// 3.  **Polygon Geometry**: The traced cells are treated as polygon vertices at
//     pixel centers. Area and the zeroth/first moments come from Green's theorem,
//     so a filled `n × n` square has area `(n - 1)²` and its centroid at its middle.
// 4.  **Outermost Only**: Clear cells 4-connected to the mask border form the outer
//     background. A region is kept only if the clear cell west of its seed belongs
//     to that background; regions sitting inside another region's hole are dropped,
//     along with anything nested deeper.
// 5.  **Stable Order**: Contours come out in raster order of their seeds, so the same
//     mask always yields the same list in the same order.

use crate::core_modules::mask::Mask;

/// An integer pixel coordinate, local to the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn offset(self, (dx, dy): (i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Clockwise (in y-down image space), starting east.
const NEIGHBORS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Zeroth and first spatial moments of a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// `(m10 / m00, m01 / m00)`, or `None` for a degenerate region.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// The outer boundary of one connected region of the mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Boundary cells in clockwise walk order. A cell may repeat where the region is
    /// one pixel wide.
    pub points: Vec<Point>,
    /// Number of mask cells in the region, holes excluded.
    pub pixel_count: usize,
}

impl Contour {
    /// Area enclosed by the boundary polygon (always non-negative).
    pub fn area(&self) -> f64 {
        self.moments().m00.abs()
    }

    /// Polygon moments via Green's theorem; orientation is normalized so `m00 >= 0`.
    pub fn moments(&self) -> Moments {
        let count = self.points.len();
        if count < 3 {
            return Moments::default();
        }

        let (mut a00, mut a10, mut a01) = (0.0f64, 0.0f64, 0.0f64);
        for (i, current) in self.points.iter().enumerate() {
            let next = self.points[(i + 1) % count];
            let (xi, yi) = (current.x as f64, current.y as f64);
            let (xj, yj) = (next.x as f64, next.y as f64);
            let cross = xi * yj - xj * yi;
            a00 += cross;
            a10 += cross * (xi + xj);
            a01 += cross * (yi + yj);
        }

        if a00 == 0.0 {
            return Moments::default();
        }
        let sign = a00.signum();
        Moments {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }
}

/// Finds the outer boundary of every outermost 8-connected region in `mask`, in
/// raster order. Regions enclosed by another region are not reported.
pub fn find_external_contours(mask: &Mask) -> Vec<Contour> {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let outside = outer_background(mask);
    let mut visited = vec![false; width * height];
    let mut contours = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || !mask.is_set(x as i64, y as i64) {
                continue;
            }
            let seed = Point::new(x as i32, y as i32);
            let pixel_count = flood_region(mask, seed, &mut visited);
            // The seed is top-most then left-most, so its west cell is clear.
            if x > 0 && !outside[y * width + x - 1] {
                continue;
            }
            let points = trace_boundary(mask, seed, pixel_count);
            contours.push(Contour {
                points,
                pixel_count,
            });
        }
    }

    contours
}

/// Marks the clear cells reachable from the mask border through 4-connected steps.
fn outer_background(mask: &Mask) -> Vec<bool> {
    let width = mask.width() as i32;
    let height = mask.height() as i32;
    let mut outside = vec![false; (width as usize) * (height as usize)];
    let mut stack = Vec::new();

    let enqueue = |point: Point, outside: &mut Vec<bool>, stack: &mut Vec<Point>| {
        if point.x < 0 || point.y < 0 || point.x >= width || point.y >= height {
            return;
        }
        let index = point.y as usize * width as usize + point.x as usize;
        if !outside[index] && !mask.is_set(point.x as i64, point.y as i64) {
            outside[index] = true;
            stack.push(point);
        }
    };

    for x in 0..width {
        enqueue(Point::new(x, 0), &mut outside, &mut stack);
        enqueue(Point::new(x, height - 1), &mut outside, &mut stack);
    }
    for y in 0..height {
        enqueue(Point::new(0, y), &mut outside, &mut stack);
        enqueue(Point::new(width - 1, y), &mut outside, &mut stack);
    }

    while let Some(current) = stack.pop() {
        for step in [(1, 0), (0, 1), (-1, 0), (0, -1)] {
            enqueue(current.offset(step), &mut outside, &mut stack);
        }
    }

    outside
}

/// Marks every cell 8-connected to `seed` as visited and returns how many there were.
fn flood_region(mask: &Mask, seed: Point, visited: &mut [bool]) -> usize {
    let width = mask.width() as usize;
    let mut stack = vec![seed];
    visited[seed.y as usize * width + seed.x as usize] = true;
    let mut count = 0;

    while let Some(current) = stack.pop() {
        count += 1;
        for step in NEIGHBORS {
            let next = current.offset(step);
            if !mask.is_set(next.x as i64, next.y as i64) {
                continue;
            }
            let index = next.y as usize * width + next.x as usize;
            if !visited[index] {
                visited[index] = true;
                stack.push(next);
            }
        }
    }

    count
}

fn direction_between(from: Point, to: Point) -> usize {
    let delta = (to.x - from.x, to.y - from.y);
    NEIGHBORS
        .iter()
        .position(|&step| step == delta)
        .unwrap_or(4)
}

/// One Moore step: scans clockwise from the clear cell `backtrack` and returns the
/// first set neighbor together with the clear cell examined just before it.
fn moore_step(mask: &Mask, current: Point, backtrack: Point) -> Option<(Point, Point)> {
    let start = direction_between(current, backtrack);
    let mut previous = backtrack;
    for turn in 1..NEIGHBORS.len() {
        let candidate = current.offset(NEIGHBORS[(start + turn) % NEIGHBORS.len()]);
        if mask.is_set(candidate.x as i64, candidate.y as i64) {
            return Some((candidate, previous));
        }
        previous = candidate;
    }
    None
}

fn trace_boundary(mask: &Mask, seed: Point, pixel_count: usize) -> Vec<Point> {
    let west = seed.offset((-1, 0));
    let Some((second, second_backtrack)) = moore_step(mask, seed, west) else {
        return vec![seed];
    };

    // Each boundary cell is entered at most once per incident edge.
    let limit = pixel_count * 4 + NEIGHBORS.len();
    let mut points = vec![seed];
    let (mut current, mut backtrack) = (second, second_backtrack);

    while points.len() <= limit {
        let Some((next, next_backtrack)) = moore_step(mask, current, backtrack) else {
            break;
        };
        if current == seed && next == second {
            break;
        }
        points.push(current);
        current = next;
        backtrack = next_backtrack;
    }

    points
}
