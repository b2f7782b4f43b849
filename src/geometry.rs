//! Pure planar geometry over integer pixel coordinates.

use crate::Point;

#[inline]
fn ccw(p: &Point, q: &Point, r: &Point) -> bool {
    // differences span up to 2^33, products up to 2^66
    let (px, py) = (p.x as i128, p.y as i128);
    let (qx, qy) = (q.x as i128, q.y as i128);
    let (rx, ry) = (r.x as i128, r.y as i128);

    (ry - py) * (qx - px) > (qy - py) * (rx - px)
}

/// True iff segment `ab` crosses segment `cd`.
///
/// Orientation test only: collinear and degenerate (zero length) inputs are
/// reported as non-intersecting. Touching at an endpoint may go either way.
pub fn segments_intersect(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// Ray-casting containment test. Works for non-convex polygons, points lying
/// exactly on an edge can be classified either way.
pub fn point_in_polygon(p: &Point, poly: &[Point]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }

    let (x, y) = (p.x as f64, p.y as f64);
    let mut inside = false;
    let mut p1 = poly[n - 1];

    for &p2 in poly {
        let (x1, y1) = (p1.x as f64, p1.y as f64);
        let (x2, y2) = (p2.x as f64, p2.y as f64);

        if (y1 > y) != (y2 > y) {
            let xints = (x2 - x1) * (y - y1) / (y2 - y1) + x1;
            if x < xints {
                inside = !inside;
            }
        }

        p1 = p2;
    }

    inside
}
