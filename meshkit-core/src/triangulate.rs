//! Ear-cutting triangulation for planar (or nearly planar) polygons.
//!
//! The polygon is projected onto the coordinate plane its Newell normal is
//! most aligned with, then ears are clipped one at a time. Degenerate or
//! self-intersecting input falls back to a fan over whatever is left.

use nalgebra::{Point2, Point3, Vector3};

const EPSILON: f64 = 1e-12;

/// Triangulate a polygon given by its corner positions.
///
/// Returned triangles index into `points` and keep the polygon's winding.
pub fn cut_ears(points: &[Point3<f64>]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    if n == 3 {
        return vec![[0, 1, 2]];
    }

    let normal = newell_normal(points);
    if normal.norm_squared() < EPSILON {
        log::debug!("degenerate {n}-gon, falling back to fan triangulation");
        return fan(&(0..n).collect::<Vec<_>>());
    }

    let projected = project(points, &normal);
    let orientation = signed_area(&projected).signum();

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);
    let mut i = 0;
    let mut misses = 0;

    while remaining.len() > 3 {
        let len = remaining.len();
        let prev = remaining[(i + len - 1) % len];
        let cur = remaining[i % len];
        let next = remaining[(i + 1) % len];

        if is_ear(&projected, &remaining, prev, cur, next, orientation) {
            triangles.push([prev, cur, next]);
            remaining.remove(i % len);
            misses = 0;
            i %= remaining.len();
        } else {
            i = (i + 1) % len;
            misses += 1;
            if misses > len {
                log::debug!("no ear left in {len} remaining corners, finishing with a fan");
                triangles.extend(fan(&remaining));
                return triangles;
            }
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

fn fan(corners: &[usize]) -> Vec<[usize; 3]> {
    (1..corners.len().saturating_sub(1))
        .map(|k| [corners[0], corners[k], corners[k + 1]])
        .collect()
}

fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Drop the axis the normal is most aligned with.
fn project(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let axis = normal.iamax();
    points
        .iter()
        .map(|p| match axis {
            0 => Point2::new(p.y, p.z),
            1 => Point2::new(p.z, p.x),
            _ => Point2::new(p.x, p.y),
        })
        .collect()
}

fn signed_area(points: &[Point2<f64>]) -> f64 {
    let mut area = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        area += a.x * b.y - b.x * a.y;
    }
    area * 0.5
}

fn cross(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn is_ear(
    points: &[Point2<f64>],
    remaining: &[usize],
    prev: usize,
    cur: usize,
    next: usize,
    orientation: f64,
) -> bool {
    let (a, b, c) = (&points[prev], &points[cur], &points[next]);
    if cross(a, b, c) * orientation <= EPSILON {
        return false;
    }

    remaining
        .iter()
        .filter(|&&k| k != prev && k != cur && k != next)
        .map(|&k| &points[k])
        .filter(|p| *p != a && *p != b && *p != c)
        .all(|p| !contains(a, b, c, p, orientation))
}

fn contains(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    p: &Point2<f64>,
    orientation: f64,
) -> bool {
    cross(a, b, p) * orientation >= 0.0
        && cross(b, c, p) * orientation >= 0.0
        && cross(c, a, p) * orientation >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(points: &[Point3<f64>], tri: &[usize; 3]) -> f64 {
        let (a, b, c) = (points[tri[0]], points[tri[1]], points[tri[2]]);
        (b - a).cross(&(c - a)).z * 0.5
    }

    #[test]
    fn test_triangle_is_passed_through() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert_eq!(cut_ears(&points), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_concave_pentagon() {
        // Corner 3 is reflex; a fan from corner 0 would produce a flipped triangle.
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let triangles = cut_ears(&points);
        assert_eq!(triangles.len(), 3);

        let total: f64 = triangles.iter().map(|t| area(&points, t)).sum();
        assert!((total - 10.0).abs() < 1e-9);
        for tri in &triangles {
            assert!(area(&points, tri) > 0.0, "flipped triangle {tri:?}");
        }
    }

    #[test]
    fn test_clockwise_polygon_keeps_winding() {
        let points = [
            Point3::new(0.0, 4.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let triangles = cut_ears(&points);
        assert_eq!(triangles.len(), 3);
        for tri in &triangles {
            assert!(area(&points, tri) < 0.0);
        }
    }

    #[test]
    fn test_vertical_hexagon() {
        // Lies in the x = 1 plane, so the projection must drop x.
        let points: Vec<_> = (0..6)
            .map(|k| {
                let angle = k as f64 * std::f64::consts::PI / 3.0;
                Point3::new(1.0, angle.cos(), angle.sin())
            })
            .collect();
        assert_eq!(cut_ears(&points).len(), 4);
    }

    #[test]
    fn test_degenerate_polygon_falls_back_to_fan() {
        let points = [Point3::new(1.0, 1.0, 1.0); 5];
        assert_eq!(cut_ears(&points), vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }
}
