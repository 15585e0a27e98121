/// Orientation and screen projection for the terminal viewer
use nalgebra::{Point3, Rotation3, Vector3};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

/// Camera distance from the model center, in units of the model's radius.
const DISTANCE: f64 = 3.0;

/// Points closer to the camera than this are clipped.
const NEAR: f64 = 0.1;

/// Model rotation around the three axes (in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Orientation {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Rotations applied in order X, Y, Z.
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::z_axis(), self.z)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.y)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.x)
    }
}

/// Perspective view that keeps a model's bounding sphere on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    center: Point3<f64>,
    radius: f64,
    width: usize,
    height: usize,
}

impl View {
    pub fn fit(bounds: Option<(Point3<f64>, Point3<f64>)>, width: usize, height: usize) -> Self {
        let (center, radius) = match bounds {
            Some((min, max)) => (
                nalgebra::center(&min, &max),
                ((max - min).norm() / 2.0).max(f64::EPSILON),
            ),
            None => (Point3::origin(), 1.0),
        };
        Self {
            center,
            radius,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Direction toward the camera after `rotation` is applied to the model.
    pub fn eye_direction(&self) -> Vector3<f64> {
        Vector3::z()
    }

    /// Project a model-space point to `(column, row, depth)`.
    pub fn project(
        &self,
        point: &Point3<f64>,
        rotation: &Rotation3<f64>,
    ) -> Option<(f64, f64, f64)> {
        let p = rotation * ((point - self.center) / self.radius);
        let depth = DISTANCE - p.z;
        if depth < NEAR {
            return None;
        }

        let half_width = self.width as f64 / 2.0;
        let half_height = self.height as f64 / 2.0;
        // The nearest point of the unit sphere sits at depth DISTANCE - 1.
        let focal = half_height.min(half_width / CELL_ASPECT) * (DISTANCE - 1.0) * 0.9;

        Some((
            half_width + p.x / depth * focal * CELL_ASPECT,
            half_height - p.y / depth * focal,
            depth,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_screen_center() {
        let view = View::fit(
            Some((Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 5.0, 1.0))),
            80,
            24,
        );
        let (x, y, depth) = view
            .project(&Point3::new(2.0, 3.0, 1.0), &Rotation3::identity())
            .unwrap();
        assert_eq!((x, y, depth), (40.0, 12.0, DISTANCE));
    }

    #[test]
    fn test_bounding_sphere_stays_on_screen() {
        let view = View::fit(Some((Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))), 80, 24);
        let rotation = Orientation::new(0.4, 1.1, 0.2).rotation();
        for corner in [
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, -1.0, 1.0),
            Point3::new(-1.0, 1.0, -1.0),
        ] {
            let (x, y, _) = view.project(&corner, &rotation).unwrap();
            assert!((0.0..80.0).contains(&x), "x = {x}");
            assert!((0.0..24.0).contains(&y), "y = {y}");
        }
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let view = View::fit(None, 40, 20);
        let (_, above, _) = view
            .project(&Point3::new(0.0, 0.5, 0.0), &Rotation3::identity())
            .unwrap();
        assert!(above < 10.0);
    }

    #[test]
    fn test_orientation_rotates_around_y() {
        let mut orientation = Orientation::default();
        orientation.rotate(0.0, std::f64::consts::FRAC_PI_2, 0.0);
        let turned = orientation.rotation() * Vector3::x();
        assert!((turned - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }
}
