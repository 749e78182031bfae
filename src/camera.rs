//! Primary ray generation from a pinhole camera.

use glam::Vec3;

use crate::isect::Ray;

/// Pinhole camera with a fixed image plane at z = 1 spanning
/// x in [-1, 1) and y in [0, 2).
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    /// Maximum hit distance, stored in each ray's origin.w.
    pub max_t: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            position: Vec3::new(0.0, 1.0, 3.0),
            max_t: 1000.0,
        }
    }
}

impl Camera {
    /// One ray per pixel in row-major order: row 0 is the first `width`
    /// rays. Directions are left unnormalized. Pure function of
    /// `(width, height, self)`; identical inputs yield identical output.
    pub fn generate_primary_rays(&self, width: u32, height: u32) -> Vec<Ray> {
        let xstep = 2.0 / width as f32;
        let ystep = 2.0 / height as f32;
        let c = self.position;

        let mut rays = Vec::with_capacity((width * height) as usize);
        for i in 0..height {
            for j in 0..width {
                let x = -1.0 + xstep * j as f32;
                let y = ystep * i as f32;
                let z = 1.0;
                rays.push(Ray {
                    origin: [c.x, c.y, c.z, self.max_t],
                    direction: [x - c.x, y - c.y, z - c.z, 0.0],
                });
            }
        }
        rays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_count_and_row_major_order() {
        let camera = Camera::default();
        let rays = camera.generate_primary_rays(4, 3);
        assert_eq!(rays.len(), 12);
        // Pixel (j=1, i=0) is the second ray.
        let x = -1.0 + 1.0 * (2.0 / 4.0);
        assert_eq!(rays[1].direction[0], x - camera.position.x);
        // Pixel (j=0, i=1) starts the second row.
        let y = 1.0 * (2.0 / 3.0);
        assert_eq!(rays[4].direction[1], y - camera.position.y);
    }

    #[test]
    fn test_determinism() {
        let camera = Camera {
            position: Vec3::new(0.3, -1.2, 7.5),
            max_t: 42.0,
        };
        let a = camera.generate_primary_rays(17, 9);
        let b = camera.generate_primary_rays(17, 9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_origin_and_max_t() {
        let camera = Camera::default();
        let rays = camera.generate_primary_rays(2, 2);
        for ray in &rays {
            assert_eq!(ray.origin[0], 0.0);
            assert_eq!(ray.origin[1], 1.0);
            assert_eq!(ray.origin[2], 3.0);
            assert_eq!(ray.origin[3], 1000.0);
        }
    }

    #[test]
    fn test_direction_is_plane_point_minus_position() {
        let camera = Camera::default();
        let rays = camera.generate_primary_rays(2, 2);
        // Pixel (0, 0): plane point (-1, 0, 1).
        assert_eq!(rays[0].direction, [-1.0, -1.0, -2.0, 0.0]);
    }
}
