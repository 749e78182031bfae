//! Hit resolution and direct lighting.

use glam::Vec3;

use crate::isect::Hit;
use crate::scene::Scene;

/// A hit resolved into world space: interpolated position and normal plus
/// the face's diffuse reflectance.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub diffuse: Vec3,
}

/// Barycentric interpolation of a 3-float vertex attribute over face
/// `prim_id`: `A0 * (1 - u - v) + A1 * u + A2 * v` in corner index order.
/// Exact at the corners, affine elsewhere. Weights are trusted as the
/// device provided them; no clamping or renormalization.
pub fn lerp_attribute(values: &[f32], indices: &[u32], prim_id: usize, u: f32, v: f32) -> Vec3 {
    let corner = |c: usize| {
        let at = indices[prim_id * 3 + c] as usize * 3;
        Vec3::new(values[at], values[at + 1], values[at + 2])
    };
    corner(0) * (1.0 - u - v) + corner(1) * u + corner(2) * v
}

/// Resolve a hit record against the scene, or `None` for the miss
/// sentinel. Non-sentinel ids must index a registered shape and an
/// in-bounds face; that invariant is the device's to uphold.
///
/// A zero-length interpolated normal (degenerate geometry) is not checked
/// and produces non-finite shading for that pixel, not a crash.
pub fn resolve_hit(scene: &Scene, hit: &Hit) -> Option<SurfacePoint> {
    if hit.is_miss() {
        return None;
    }
    let mesh = &scene.meshes[hit.shape_id as usize];
    let prim = hit.prim_id as usize;
    let (u, v) = (hit.uvwt[0], hit.uvwt[1]);

    let position = lerp_attribute(&mesh.positions, &mesh.indices, prim, u, v);
    let normal = lerp_attribute(&mesh.normals, &mesh.indices, prim, u, v).normalize();
    let material = scene.materials[mesh.material_ids[prim] as usize];

    Some(SurfacePoint {
        position,
        normal,
        diffuse: material.diffuse,
    })
}

/// Lambertian radiance against a single point light:
/// `max(0, dot(n, normalize(L - p))) * diffuse`. No ambient term, no
/// shadowing, no specular. Pure function.
pub fn shade_direct(point: &SurfacePoint, light: Vec3) -> Vec3 {
    let light_dir = (light - point.position).normalize();
    point.diffuse * point.normal.dot(light_dir).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isect::{Hit, NULL_ID};
    use crate::scene::{Material, Mesh, Scene};

    fn triangle_scene() -> Scene {
        Scene {
            meshes: vec![Mesh {
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                normals: vec![0.0, 0.0, -1.0, 0.0, 0.0, -1.0, 0.0, 0.0, -1.0],
                indices: vec![0, 1, 2],
                material_ids: vec![0],
            }],
            materials: vec![Material { diffuse: Vec3::ONE }],
            light: Vec3::new(0.0, 0.0, -5.0),
        }
    }

    fn hit(u: f32, v: f32) -> Hit {
        Hit {
            uvwt: [u, v, 1.0 - u - v, 1.0],
            shape_id: 0,
            prim_id: 0,
            _pad: [0; 2],
        }
    }

    #[test]
    fn test_interpolation_exact_at_corners() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let indices = [0u32, 1, 2];
        let a0 = lerp_attribute(&values, &indices, 0, 0.0, 0.0);
        let a1 = lerp_attribute(&values, &indices, 0, 1.0, 0.0);
        let a2 = lerp_attribute(&values, &indices, 0, 0.0, 1.0);
        assert!((a0 - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
        assert!((a1 - Vec3::new(4.0, 5.0, 6.0)).length() < 1e-6);
        assert!((a2 - Vec3::new(7.0, 8.0, 9.0)).length() < 1e-6);
    }

    #[test]
    fn test_interpolation_mean_at_centroid() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let indices = [0u32, 1, 2];
        let third = 1.0 / 3.0;
        let centroid = lerp_attribute(&values, &indices, 0, third, third);
        assert!((centroid - Vec3::new(4.0, 5.0, 6.0)).length() < 1e-5);
    }

    #[test]
    fn test_resolve_miss_is_none() {
        let scene = triangle_scene();
        let miss = Hit {
            uvwt: [0.0; 4],
            shape_id: NULL_ID,
            prim_id: NULL_ID,
            _pad: [0; 2],
        };
        assert!(resolve_hit(&scene, &miss).is_none());
    }

    #[test]
    fn test_resolve_interpolates_and_normalizes() {
        let scene = triangle_scene();
        let point = resolve_hit(&scene, &hit(0.5, 0.0)).unwrap();
        assert!((point.position - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        assert!((point.normal.length() - 1.0).abs() < 1e-6);
        assert_eq!(point.diffuse, Vec3::ONE);
    }

    #[test]
    fn test_shade_full_white_when_light_along_normal() {
        let scene = triangle_scene();
        let third = 1.0 / 3.0;
        let point = resolve_hit(&scene, &hit(third, third)).unwrap();
        // Light sits on the normal through the centroid.
        let light = point.position + point.normal * 5.0;
        let radiance = shade_direct(&point, light);
        assert!((radiance - Vec3::ONE).length() < 1e-5);
    }

    #[test]
    fn test_shade_zero_when_light_behind_surface() {
        let point = SurfacePoint {
            position: Vec3::ZERO,
            normal: Vec3::new(0.0, 0.0, -1.0),
            diffuse: Vec3::ONE,
        };
        let radiance = shade_direct(&point, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(radiance, Vec3::ZERO);
        // Grazing: dot exactly zero.
        let grazing = shade_direct(&point, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(grazing, Vec3::ZERO);
    }

    #[test]
    fn test_shade_non_negative() {
        let point = SurfacePoint {
            position: Vec3::new(1.0, -2.0, 3.0),
            normal: Vec3::new(0.3, -0.8, 0.52).normalize(),
            diffuse: Vec3::new(0.2, 0.9, 0.4),
        };
        for light in [
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(-5.0, -5.0, -5.0),
            Vec3::new(0.0, 100.0, 0.0),
        ] {
            let radiance = shade_direct(&point, light);
            assert!(radiance.min_element() >= 0.0);
        }
    }

    #[test]
    fn test_shade_idempotent() {
        let point = SurfacePoint {
            position: Vec3::new(0.1, 0.2, 0.3),
            normal: Vec3::Y,
            diffuse: Vec3::new(0.5, 0.6, 0.7),
        };
        let light = Vec3::new(1.0, 4.0, -2.0);
        assert_eq!(shade_direct(&point, light), shade_direct(&point, light));
    }
}
