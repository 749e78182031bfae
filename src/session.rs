//! One batch intersection query per frame, from upload to host readback.

use crate::error::IsectError;
use crate::isect::{Hit, IntersectDevice, Ray};

/// Owns the request/response protocol against the intersection device for
/// a single frame: upload rays and an uninitialized result buffer, issue
/// the query, block on the completion, map-read the results into host
/// memory and release both buffers.
pub struct IntersectionSession<'a> {
    device: &'a mut dyn IntersectDevice,
}

impl<'a> IntersectionSession<'a> {
    pub fn new(device: &'a mut dyn IntersectDevice) -> Self {
        IntersectionSession { device }
    }

    /// Trace the batch. The returned vector has exactly `rays.len()`
    /// entries and hit `i` corresponds to ray `i`; positional
    /// correspondence is the only ordering contract.
    pub fn trace(&mut self, rays: &[Ray]) -> Result<Vec<Hit>, IsectError> {
        let ray_bytes = std::mem::size_of_val(rays);
        let hit_bytes = rays.len() * std::mem::size_of::<Hit>();

        let ray_buffer = self
            .device
            .create_buffer(ray_bytes, Some(bytemuck::cast_slice(rays)))?;
        let hit_buffer = self.device.create_buffer(hit_bytes, None)?;

        let completion = self
            .device
            .query_intersection(ray_buffer, rays.len(), hit_buffer)?;
        // The result buffer is undefined until this returns.
        self.device.wait(completion)?;

        let hits = {
            let mapped = self.device.map_read(hit_buffer, 0, hit_bytes)?;
            bytemuck::pod_collect_to_vec::<u8, Hit>(&mapped)
        };

        self.device.release_buffer(hit_buffer)?;
        self.device.release_buffer(ray_buffer)?;
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::isect::cpu::CpuDevice;
    use crate::registrar::register_scene;
    use crate::scene::Scene;

    #[test]
    fn test_one_hit_record_per_ray() {
        let scene = Scene::cornell_box();
        let mut device = CpuDevice::new();
        register_scene(&mut device, &scene).unwrap();

        let rays = Camera::default().generate_primary_rays(8, 6);
        let hits = IntersectionSession::new(&mut device)
            .trace(&rays)
            .unwrap();
        assert_eq!(hits.len(), rays.len());
    }

    #[test]
    fn test_consecutive_batches_agree() {
        let scene = Scene::cornell_box();
        let mut device = CpuDevice::new();
        register_scene(&mut device, &scene).unwrap();

        let rays = Camera::default().generate_primary_rays(4, 4);
        let first = IntersectionSession::new(&mut device).trace(&rays).unwrap();
        let second = IntersectionSession::new(&mut device).trace(&rays).unwrap();
        assert_eq!(first, second);
    }
}
