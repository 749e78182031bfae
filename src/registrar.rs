//! Shape registration: hands scene meshes to the intersection device.

use crate::error::IsectError;
use crate::isect::IntersectDevice;
use crate::scene::Scene;

/// Byte distance between consecutive vertex positions in a mesh buffer.
pub const VERTEX_STRIDE: usize = 3 * std::mem::size_of::<f32>();

/// Register every mesh and commit the scene. Shape ids are dense, unique,
/// assigned in mesh order and reported back verbatim in hit records, so
/// `shape_id` indexes `scene.meshes` directly. Called once at startup;
/// geometry is immutable afterwards.
pub fn register_scene(
    device: &mut dyn IntersectDevice,
    scene: &Scene,
) -> Result<Vec<u32>, IsectError> {
    let mut ids = Vec::with_capacity(scene.meshes.len());
    for (id, mesh) in scene.meshes.iter().enumerate() {
        let shape = device.create_shape(
            &mesh.positions,
            VERTEX_STRIDE,
            &mesh.indices,
            mesh.face_count(),
        )?;
        device.attach_shape(shape, id as u32)?;
        ids.push(id as u32);
    }
    device.commit()?;
    log::info!("registered {} shapes", ids.len());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isect::cpu::CpuDevice;

    #[test]
    fn test_ids_are_dense_and_ordered() {
        let scene = Scene::cornell_box();
        let mut device = CpuDevice::new();
        let ids = register_scene(&mut device, &scene).unwrap();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
