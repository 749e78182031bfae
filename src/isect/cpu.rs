//! CPU reference implementation of the intersection device contract.
//!
//! Brute-force nearest-hit over all committed faces, executed on a worker
//! thread with rayon fanning out across the ray batch. The host-facing
//! protocol is identical to a hardware device: the result buffer holds
//! nothing until `wait` consumes the completion.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use glam::Vec3;
use rayon::prelude::*;

use crate::error::IsectError;
use crate::isect::{
    BufferHandle, Completion, Hit, IntersectDevice, MapGuard, Ray, ShapeHandle,
};

/// Intersections closer than this along the (unnormalized) ray are ignored.
const T_MIN: f32 = 1e-6;

struct ShapeData {
    positions: Vec<f32>,
    stride: usize, // in floats
    indices: Vec<u32>,
    face_count: usize,
}

struct CommittedShape {
    id: i32,
    positions: Vec<f32>,
    stride: usize,
    indices: Vec<u32>,
    face_count: usize,
}

struct CommittedScene {
    shapes: Vec<CommittedShape>,
}

struct DeviceBuffer {
    data: Vec<u8>,
    in_flight: bool,
}

/// Software intersection device.
pub struct CpuDevice {
    shapes: Vec<ShapeData>,
    attached: Vec<(usize, u32)>,
    committed: Option<Arc<CommittedScene>>,
    buffers: Vec<Option<DeviceBuffer>>,
}

impl CpuDevice {
    pub fn new() -> Self {
        CpuDevice {
            shapes: Vec::new(),
            attached: Vec::new(),
            committed: None,
            buffers: Vec::new(),
        }
    }

    fn buffer(&self, handle: BufferHandle) -> Result<&DeviceBuffer, IsectError> {
        self.buffers
            .get(handle.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(IsectError::UnknownBuffer(handle))
    }

    fn buffer_mut(&mut self, handle: BufferHandle) -> Result<&mut DeviceBuffer, IsectError> {
        self.buffers
            .get_mut(handle.0 as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(IsectError::UnknownBuffer(handle))
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectDevice for CpuDevice {
    fn create_shape(
        &mut self,
        positions: &[f32],
        vertex_stride: usize,
        indices: &[u32],
        face_count: usize,
    ) -> Result<ShapeHandle, IsectError> {
        let handle = ShapeHandle(self.shapes.len() as u32);
        self.shapes.push(ShapeData {
            positions: positions.to_vec(),
            stride: vertex_stride / std::mem::size_of::<f32>(),
            indices: indices.to_vec(),
            face_count,
        });
        Ok(handle)
    }

    fn attach_shape(&mut self, shape: ShapeHandle, id: u32) -> Result<(), IsectError> {
        let idx = shape.0 as usize;
        if idx >= self.shapes.len() {
            return Err(IsectError::UnknownShape(shape));
        }
        self.attached.push((idx, id));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), IsectError> {
        let shapes = self
            .attached
            .iter()
            .map(|&(idx, id)| {
                let src = &self.shapes[idx];
                CommittedShape {
                    id: id as i32,
                    positions: src.positions.clone(),
                    stride: src.stride,
                    indices: src.indices.clone(),
                    face_count: src.face_count,
                }
            })
            .collect();
        self.committed = Some(Arc::new(CommittedScene { shapes }));
        log::debug!("committed {} shapes", self.attached.len());
        Ok(())
    }

    fn create_buffer(
        &mut self,
        byte_size: usize,
        initial: Option<&[u8]>,
    ) -> Result<BufferHandle, IsectError> {
        let mut data = vec![0u8; byte_size];
        if let Some(init) = initial {
            if init.len() > byte_size {
                return Err(IsectError::BufferTooSmall {
                    size: byte_size,
                    required: init.len(),
                });
            }
            data[..init.len()].copy_from_slice(init);
        }
        let handle = BufferHandle(self.buffers.len() as u32);
        self.buffers.push(Some(DeviceBuffer {
            data,
            in_flight: false,
        }));
        Ok(handle)
    }

    fn query_intersection(
        &mut self,
        rays: BufferHandle,
        ray_count: usize,
        results: BufferHandle,
    ) -> Result<Completion, IsectError> {
        let scene = self
            .committed
            .as_ref()
            .cloned()
            .ok_or(IsectError::NotCommitted)?;

        let ray_bytes = ray_count * std::mem::size_of::<Ray>();
        let ray_buf = self.buffer(rays)?;
        if ray_buf.data.len() < ray_bytes {
            return Err(IsectError::BufferTooSmall {
                size: ray_buf.data.len(),
                required: ray_bytes,
            });
        }
        let batch: Vec<Ray> = bytemuck::pod_collect_to_vec(&ray_buf.data[..ray_bytes]);

        let hit_bytes = ray_count * std::mem::size_of::<Hit>();
        let result_buf = self.buffer_mut(results)?;
        if result_buf.data.len() < hit_bytes {
            return Err(IsectError::BufferTooSmall {
                size: result_buf.data.len(),
                required: hit_bytes,
            });
        }
        result_buf.in_flight = true;

        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let hits: Vec<Hit> = batch.par_iter().map(|ray| scene.intersect(ray)).collect();
            let _ = tx.send(hits);
        });

        Ok(Completion { hits: rx, results })
    }

    fn wait(&mut self, completion: Completion) -> Result<(), IsectError> {
        let hits = completion
            .hits
            .recv()
            .map_err(|_| IsectError::LostCompletion)?;
        let buf = self.buffer_mut(completion.results)?;
        let bytes: &[u8] = bytemuck::cast_slice(&hits);
        buf.data[..bytes.len()].copy_from_slice(bytes);
        buf.in_flight = false;
        Ok(())
    }

    fn map_read(
        &self,
        buffer: BufferHandle,
        offset: usize,
        len: usize,
    ) -> Result<MapGuard<'_>, IsectError> {
        let buf = self.buffer(buffer)?;
        if buf.in_flight {
            return Err(IsectError::BufferInFlight(buffer));
        }
        if offset + len > buf.data.len() {
            return Err(IsectError::MapOutOfBounds {
                offset,
                len,
                size: buf.data.len(),
            });
        }
        Ok(MapGuard {
            bytes: &buf.data[offset..offset + len],
        })
    }

    fn release_buffer(&mut self, buffer: BufferHandle) -> Result<(), IsectError> {
        let slot = self
            .buffers
            .get_mut(buffer.0 as usize)
            .ok_or(IsectError::UnknownBuffer(buffer))?;
        if slot.take().is_none() {
            return Err(IsectError::UnknownBuffer(buffer));
        }
        Ok(())
    }
}

impl CommittedScene {
    /// Nearest hit across every committed face, or the miss sentinel.
    fn intersect(&self, ray: &Ray) -> Hit {
        let origin = Vec3::new(ray.origin[0], ray.origin[1], ray.origin[2]);
        let dir = Vec3::new(ray.direction[0], ray.direction[1], ray.direction[2]);
        let mut best = Hit::miss();
        let mut best_t = ray.origin[3];

        for shape in &self.shapes {
            for prim in 0..shape.face_count {
                let v0 = shape.corner(prim, 0);
                let v1 = shape.corner(prim, 1);
                let v2 = shape.corner(prim, 2);
                if let Some((t, u, v)) = intersect_triangle(origin, dir, v0, v1, v2) {
                    if t < best_t {
                        best_t = t;
                        best = Hit {
                            uvwt: [u, v, 1.0 - u - v, t],
                            shape_id: shape.id,
                            prim_id: prim as i32,
                            _pad: [0; 2],
                        };
                    }
                }
            }
        }
        best
    }
}

impl CommittedShape {
    fn corner(&self, prim: usize, corner: usize) -> Vec3 {
        let vertex = self.indices[prim * 3 + corner] as usize * self.stride;
        Vec3::new(
            self.positions[vertex],
            self.positions[vertex + 1],
            self.positions[vertex + 2],
        )
    }
}

/// Moller-Trumbore, no backface culling. Returns `(t, u, v)` with `t` in
/// units of the unnormalized direction and `u`, `v` the barycentric weights
/// of the second and third corners.
fn intersect_triangle(o: Vec3, d: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<(f32, f32, f32)> {
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let p = d.cross(e2);
    let det = e1.dot(p);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = o - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = d.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    if t <= T_MIN {
        return None;
    }
    Some((t, u, v))
}
