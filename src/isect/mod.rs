//! Intersection service boundary: ray/hit wire types and the device contract.
//!
//! The renderer never intersects geometry itself. It registers shapes with a
//! device, uploads a ray buffer, issues one asynchronous batch query per
//! frame and reads hit records back once the completion handle signals.

pub mod cpu;

use std::fmt;

use crossbeam_channel::Receiver;

use crate::error::IsectError;

/// Sentinel stored in `shape_id`/`prim_id` when a ray hit nothing.
pub const NULL_ID: i32 = -1;

/// One primary ray, laid out for upload as raw bytes.
///
/// `origin.w` carries the maximum hit distance in units of the (possibly
/// unnormalized) direction. The generator does not normalize `direction`;
/// normalization semantics belong to the device.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Ray {
    pub origin: [f32; 4],
    pub direction: [f32; 4],
}

/// One hit record, positionally matched to the ray that produced it.
///
/// `uvwt` holds the barycentric weights of the face's second and third
/// corners (`u`, `v`), the derived first-corner weight `w = 1 - u - v`,
/// and the parametric hit distance `t`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Hit {
    pub uvwt: [f32; 4],
    pub shape_id: i32,
    pub prim_id: i32,
    pub _pad: [i32; 2],
}

impl Hit {
    pub fn miss() -> Self {
        Hit {
            uvwt: [0.0; 4],
            shape_id: NULL_ID,
            prim_id: NULL_ID,
            _pad: [0; 2],
        }
    }

    pub fn is_miss(&self) -> bool {
        self.shape_id == NULL_ID || self.prim_id == NULL_ID
    }
}

/// Opaque handle to a shape staged on a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeHandle(pub(crate) u32);

/// Opaque handle to a device-resident buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferHandle(pub(crate) u32);

/// Single-shot completion for an in-flight query. Consumed exactly once by
/// [`IntersectDevice::wait`]; results must not be read before that.
pub struct Completion {
    pub(crate) hits: Receiver<Vec<Hit>>,
    pub(crate) results: BufferHandle,
}

/// Scoped read-mapping of a device buffer. The mapping is released when the
/// guard goes out of scope, on every exit path.
pub struct MapGuard<'a> {
    pub(crate) bytes: &'a [u8],
}

impl std::ops::Deref for MapGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

/// Device kinds the selection policy knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    Cpu,
    Gpu,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Cpu => write!(f, "cpu"),
            DeviceKind::Gpu => write!(f, "gpu"),
        }
    }
}

/// Contract every intersection device fulfills.
///
/// Protocol per frame: `create_buffer` for rays and results,
/// `query_intersection` (asynchronous, returns a [`Completion`]), `wait`,
/// then `map_read` and `release_buffer`. Shapes are registered once at
/// startup via `create_shape`/`attach_shape`/`commit`; geometry never
/// mutates after `commit`.
pub trait IntersectDevice {
    /// Stage a triangle mesh. `vertex_stride` is the byte distance between
    /// consecutive vertex positions in `positions`.
    fn create_shape(
        &mut self,
        positions: &[f32],
        vertex_stride: usize,
        indices: &[u32],
        face_count: usize,
    ) -> Result<ShapeHandle, IsectError>;

    /// Attach a staged shape to the scene under a caller-chosen id. Ids are
    /// reported back verbatim in hit records.
    fn attach_shape(&mut self, shape: ShapeHandle, id: u32) -> Result<(), IsectError>;

    /// Freeze the attached shapes. Must be called once before any query.
    fn commit(&mut self) -> Result<(), IsectError>;

    /// Allocate a device-resident buffer, optionally initialized.
    fn create_buffer(
        &mut self,
        byte_size: usize,
        initial: Option<&[u8]>,
    ) -> Result<BufferHandle, IsectError>;

    /// Issue a batch nearest-hit query over `ray_count` rays. Returns
    /// immediately; the result buffer is undefined until `wait` returns.
    fn query_intersection(
        &mut self,
        rays: BufferHandle,
        ray_count: usize,
        results: BufferHandle,
    ) -> Result<Completion, IsectError>;

    /// Block until the query behind `completion` has fully written its
    /// result buffer.
    fn wait(&mut self, completion: Completion) -> Result<(), IsectError>;

    /// Map a buffer range for reading. Rejected while the buffer is the
    /// target of an unwaited query.
    fn map_read(
        &self,
        buffer: BufferHandle,
        offset: usize,
        len: usize,
    ) -> Result<MapGuard<'_>, IsectError>;

    /// Release a buffer and its backing memory.
    fn release_buffer(&mut self, buffer: BufferHandle) -> Result<(), IsectError>;
}

/// Device-selection policy: open a device of the requested kind or fail
/// with a descriptive startup error.
pub fn open_device(kind: DeviceKind) -> Result<Box<dyn IntersectDevice>, IsectError> {
    match kind {
        DeviceKind::Cpu => Ok(Box::new(cpu::CpuDevice::new())),
        DeviceKind::Gpu => Err(IsectError::NoDevice(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_sentinel() {
        let hit = Hit::miss();
        assert!(hit.is_miss());
        assert_eq!(hit.shape_id, NULL_ID);
        assert_eq!(hit.prim_id, NULL_ID);
    }

    #[test]
    fn test_wire_type_sizes() {
        assert_eq!(std::mem::size_of::<Ray>(), 32);
        assert_eq!(std::mem::size_of::<Hit>(), 32);
    }

    #[test]
    fn test_open_device_cpu() {
        assert!(open_device(DeviceKind::Cpu).is_ok());
    }

    #[test]
    fn test_open_device_gpu_unavailable() {
        let err = open_device(DeviceKind::Gpu).err().expect("gpu should fail");
        assert!(err.to_string().contains("no gpu"));
    }
}
