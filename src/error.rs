//! Error types for the renderer.

use thiserror::Error;

use crate::isect::{BufferHandle, DeviceKind, ShapeHandle};

/// Errors raised while validating scene data.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Scene contains no meshes.
    #[error("scene contains no meshes")]
    EmptyScene,

    /// Index buffer length is not a multiple of 3.
    #[error("mesh {mesh}: index buffer is not triangulated ({indices} indices)")]
    NotTriangulated { mesh: usize, indices: usize },

    /// Normal buffer does not match the position buffer.
    #[error("mesh {mesh}: {normals} normal floats for {positions} position floats")]
    AttributeMismatch {
        mesh: usize,
        positions: usize,
        normals: usize,
    },

    /// Triangle corner index points past the vertex buffer.
    #[error("mesh {mesh}: corner index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Per-face material table length does not match the face count.
    #[error("mesh {mesh}: {material_ids} material ids for {faces} faces")]
    FaceTableMismatch {
        mesh: usize,
        material_ids: usize,
        faces: usize,
    },

    /// Face references a material past the material table.
    #[error("mesh {mesh}, face {face}: material {material} out of range")]
    MaterialOutOfRange {
        mesh: usize,
        face: usize,
        material: u32,
    },
}

/// Errors raised at the intersection service boundary.
#[derive(Error, Debug)]
pub enum IsectError {
    /// No device of the requested kind exists on this host.
    #[error("no {0} intersection device available")]
    NoDevice(DeviceKind),

    /// Shape handle was never issued by this device.
    #[error("unknown shape handle {0:?}")]
    UnknownShape(ShapeHandle),

    /// Buffer handle was never issued by this device, or was released.
    #[error("unknown buffer handle {0:?}")]
    UnknownBuffer(BufferHandle),

    /// Query issued before the scene was committed.
    #[error("scene must be committed before querying")]
    NotCommitted,

    /// Buffer is smaller than the operation requires.
    #[error("buffer holds {size} bytes, operation needs {required}")]
    BufferTooSmall { size: usize, required: usize },

    /// Mapped range falls outside the buffer.
    #[error("mapped range {offset}+{len} exceeds buffer of {size} bytes")]
    MapOutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    /// Buffer is the target of an in-flight query; wait on the completion first.
    #[error("buffer {0:?} is in flight; wait on its completion before mapping")]
    BufferInFlight(BufferHandle),

    /// The device-side worker dropped its completion without delivering results.
    #[error("intersection worker dropped its completion")]
    LostCompletion,
}

/// Top-level error for the rendering pipeline.
#[derive(Error, Debug)]
pub enum RtError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Isect(#[from] IsectError),
}
