//! rt-batch: single-frame renderer over a batch intersection service.
//!
//! One primary ray per pixel is cast into a triangle-mesh scene; the
//! ray/scene test is delegated to an intersection device behind the
//! [`isect::IntersectDevice`] contract, hits are shaded with single-bounce
//! direct lighting and composited into an RGBA pixel buffer for the
//! display layer.

pub mod camera;
pub mod error;
pub mod frame;
pub mod isect;
pub mod registrar;
pub mod render;
pub mod scene;
pub mod session;
pub mod shading;
pub mod terminal;

pub use camera::Camera;
pub use error::RtError;
pub use frame::Framebuffer;
pub use render::Renderer;
pub use scene::Scene;
