//! Frame orchestration: the render context owning device, scene and camera.

use crate::camera::Camera;
use crate::error::RtError;
use crate::frame::Framebuffer;
use crate::isect::IntersectDevice;
use crate::registrar::register_scene;
use crate::scene::Scene;
use crate::session::IntersectionSession;
use crate::shading::{resolve_hit, shade_direct};

/// Explicit render context passed through the pipeline instead of
/// process-wide globals. Construction validates the scene and registers it
/// with the device; geometry is immutable from then on.
pub struct Renderer {
    device: Box<dyn IntersectDevice>,
    scene: Scene,
    camera: Camera,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(
        mut device: Box<dyn IntersectDevice>,
        scene: Scene,
        camera: Camera,
        width: u32,
        height: u32,
    ) -> Result<Self, RtError> {
        scene.validate()?;
        register_scene(device.as_mut(), &scene)?;
        Ok(Renderer {
            device,
            scene,
            camera,
            width,
            height,
        })
    }

    /// Render one frame: generate primary rays, run the batch query,
    /// resolve and shade each hit, composite into a fresh pixel buffer.
    /// Single control thread; the only asynchrony is inside the device.
    pub fn render_frame(&mut self) -> Result<Framebuffer, RtError> {
        let rays = self.camera.generate_primary_rays(self.width, self.height);
        log::debug!("tracing {} primary rays", rays.len());

        let hits = IntersectionSession::new(self.device.as_mut()).trace(&rays)?;

        let mut frame = Framebuffer::new(self.width, self.height);
        let scene = &self.scene;
        frame.composite(
            hits.iter()
                .map(|hit| resolve_hit(scene, hit).map(|p| shade_direct(&p, scene.light))),
        );
        Ok(frame)
    }
}
