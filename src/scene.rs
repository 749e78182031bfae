//! Scene data: triangle meshes, materials and the point light.
//!
//! All buffers are immutable once the scene is registered; the pipeline
//! shares them by reference across the frame.

use glam::Vec3;

use crate::error::SceneError;

/// Diffuse reflectance, one color per material slot.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub diffuse: Vec3,
}

/// One triangle mesh: flat position/normal buffers (3 floats per vertex),
/// triangle corner indices (3 per face) and a per-face material id table.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub material_ids: Vec<u32>,
}

impl Mesh {
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// A complete scene plus its single point light.
#[derive(Debug, Clone)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub light: Vec3,
}

impl Scene {
    /// Validate buffer shapes and cross-references. Surfaced once at
    /// startup; the pipeline trusts the data afterwards.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.meshes.is_empty() {
            return Err(SceneError::EmptyScene);
        }
        for (m, mesh) in self.meshes.iter().enumerate() {
            if mesh.indices.len() % 3 != 0 {
                return Err(SceneError::NotTriangulated {
                    mesh: m,
                    indices: mesh.indices.len(),
                });
            }
            if mesh.normals.len() != mesh.positions.len() {
                return Err(SceneError::AttributeMismatch {
                    mesh: m,
                    positions: mesh.positions.len(),
                    normals: mesh.normals.len(),
                });
            }
            let vertex_count = mesh.vertex_count();
            for &index in &mesh.indices {
                if index as usize >= vertex_count {
                    return Err(SceneError::IndexOutOfRange {
                        mesh: m,
                        index,
                        vertex_count,
                    });
                }
            }
            if mesh.material_ids.len() != mesh.face_count() {
                return Err(SceneError::FaceTableMismatch {
                    mesh: m,
                    material_ids: mesh.material_ids.len(),
                    faces: mesh.face_count(),
                });
            }
            for (face, &material) in mesh.material_ids.iter().enumerate() {
                if material as usize >= self.materials.len() {
                    return Err(SceneError::MaterialOutOfRange {
                        mesh: m,
                        face,
                        material,
                    });
                }
            }
        }
        Ok(())
    }

    /// Built-in Cornell box: white floor/ceiling/back wall, red left wall,
    /// green right wall, two white blocks. Sized for the default camera at
    /// (0, 1, 3) with the light near the ceiling.
    pub fn cornell_box() -> Self {
        const WHITE: u32 = 0;
        const RED: u32 = 1;
        const GREEN: u32 = 2;

        let mut room = MeshBuilder::new();
        // Normals face into the box. u cross v picks the inward side.
        // Floor (y = 0)
        room.quad(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
            WHITE,
        );
        // Ceiling (y = 2)
        room.quad(
            Vec3::new(-1.0, 2.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            WHITE,
        );
        // Back wall (z = -1)
        room.quad(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            WHITE,
        );
        // Left wall (x = -1)
        room.quad(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            RED,
        );
        // Right wall (x = 1)
        room.quad(
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 2.0, 0.0),
            GREEN,
        );

        let mut tall = MeshBuilder::new();
        tall.block(Vec3::new(-0.7, 0.0, -0.7), Vec3::new(-0.2, 1.2, -0.2), WHITE);

        let mut short = MeshBuilder::new();
        short.block(Vec3::new(0.1, 0.0, 0.0), Vec3::new(0.7, 0.6, 0.6), WHITE);

        Scene {
            meshes: vec![room.build(), tall.build(), short.build()],
            materials: vec![
                Material {
                    diffuse: Vec3::new(0.73, 0.73, 0.73),
                },
                Material {
                    diffuse: Vec3::new(0.65, 0.05, 0.05),
                },
                Material {
                    diffuse: Vec3::new(0.12, 0.45, 0.15),
                },
            ],
            light: Vec3::new(-0.01, 1.9, 0.1),
        }
    }
}

/// Accumulates flat-shaded quads into one mesh.
struct MeshBuilder {
    positions: Vec<f32>,
    normals: Vec<f32>,
    indices: Vec<u32>,
    material_ids: Vec<u32>,
}

impl MeshBuilder {
    fn new() -> Self {
        MeshBuilder {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            material_ids: Vec::new(),
        }
    }

    /// Two triangles spanning corner, corner+u, corner+u+v, corner+v, with
    /// the face normal u x v on every vertex.
    fn quad(&mut self, corner: Vec3, u: Vec3, v: Vec3, material: u32) {
        let normal = u.cross(v).normalize();
        let base = (self.positions.len() / 3) as u32;
        for p in [corner, corner + u, corner + u + v, corner + v] {
            self.positions.extend_from_slice(&p.to_array());
            self.normals.extend_from_slice(&normal.to_array());
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.material_ids.extend_from_slice(&[material, material]);
    }

    /// Axis-aligned box between two corners, outward normals.
    fn block(&mut self, min: Vec3, max: Vec3, material: u32) {
        let d = max - min;
        let dx = Vec3::new(d.x, 0.0, 0.0);
        let dy = Vec3::new(0.0, d.y, 0.0);
        let dz = Vec3::new(0.0, 0.0, d.z);
        self.quad(min, dx, dz, material); // bottom, -y
        self.quad(min + dy, dz, dx, material); // top, +y
        self.quad(min, dy, dx, material); // -z side
        self.quad(min + dz, dx, dy, material); // +z side
        self.quad(min, dz, dy, material); // -x side
        self.quad(min + dx, dy, dz, material); // +x side
    }

    fn build(self) -> Mesh {
        Mesh {
            positions: self.positions,
            normals: self.normals,
            indices: self.indices,
            material_ids: self.material_ids,
        }
    }
}
