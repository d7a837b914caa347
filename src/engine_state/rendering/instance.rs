//! Per-face instance data for instanced voxel rendering.
//!
//! Every visible block face becomes one [`FaceInstance`]. The renderer draws a
//! single unit quad (lying in the plane `z = -0.5`) once per instance, using the
//! instance's model matrix to place and orient it.
//!
//! # Packed Layout
//!
//! | scalars | field |
//! |---|---|
//! | 0..2 | texture atlas offset |
//! | 2..4 | overlay atlas offset, `(-1, -1)` when absent |
//! | 4..20 | model matrix, column major |
//! | 20..23 | face normal |
//!
//! [`InstanceLayout::Legacy`] drops the trailing normal for shaders that
//! predate it.

use cgmath::{Matrix4, Vector3};

/// A single visible block face.
///
/// # Memory Layout
/// Twenty-three tightly packed `f32`s (92 bytes), no padding, so a slice of
/// instances can be handed to the GPU as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FaceInstance {
    /// Atlas tile of the base texture
    pub tex_offset: [f32; 2],
    /// Atlas tile of the tinted overlay
    pub overlay_offset: [f32; 2],
    /// Model matrix columns
    pub model: [[f32; 4]; 4],
    /// Outward face normal
    pub normal: [f32; 3],
}

/// Number of `f32`s in a packed instance with normals.
pub const FLOATS_PER_INSTANCE: usize = 23;
/// Number of `f32`s in a packed legacy instance.
pub const LEGACY_FLOATS_PER_INSTANCE: usize = 20;

impl FaceInstance {
    pub fn new(
        tex_offset: [f32; 2],
        overlay_offset: [f32; 2],
        model: Matrix4<f32>,
        normal: Vector3<f32>,
    ) -> Self {
        FaceInstance {
            tex_offset,
            overlay_offset,
            model: model.into(),
            normal: normal.into(),
        }
    }

    /// Translation part of the model matrix.
    pub fn translation(&self) -> [f32; 3] {
        let column = self.model[3];
        [column[0], column[1], column[2]]
    }

    /// Returns the instance buffer layout description for the shader pipeline.
    ///
    /// # Returns
    /// A `wgpu::VertexBufferLayout` stepping once per instance
    ///
    /// # Shader Attributes
    /// - `location = 2`: tex_offset (vec2<f32>)
    /// - `location = 3`: overlay_offset (vec2<f32>)
    /// - `location = 4..=7`: model matrix columns (vec4<f32> each)
    /// - `location = 8`: normal (vec3<f32>)
    ///
    /// Locations 0 and 1 are left to the unit quad's per-vertex position and UV.
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FaceInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 20]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Scalar layout used when flattening instances for upload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum InstanceLayout {
    /// 23 scalars per face, normal included.
    #[default]
    WithNormals,
    /// 20 scalars per face, no normal.
    Legacy,
}

impl InstanceLayout {
    pub fn floats_per_instance(self) -> usize {
        match self {
            InstanceLayout::WithNormals => FLOATS_PER_INSTANCE,
            InstanceLayout::Legacy => LEGACY_FLOATS_PER_INSTANCE,
        }
    }

    /// Flattens instances into a contiguous scalar buffer.
    pub fn pack(self, instances: &[FaceInstance]) -> Vec<f32> {
        let floats: &[f32] = bytemuck::cast_slice(instances);
        match self {
            InstanceLayout::WithNormals => floats.to_vec(),
            InstanceLayout::Legacy => floats
                .chunks_exact(FLOATS_PER_INSTANCE)
                .flat_map(|instance| &instance[..LEGACY_FLOATS_PER_INSTANCE])
                .copied()
                .collect(),
        }
    }
}
