//! Instance buffers for instanced rendering.
//!
//! Each particle group owns one buffer with a fixed number of slots. The
//! simulation overwrites slots in place every frame and raises the dirty flags
//! once all slots are written; the renderer uploads dirty buffers and clears
//! the flags.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Per-instance model matrix, column-major.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuInstanceTransform {
    pub model: [[f32; 4]; 4],
}

impl GpuInstanceTransform {
    pub const IDENTITY: Self = Self {
        model: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_mat4(m: Mat4) -> Self {
        Self {
            model: m.to_cols_array_2d(),
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    /// Vertex buffer layout for the transform stream (slot 1, per instance).
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuInstanceTransform>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Per-instance linear RGB color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuInstanceColor {
    pub color: [f32; 3],
}

impl GpuInstanceColor {
    /// Vertex buffer layout for the color stream (slot 2, per instance).
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![7 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuInstanceColor>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Final per-instance pose produced by the blender.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub color: Vec3,
}

impl Pose {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

/// Fixed-capacity transform and color storage for one group.
#[derive(Clone, Debug)]
pub struct InstanceBuffer {
    transforms: Vec<GpuInstanceTransform>,
    colors: Option<Vec<GpuInstanceColor>>,
    transforms_dirty: bool,
    colors_dirty: bool,
}

impl InstanceBuffer {
    /// Allocate `capacity` slots. Without a color stream, only transforms are written.
    pub fn new(capacity: usize, with_colors: bool) -> Self {
        Self {
            transforms: vec![GpuInstanceTransform::IDENTITY; capacity],
            colors: with_colors.then(|| vec![GpuInstanceColor::zeroed(); capacity]),
            transforms_dirty: false,
            colors_dirty: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.transforms.len()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Write one slot. Slots past the capacity are ignored.
    pub fn write(&mut self, index: usize, pose: &Pose) {
        let Some(slot) = self.transforms.get_mut(index) else {
            return;
        };
        *slot = GpuInstanceTransform::from_mat4(pose.matrix());
        if let Some(colors) = &mut self.colors {
            colors[index] = GpuInstanceColor {
                color: pose.color.to_array(),
            };
        }
    }

    /// Flag the buffer for upload after a full pass over its slots.
    pub fn mark_dirty(&mut self) {
        self.transforms_dirty = true;
        if self.colors.is_some() {
            self.colors_dirty = true;
        }
    }

    pub fn transforms_dirty(&self) -> bool {
        self.transforms_dirty
    }

    pub fn colors_dirty(&self) -> bool {
        self.colors_dirty
    }

    pub fn transforms(&self) -> &[GpuInstanceTransform] {
        &self.transforms
    }

    pub fn colors(&self) -> Option<&[GpuInstanceColor]> {
        self.colors.as_deref()
    }

    pub fn transform_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }

    pub fn color_bytes(&self) -> Option<&[u8]> {
        self.colors.as_deref().map(bytemuck::cast_slice)
    }

    /// Clear the dirty flags once the renderer has consumed the data.
    pub fn clear_dirty(&mut self) {
        self.transforms_dirty = false;
        self.colors_dirty = false;
    }

    /// Upload dirty streams through `queue` and clear the flags.
    ///
    /// Returns whether anything was written.
    pub fn upload(
        &mut self,
        queue: &wgpu::Queue,
        transform_buffer: &wgpu::Buffer,
        color_buffer: Option<&wgpu::Buffer>,
    ) -> bool {
        let mut uploaded = false;
        if self.transforms_dirty {
            queue.write_buffer(transform_buffer, 0, self.transform_bytes());
            uploaded = true;
        }
        if self.colors_dirty {
            if let (Some(buffer), Some(bytes)) = (color_buffer, self.color_bytes()) {
                queue.write_buffer(buffer, 0, bytes);
                uploaded = true;
            }
        }
        self.clear_dirty();
        uploaded
    }
}
