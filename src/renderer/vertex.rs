//! Vertex and instance types for the 3D scene

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Mesh vertex with position and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Per-instance transform and material
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    /// Linear base colour, metalness in w
    pub color: [f32; 4],
    /// Linear emissive colour, roughness in w
    pub emissive: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Surface description of an instance
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
}

impl Material {
    pub fn instance(&self, model: Mat4) -> InstanceRaw {
        let [r, g, b] = self.color;
        let [er, eg, eb] = self.emissive;
        InstanceRaw {
            model: model.to_cols_array_2d(),
            color: [r, g, b, self.metalness],
            emissive: [er, eg, eb, self.roughness],
        }
    }

    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }
}

/// Scene palette (sRGB hex) and conversion to linear
pub mod colors {
    pub const EMERALD: u32 = 0x003319;
    pub const GOLD: u32 = 0xFFD700;
    pub const STAR_CORE: u32 = 0xFFDD44;
    pub const STAR_GLOW: u32 = 0xFFAA00;
    pub const STAND: u32 = 0x111111;
    pub const FLOOR: u32 = 0x000804;
    pub const BACKGROUND: u32 = 0x000502;
    pub const AMBIENT: u32 = 0x001100;
    pub const KEY_LIGHT: u32 = 0xFFF0D0;
    pub const RIM_LIGHT: u32 = 0x00FF88;

    #[inline]
    pub fn srgb_to_linear(c: f32) -> f32 {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    /// Linear RGB from an sRGB triple in 0..1
    pub fn linear(rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(srgb_to_linear)
    }

    /// Linear RGB from a 0xRRGGBB value
    pub fn hex(rgb: u32) -> [f32; 3] {
        let channel = |shift: u32| ((rgb >> shift) & 0xFF) as f32 / 255.0;
        linear([channel(16), channel(8), channel(0)])
    }

    pub fn scaled(rgb: [f32; 3], k: f32) -> [f32; 3] {
        rgb.map(|c| c * k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_layout_sizes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 96);
    }

    #[test]
    fn test_hex_to_linear() {
        assert_eq!(colors::hex(0xFFFFFF), [1.0, 1.0, 1.0]);
        assert_eq!(colors::hex(0x000000), [0.0, 0.0, 0.0]);
        let gold = colors::hex(colors::GOLD);
        assert_eq!(gold[0], 1.0);
        assert!(gold[1] > 0.6 && gold[1] < 0.7);
        assert_eq!(gold[2], 0.0);
    }
}
