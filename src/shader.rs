//! Point-cloud shader source and its uniform block.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// WGSL for the instanced point sprites.
pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");

/// Vertices per particle quad.
pub const QUAD_VERTICES: u32 = 6;

/// Uniform block matching `Uniforms` in [`SHADER_SOURCE`].
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Linear RGB plus opacity.
    pub color: [f32; 4],
    /// Quad edge length in world units.
    pub point_size: f32,
    pub _padding: [f32; 3],
}

impl Uniforms {
    pub fn new(view_proj: Mat4, color: [f32; 4], point_size: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            color,
            point_size,
            _padding: [0.0; 3],
        }
    }
}

/// Convert a `0xRRGGBB` sRGB color to linear RGB with the given opacity.
pub fn hex_color(rgb: u32, opacity: f32) -> [f32; 4] {
    let channel = |shift: u32| {
        let c = ((rgb >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), opacity]
}
