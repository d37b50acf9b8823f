//! Screen-space textured quads.
//!
//! Positions are window pixels with the origin in the bottom-left corner and
//! y pointing up, the convention of a 2D orthographic camera. Textures keep
//! wgpu's top-left origin, so the top edge of a quad samples `v = 0`.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{colour::Colour, model::Vertex},
    pipelines::basic::mk_render_pipeline,
};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub colour: [f32; 4],
}

impl Vertex for SpriteVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // uv
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // colour
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Two triangles covering `(x, y)..(x + w, y + h)`, counter-clockwise.
pub fn quad_vertices(x: f32, y: f32, w: f32, h: f32, colour: Colour) -> [SpriteVertex; 6] {
    let colour = colour.to_array();
    let v = |px: f32, py: f32, u: f32, tv: f32| SpriteVertex {
        position: [px, py],
        uv: [u, tv],
        colour,
    };
    let bottom_left = v(x, y, 0.0, 1.0);
    let bottom_right = v(x + w, y, 1.0, 1.0);
    let top_right = v(x + w, y + h, 1.0, 0.0);
    let top_left = v(x, y + h, 0.0, 0.0);
    [
        bottom_left,
        bottom_right,
        top_right,
        bottom_left,
        top_right,
        top_left,
    ]
}

/// Orthographic projection mapping `(0, 0)..(width, height)` onto clip space.
///
/// Zero sizes are treated as one pixel so a minimised window never produces
/// a NaN matrix.
pub fn ortho_2d(width: f32, height: f32) -> [[f32; 4]; 4] {
    let w = width.max(1.0);
    let h = height.max(1.0);
    [
        [2.0 / w, 0.0, 0.0, 0.0],
        [0.0, 2.0 / h, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [-1.0, -1.0, 0.0, 1.0],
    ]
}

/// Bottom-left corner that centres a `texture`-sized image on `screen`.
pub fn centred(screen: (u32, u32), texture: (u32, u32)) -> (f32, f32) {
    (
        screen.0 as f32 / 2.0 - texture.0 as f32 / 2.0,
        screen.1 as f32 / 2.0 - texture.1 as f32 / 2.0,
    )
}

/// Texture at binding 0, sampler at binding 1.
pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("sprite texture_bind_group_layout"),
    })
}

pub(crate) fn uniform_layout(
    device: &wgpu::Device,
    visibility: wgpu::ShaderStages,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

/// Six vertices in their own buffer, rewritten when the rectangle changes.
pub struct Quad {
    vertices: [SpriteVertex; 6],
    buffer: wgpu::Buffer,
}

impl Quad {
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let vertices = quad_vertices(0.0, 0.0, 0.0, 0.0, Colour::WHITE);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self { vertices, buffer }
    }

    pub fn set(&mut self, queue: &wgpu::Queue, x: f32, y: f32, w: f32, h: f32) {
        self.vertices = quad_vertices(x, y, w, h, Colour::WHITE);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.vertices));
    }

    pub fn vertices(&self) -> &[SpriteVertex; 6] {
        &self.vertices
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..6, 0..1);
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

/// Draws textured quads with alpha blending and no depth test.
pub struct SpriteBatch {
    pipeline: wgpu::RenderPipeline,
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    projection_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
}

impl SpriteBatch {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let projection_layout =
            uniform_layout(device, wgpu::ShaderStages::VERTEX, "sprite projection layout");
        let texture_layout = texture_layout(device);

        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite projection buffer"),
            contents: bytemuck::cast_slice(&[ortho_2d(1.0, 1.0)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &projection_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_buffer.as_entire_binding(),
            }],
            label: Some("sprite projection bind group"),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&projection_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
        });
        let pipeline = mk_render_pipeline(
            device,
            "Sprite Pipeline",
            &layout,
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            None,
            &[SpriteVertex::desc()],
            (&shader, &shader),
        );

        Self {
            pipeline,
            projection_buffer,
            projection_bind_group,
            projection_layout,
            texture_layout,
        }
    }

    /// Map window pixels `(0, 0)..(width, height)` onto the render target.
    pub fn set_to_ortho_2d(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(
            &self.projection_buffer,
            0,
            bytemuck::cast_slice(&[ortho_2d(width as f32, height as f32)]),
        );
    }

    pub fn projection_layout(&self) -> &wgpu::BindGroupLayout {
        &self.projection_layout
    }

    pub fn projection_bind_group(&self) -> &wgpu::BindGroup {
        &self.projection_bind_group
    }

    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, texture: &wgpu::BindGroup, quad: &Quad) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.projection_bind_group, &[]);
        pass.set_bind_group(1, texture, &[]);
        quad.draw(pass);
    }

    pub fn destroy(&self) {
        self.projection_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Matrix4, Vector4};

    use super::*;

    fn assert_projects(m: [[f32; 4]; 4], from: (f32, f32), to: (f32, f32)) {
        let clip = Matrix4::from(m) * Vector4::new(from.0, from.1, 0.0, 1.0);
        assert!(
            (clip.x - to.0).abs() < 1e-5 && (clip.y - to.1).abs() < 1e-5,
            "{from:?} -> {:?}",
            (clip.x, clip.y)
        );
    }

    #[test]
    fn ortho_maps_window_corners_to_clip_corners() {
        let m = ortho_2d(800.0, 600.0);
        assert_projects(m, (0.0, 0.0), (-1.0, -1.0));
        assert_projects(m, (800.0, 600.0), (1.0, 1.0));
        assert_projects(m, (400.0, 300.0), (0.0, 0.0));
    }

    #[test]
    fn ortho_survives_zero_size() {
        let m = ortho_2d(0.0, 0.0);
        assert!(m.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn quad_top_edge_samples_top_row() {
        let q = quad_vertices(10.0, 20.0, 100.0, 50.0, Colour::WHITE);
        for v in q {
            if v.position[1] == 70.0 {
                assert_eq!(v.uv[1], 0.0);
            } else {
                assert_eq!(v.position[1], 20.0);
                assert_eq!(v.uv[1], 1.0);
            }
        }
    }

    #[test]
    fn quad_triangles_are_counter_clockwise() {
        let q = quad_vertices(0.0, 0.0, 1.0, 1.0, Colour::WHITE);
        for tri in q.chunks_exact(3) {
            let [a, b, c] = [tri[0].position, tri[1].position, tri[2].position];
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross > 0.0);
        }
    }

    #[test]
    fn gui_is_centred() {
        assert_eq!(centred((800, 600), (256, 128)), (272.0, 236.0));
        assert_eq!(centred((801, 600), (256, 129)), (272.5, 235.5));
    }

    #[test]
    fn vertex_stride_is_32() {
        assert_eq!(SpriteVertex::desc().array_stride, 32);
    }
}
