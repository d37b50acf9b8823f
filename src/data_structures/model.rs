//! Meshes, materials and the draw helpers that bind them.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::data_structures::{colour::Colour, texture::Texture};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// CPU side of a material: what the scene shader multiplies the texture with.
///
/// `opacity` is `Some` only for blended materials; those are drawn after all
/// opaque meshes with alpha blending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialAttributes {
    pub diffuse: Colour,
    pub opacity: Option<f32>,
}

impl MaterialAttributes {
    pub fn is_transparent(&self) -> bool {
        self.opacity.is_some_and(|o| o < 1.0)
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        let alpha = self.opacity.unwrap_or(1.0);
        MaterialUniform {
            diffuse: self.diffuse.with_alpha(self.diffuse.a * alpha).to_array(),
        }
    }
}

impl Default for MaterialAttributes {
    fn default() -> Self {
        Self {
            diffuse: Colour::WHITE,
            opacity: None,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub diffuse: [f32; 4],
}

pub struct Material {
    pub name: String,
    pub diffuse_texture: Texture,
    pub attributes: MaterialAttributes,
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        diffuse_texture: Texture,
        attributes: MaterialAttributes,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} material buffer")),
            contents: bytemuck::cast_slice(&[attributes.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = diffuse_texture
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some(name),
        });

        Self {
            name: String::from(name),
            diffuse_texture,
            attributes,
            buffer,
            bind_group,
        }
    }

    /// Upload [`attributes`](Self::attributes) after they were changed.
    pub fn sync(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[self.attributes.to_uniform()]),
        );
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
        self.diffuse_texture.destroy();
    }
}

pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material: usize,
}

pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn sync_materials(&self, queue: &wgpu::Queue) {
        self.materials.iter().for_each(|m| m.sync(queue));
    }

    pub fn destroy(&self) {
        for mesh in &self.meshes {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
        }
        self.materials.iter().for_each(Material::destroy);
    }
}

pub trait DrawModel {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        environment_bind_group: &wgpu::BindGroup,
    );
}

// wgpu keeps its own references to bound resources, so the borrows only need
// to last for the call.
impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        environment_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, environment_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_by_default() {
        let attributes = MaterialAttributes::default();
        assert!(!attributes.is_transparent());
        assert_eq!(attributes.to_uniform().diffuse, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn opacity_lands_in_alpha() {
        let attributes = MaterialAttributes {
            diffuse: Colour::new(0.2, 0.4, 0.6, 1.0),
            opacity: Some(0.75),
        };
        assert!(attributes.is_transparent());
        assert_eq!(attributes.to_uniform().diffuse, [0.2, 0.4, 0.6, 0.75]);
    }

    #[test]
    fn full_opacity_stays_in_the_opaque_batch() {
        let attributes = MaterialAttributes {
            opacity: Some(1.0),
            ..Default::default()
        };
        assert!(!attributes.is_transparent());
    }

    #[test]
    fn vertex_layout_matches_struct() {
        let desc = ModelVertex::desc();
        assert_eq!(desc.array_stride, 32);
        assert_eq!(desc.attributes[2].offset, 20);
    }
}
