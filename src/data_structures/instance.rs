//! Placed occurrences of a loaded model.
//!
//! The transform of a [`ModelInstance`] lives in a one-element instance
//! buffer so the scene shader can read it as per-instance vertex data.

use cgmath::{Deg, One, Rotation3};
use wgpu::util::DeviceExt;

use crate::data_structures::model::{self, Material, MaterialAttributes, Model};

/// Position, rotation (as quaternion) and scale of an instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transformation.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Post-multiply a rotation around `axis`, like rotating a transform matrix in place.
    pub fn rotate(&mut self, axis: cgmath::Vector3<f32>, angle: Deg<f32>) {
        self.rotation = self.rotation * cgmath::Quaternion::from_axis_angle(axis, angle);
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// The per-instance data stored on the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per instance, not per vertex.
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // A mat4 takes four vertex slots, one per column.
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Mesh indices of a model split by how they are blended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawOrder {
    pub opaque: Vec<usize>,
    pub blended: Vec<usize>,
}

impl DrawOrder {
    /// Meshes pointing past `materials` are dropped.
    pub fn new(mesh_materials: &[usize], materials: &[MaterialAttributes]) -> Self {
        let mut order = Self::default();
        for (mesh, &material) in mesh_materials.iter().enumerate() {
            match materials.get(material) {
                Some(m) if m.is_transparent() => order.blended.push(mesh),
                Some(_) => order.opaque.push(mesh),
                None => (),
            }
        }
        order
    }

    fn of(model: &Model) -> Self {
        let mesh_materials = model.meshes.iter().map(|m| m.material).collect::<Vec<_>>();
        let attributes = model
            .materials
            .iter()
            .map(|m| m.attributes)
            .collect::<Vec<_>>();
        Self::new(&mesh_materials, &attributes)
    }
}

/// A model together with its own transform.
///
/// The instance owns its model, so material edits only affect this instance.
pub struct ModelInstance {
    pub model: Model,
    pub transform: Instance,
    pub(crate) buffer: wgpu::Buffer,
    draw_order: DrawOrder,
}

impl ModelInstance {
    pub fn new(device: &wgpu::Device, model: Model) -> Self {
        let transform = Instance::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[transform.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let draw_order = DrawOrder::of(&model);
        Self {
            model,
            transform,
            buffer,
            draw_order,
        }
    }

    /// Change material attributes; the draw order follows the new opacities.
    pub fn edit_materials<R>(&mut self, edit: impl FnOnce(&mut [Material]) -> R) -> R {
        let result = edit(&mut self.model.materials);
        self.draw_order = DrawOrder::of(&self.model);
        result
    }

    pub fn draw_order(&self) -> &DrawOrder {
        &self.draw_order
    }

    /// Upload the transform and every material.
    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[self.transform.to_raw()]),
        );
        self.model.sync_materials(queue);
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
        self.model.destroy();
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3, Vector4};

    use super::*;

    #[test]
    fn half_turn_around_y_mirrors_x_and_z() {
        let mut instance = Instance::new();
        instance.rotate(Vector3::unit_y(), Deg(180.0));
        let p = instance.to_matrix() * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert!((p.truncate() - Vector3::new(-1.0, 2.0, -3.0)).magnitude() < 1e-5);
    }

    #[test]
    fn translation_applies_after_rotation() {
        let mut instance = Instance::new();
        instance.position = Vector3::new(0.0, 5.0, 0.0);
        instance.rotate(Vector3::unit_y(), Deg(90.0));
        let p = instance.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.truncate() - Vector3::new(0.0, 5.0, -1.0)).magnitude() < 1e-5);
    }

    fn solid() -> MaterialAttributes {
        MaterialAttributes::default()
    }

    fn water() -> MaterialAttributes {
        MaterialAttributes {
            opacity: Some(0.75),
            ..Default::default()
        }
    }

    #[test]
    fn blended_meshes_go_last() {
        let order = DrawOrder::new(&[0, 1, 0, 1], &[solid(), water()]);
        assert_eq!(order.opaque, vec![0, 2]);
        assert_eq!(order.blended, vec![1, 3]);
    }

    #[test]
    fn meshes_without_material_are_dropped() {
        let order = DrawOrder::new(&[0, 5], &[solid()]);
        assert_eq!(order.opaque, vec![0]);
        assert!(order.blended.is_empty());
    }

    #[test]
    fn raw_layout_is_tightly_packed() {
        use crate::data_structures::model::Vertex;
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 100);
        assert_eq!(InstanceRaw::desc().attributes.len(), 7);
    }
}
