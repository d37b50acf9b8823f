//! Scene lighting: an ambient colour and one directional light.

use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

use crate::config::EnvironmentConfig;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EnvironmentUniform {
    // vec3s are padded to 16 bytes in uniforms, so every field is a vec4
    ambient: [f32; 4],
    light_colour: [f32; 4],
    light_direction: [f32; 4],
}

impl From<&EnvironmentConfig> for EnvironmentUniform {
    fn from(config: &EnvironmentConfig) -> Self {
        let [ar, ag, ab] = config.ambient;
        let [lr, lg, lb] = config.light_colour;
        let direction = cgmath::Vector3::from(config.light_direction);
        let direction = if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            direction
        };
        Self {
            ambient: [ar, ag, ab, 1.0],
            light_colour: [lr, lg, lb, 1.0],
            light_direction: [direction.x, direction.y, direction.z, 0.0],
        }
    }
}

#[derive(Debug)]
pub struct EnvironmentResources {
    pub uniform: EnvironmentUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl EnvironmentResources {
    pub fn new(device: &wgpu::Device, config: &EnvironmentConfig) -> Self {
        let uniform = EnvironmentUniform::from(config);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Environment Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("environment_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("environment_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_direction_is_normalised() {
        let uniform = EnvironmentUniform::from(&EnvironmentConfig {
            ambient: [0.4; 3],
            light_colour: [0.8; 3],
            light_direction: [0.0, -2.0, 0.0],
        });
        assert_eq!(uniform.light_direction, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(uniform.ambient, [0.4, 0.4, 0.4, 1.0]);
        assert_eq!(uniform.light_colour, [0.8, 0.8, 0.8, 1.0]);
    }

    #[test]
    fn default_light_points_down_and_away() {
        let uniform = EnvironmentUniform::from(&EnvironmentConfig::default());
        let [x, y, z, w] = uniform.light_direction;
        assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-6);
        assert!(x < 0.0 && y < 0.0 && z < 0.0);
        assert_eq!(w, 0.0);
    }

    #[test]
    fn uniform_is_three_vec4s() {
        assert_eq!(std::mem::size_of::<EnvironmentUniform>(), 48);
    }
}
