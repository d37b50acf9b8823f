use std::path::Path;

use crate::{
    data_structures::{
        colour::Colour,
        model::{Material, MaterialAttributes},
        texture::Texture,
    },
    resources::Assets,
};

/// Diffuse texture, its sampler and the material uniform.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("Model material_bind_group_layout"),
    })
}

/// Translate MTL values: `Kd` is the base colour and a dissolve below one
/// makes the material blended.
pub fn attributes_from_mtl(material: &tobj::Material) -> MaterialAttributes {
    let diffuse = material.diffuse.map(Colour::from).unwrap_or(Colour::WHITE);
    let opacity = material.dissolve.filter(|d| *d < 1.0);
    MaterialAttributes { diffuse, opacity }
}

pub async fn load_materials(
    assets: &Assets,
    base_dir: &Path,
    obj_materials: &[tobj::Material],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<Vec<Material>> {
    let mut materials = Vec::with_capacity(obj_materials.len());
    for m in obj_materials {
        let diffuse_texture = match &m.diffuse_texture {
            Some(file) => assets.load_texture(base_dir.join(file), device, queue).await?,
            None => Texture::create_solid(device, queue, [255; 4], 1, 1, &m.name),
        };
        materials.push(Material::new(
            device,
            &m.name,
            diffuse_texture,
            attributes_from_mtl(m),
            layout,
        ));
    }
    Ok(materials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kd_becomes_diffuse() {
        let material = tobj::Material {
            diffuse: Some([0.5, 0.25, 1.0]),
            ..Default::default()
        };
        let attributes = attributes_from_mtl(&material);
        assert_eq!(attributes.diffuse, Colour::new(0.5, 0.25, 1.0, 1.0));
        assert_eq!(attributes.opacity, None);
    }

    #[test]
    fn dissolve_below_one_is_blended() {
        let material = tobj::Material {
            dissolve: Some(0.5),
            ..Default::default()
        };
        assert_eq!(attributes_from_mtl(&material).opacity, Some(0.5));

        let solid = tobj::Material {
            dissolve: Some(1.0),
            ..Default::default()
        };
        assert_eq!(attributes_from_mtl(&solid).opacity, None);
    }
}
