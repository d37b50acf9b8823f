use anyhow::ensure;
use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::model;

/// Build vertices for one OBJ mesh.
///
/// OBJ exports without `vn` records get smooth normals averaged from the
/// faces around each vertex.
pub fn build_vertices(mesh: &tobj::Mesh) -> anyhow::Result<Vec<model::ModelVertex>> {
    let count = mesh.positions.len() / 3;
    ensure!(
        mesh.indices.iter().all(|&i| (i as usize) < count),
        "index out of range for {count} vertices"
    );

    let mut vertices = (0..count)
        .map(|i| model::ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            tex_coords: [
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                // OBJ puts v=0 at the bottom, wgpu at the top
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
        })
        .collect::<Vec<_>>();

    if mesh.normals.len() < count * 3 {
        let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); count];
        for c in mesh.indices.chunks_exact(3) {
            let p0: Vector3<f32> = vertices[c[0] as usize].position.into();
            let p1: Vector3<f32> = vertices[c[1] as usize].position.into();
            let p2: Vector3<f32> = vertices[c[2] as usize].position.into();
            // Unnormalised so larger faces weigh more.
            let face = (p1 - p0).cross(p2 - p0);
            for &i in c {
                sums[i as usize] += face;
            }
        }
        for (vertex, sum) in vertices.iter_mut().zip(sums) {
            if sum.magnitude2() > 0.0 {
                vertex.normal = sum.normalize().into();
            }
        }
    }

    Ok(vertices)
}

pub fn load_meshes(
    models: &[tobj::Model],
    file_name: &str,
    device: &wgpu::Device,
) -> Vec<anyhow::Result<model::Mesh>> {
    models
        .iter()
        .map(|m| {
            let vertices = build_vertices(&m.mesh)?;

            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer", m.name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", m.name)),
                // One index addresses position, uv and normal because `single_index` is set
                contents: bytemuck::cast_slice(&m.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            Ok(model::Mesh {
                name: format!("{file_name}#{}", m.name),
                vertex_buffer,
                index_buffer,
                num_elements: m.mesh.indices.len() as u32,
                material: m.mesh.material_id.unwrap_or(usize::MAX),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> tobj::Mesh {
        tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, -1.0],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    #[test]
    fn computes_normals_when_missing() {
        let vertices = build_vertices(&triangle()).unwrap();
        for v in vertices {
            assert!((v.normal[1] - 1.0).abs() < 1e-6, "{:?}", v.normal);
        }
    }

    #[test]
    fn flips_v_coordinate() {
        let mut mesh = triangle();
        mesh.texcoords = vec![0.0, 0.25, 1.0, 0.0, 0.0, 1.0];
        let vertices = build_vertices(&mesh).unwrap();
        assert_eq!(vertices[0].tex_coords, [0.0, 0.75]);
        assert_eq!(vertices[2].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn keeps_exported_normals() {
        let mut mesh = triangle();
        mesh.normals = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let vertices = build_vertices(&mesh).unwrap();
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mut mesh = triangle();
        mesh.indices = vec![0, 1, 7];
        assert!(build_vertices(&mesh).is_err());
    }
}
