//! 3D scene rendering.
//!
//! [`ModelBatch`] owns the camera and environment uniforms together with the
//! two scene pipelines. Each instance keeps its meshes sorted into an
//! opaque and a blended batch; opaque meshes are drawn first so blended
//! ones composite over finished depth.

use crate::{
    camera::{Camera, CameraResources, Projection},
    config::EnvironmentConfig,
    data_structures::{instance::ModelInstance, model::DrawModel},
    pipelines::{
        basic::mk_basic_pipeline, environment::EnvironmentResources,
        transparent::mk_transparent_pipeline,
    },
    resources::texture::material_layout,
};

pub struct ModelBatch {
    camera: CameraResources,
    environment: EnvironmentResources,
    material_layout: wgpu::BindGroupLayout,
    opaque: wgpu::RenderPipeline,
    transparent: wgpu::RenderPipeline,
}

impl ModelBatch {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        environment: &EnvironmentConfig,
    ) -> Self {
        let camera = CameraResources::new(device);
        let environment = EnvironmentResources::new(device, environment);
        let material_layout = material_layout(device);
        let opaque = mk_basic_pipeline(
            device,
            format,
            &material_layout,
            &camera.bind_group_layout,
            &environment.bind_group_layout,
        );
        let transparent = mk_transparent_pipeline(
            device,
            format,
            &material_layout,
            &camera.bind_group_layout,
            &environment.bind_group_layout,
        );
        Self {
            camera,
            environment,
            material_layout,
            opaque,
            transparent,
        }
    }

    /// Layout models must build their materials against.
    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    /// Upload the view for this frame.
    pub fn begin(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.camera.write(queue, camera, projection);
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, instances: &[ModelInstance]) {
        pass.set_pipeline(&self.opaque);
        for instance in instances {
            self.draw(pass, instance, &instance.draw_order().opaque);
        }
        pass.set_pipeline(&self.transparent);
        for instance in instances {
            self.draw(pass, instance, &instance.draw_order().blended);
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instance: &ModelInstance, meshes: &[usize]) {
        pass.set_vertex_buffer(1, instance.buffer.slice(..));
        for &i in meshes {
            let mesh = &instance.model.meshes[i];
            pass.draw_mesh_instanced(
                mesh,
                &instance.model.materials[mesh.material],
                0..1,
                &self.camera.bind_group,
                &self.environment.bind_group,
            );
        }
    }

    pub fn destroy(&self) {
        self.camera.buffer.destroy();
        self.environment.destroy();
    }
}
