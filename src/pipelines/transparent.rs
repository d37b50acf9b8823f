use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
    },
    pipelines::basic::{depth_state, mk_render_pipeline, mk_scene_shader},
};

/// Same shader as the opaque pipeline, drawn afterwards with alpha blending.
///
/// Depth is tested but not written so blended faces behind each other all
/// contribute.
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    material_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    environment_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Transparent Scene Pipeline Layout"),
        bind_group_layouts: &[
            material_layout,
            camera_bind_group_layout,
            environment_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });
    let shader = mk_scene_shader(device);
    mk_render_pipeline(
        device,
        "Transparent Scene Pipeline",
        &render_pipeline_layout,
        format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(depth_state(false)),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        (&shader, &shader),
    )
}
