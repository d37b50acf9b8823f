use crate::{
    data_structures::model::Vertex,
    pipelines::{basic::mk_render_pipeline, sprite::SpriteVertex},
};

/// Full-screen quad pipeline running the runtime-loaded blur stages.
///
/// Bind groups: 0 sprite projection, 1 source texture, 2 blur parameters.
/// Output replaces the target so every pass starts from a clean image.
pub fn mk_blur_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    projection_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    params_layout: &wgpu::BindGroupLayout,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Blur Pipeline Layout"),
        bind_group_layouts: &[projection_layout, texture_layout, params_layout],
        push_constant_ranges: &[],
    });
    mk_render_pipeline(
        device,
        "Blur Pipeline",
        &layout,
        format,
        Some(wgpu::BlendState::REPLACE),
        None,
        &[SpriteVertex::desc()],
        (vertex, fragment),
    )
}
