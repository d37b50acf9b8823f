//! Offscreen render targets.
//!
//! A [`FrameBuffer`] is a colour attachment (plus an optional depth buffer)
//! that can be rendered into and then sampled by the next pass.
//! [`RenderTargets`] bundles the three buffers of the blur chain.

use crate::data_structures::texture::Texture;

/// Scale a window size for the offscreen targets.
///
/// Returns `None` when either side is zero (minimised window); callers keep
/// their previous targets in that case.
pub fn scaled_size(width: u32, height: u32, scale: f32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let scale = |v: u32| ((v as f32 * scale) as u32).max(1);
    Some((scale(width), scale(height)))
}

pub struct FrameBuffer {
    pub colour: Texture,
    pub depth: Option<Texture>,
    /// Samples `colour`; laid out for the sprite pipelines.
    pub bind_group: wgpu::BindGroup,
}

impl FrameBuffer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        with_depth: bool,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> Self {
        let colour = Texture::create_render_target(device, [size.0, size.1], format, label);
        let depth = with_depth.then(|| {
            Texture::create_depth_texture(device, [size.0, size.1], &format!("{label} depth"))
        });
        let bind_group = texture_bind_group(device, layout, &colour, label);
        Self {
            colour,
            depth,
            bind_group,
        }
    }

    pub fn width(&self) -> u32 {
        self.colour.width()
    }

    pub fn height(&self) -> u32 {
        self.colour.height()
    }

    /// Open a render pass that clears this buffer.
    pub fn begin<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: wgpu::Color,
        label: &str,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.colour.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: self.depth.as_ref().map(|depth| {
                wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }

    pub fn dispose(&self) {
        self.colour.destroy();
        if let Some(depth) = &self.depth {
            depth.destroy();
        }
    }
}

/// Bind a texture and its sampler for the sprite and blur pipelines.
pub fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    let sampler = texture
        .sampler
        .clone()
        .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
        label: Some(label),
    })
}

/// The scene target (colour + depth) and the two blur targets.
pub struct RenderTargets {
    pub scene: FrameBuffer,
    pub a: FrameBuffer,
    pub b: FrameBuffer,
}

impl RenderTargets {
    /// `None` for a zero-sized window.
    pub fn build(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layout: &wgpu::BindGroupLayout,
        width: u32,
        height: u32,
        blur_scale: f32,
    ) -> Option<Self> {
        let full = scaled_size(width, height, 1.0)?;
        let blurred = scaled_size(width, height, blur_scale)?;
        log::info!(
            "building render targets: scene {}x{}, blur {}x{}",
            full.0,
            full.1,
            blurred.0,
            blurred.1
        );
        Some(Self {
            scene: FrameBuffer::new(device, format, full, true, layout, "scene target"),
            a: FrameBuffer::new(device, format, blurred, false, layout, "blur target A"),
            b: FrameBuffer::new(device, format, blurred, false, layout, "blur target B"),
        })
    }

    pub fn dispose(&self) {
        self.scene.dispose();
        self.a.dispose();
        self.b.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_window_builds_nothing() {
        assert_eq!(scaled_size(0, 600, 1.0), None);
        assert_eq!(scaled_size(800, 0, 1.0), None);
    }

    #[test]
    fn unit_scale_keeps_size() {
        assert_eq!(scaled_size(800, 600, 1.0), Some((800, 600)));
    }

    #[test]
    fn downscale_truncates_and_never_hits_zero() {
        assert_eq!(scaled_size(801, 601, 0.5), Some((400, 300)));
        assert_eq!(scaled_size(1, 1, 0.25), Some((1, 1)));
    }
}
