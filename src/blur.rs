//! Separable Gaussian blur over the offscreen scene.
//!
//! The scene lands in the scene target. Each iteration then runs a
//! horizontal pass into target A and a vertical pass from A into target B,
//! the next iteration reading B again. The CPU side (pass plan, uniform
//! values, ramp) is plain data so it can be checked without a GPU.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::framebuffer::{FrameBuffer, RenderTargets},
    pipelines::{
        blur::mk_blur_pipeline,
        sprite::{uniform_layout, Quad, SpriteBatch},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One of the three offscreen targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Scene,
    A,
    B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlurPass {
    pub orientation: Orientation,
    pub source: Slot,
    pub target: Slot,
}

/// The `2 * iterations` passes in execution order.
pub fn ping_pong(iterations: u32) -> Vec<BlurPass> {
    (0..iterations)
        .flat_map(|i| {
            [
                BlurPass {
                    orientation: Orientation::Horizontal,
                    source: if i == 0 { Slot::Scene } else { Slot::B },
                    target: Slot::A,
                },
                BlurPass {
                    orientation: Orientation::Vertical,
                    source: Slot::A,
                    target: Slot::B,
                },
            ]
        })
        .collect()
}

/// Where the blurred image ends up; the unblurred scene for zero iterations.
pub fn result_slot(iterations: u32) -> Slot {
    if iterations == 0 { Slot::Scene } else { Slot::B }
}

impl RenderTargets {
    pub fn slot(&self, slot: Slot) -> &FrameBuffer {
        match slot {
            Slot::Scene => &self.scene,
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniform {
    pub dir: [f32; 2],
    pub radius: f32,
    pub resolution: f32,
}

impl BlurUniform {
    /// Horizontal passes step half a texel along x over the window width,
    /// vertical passes along y over the window height.
    ///
    /// The shader divides by `resolution`, so a zero side counts as one.
    pub fn for_pass(orientation: Orientation, radius: f32, width: u32, height: u32) -> Self {
        match orientation {
            Orientation::Horizontal => Self {
                dir: [0.5, 0.0],
                radius,
                resolution: width.max(1) as f32,
            },
            Orientation::Vertical => Self {
                dir: [0.0, 0.5],
                radius,
                resolution: height.max(1) as f32,
            },
        }
    }
}

/// Blur strength that fades in after pausing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlurRamp {
    amount: f32,
}

impl BlurRamp {
    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn reset(&mut self) {
        self.amount = 0.0;
    }

    /// Grow by `dt * rate` while below one. The last step may overshoot.
    pub fn advance(&mut self, dt: f32, rate: f32) {
        if self.amount < 1.0 {
            self.amount += dt * rate;
        }
    }

    pub fn radius(&self, max_blur: f32) -> f32 {
        self.amount * max_blur
    }
}

struct PassParams {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PassParams {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, orientation: Orientation) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{orientation:?} blur params")),
            contents: bytemuck::cast_slice(&[BlurUniform::for_pass(orientation, 0.0, 1, 1)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{orientation:?} blur params bind group")),
        });
        Self { buffer, bind_group }
    }
}

/// GPU side of the blur: the pipeline and one parameter buffer per
/// direction.
///
/// Buffer writes only land at submit time, so all horizontal passes of a
/// frame share one buffer and all vertical passes the other.
pub struct BlurChain {
    pipeline: wgpu::RenderPipeline,
    horizontal: PassParams,
    vertical: PassParams,
    iterations: u32,
}

impl BlurChain {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sprites: &SpriteBatch,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
        iterations: u32,
    ) -> Self {
        let params_layout =
            uniform_layout(device, wgpu::ShaderStages::FRAGMENT, "blur params layout");
        let pipeline = mk_blur_pipeline(
            device,
            format,
            sprites.projection_layout(),
            sprites.texture_layout(),
            &params_layout,
            vertex,
            fragment,
        );
        Self {
            pipeline,
            horizontal: PassParams::new(device, &params_layout, Orientation::Horizontal),
            vertical: PassParams::new(device, &params_layout, Orientation::Vertical),
            iterations,
        }
    }

    /// Upload this frame's radius. `width` and `height` are the window size.
    pub fn write_params(&self, queue: &wgpu::Queue, radius: f32, width: u32, height: u32) {
        for (params, orientation) in [
            (&self.horizontal, Orientation::Horizontal),
            (&self.vertical, Orientation::Vertical),
        ] {
            let uniform = BlurUniform::for_pass(orientation, radius, width, height);
            queue.write_buffer(&params.buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    /// Record every pass and return the target holding the result.
    pub fn run<'t>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        targets: &'t RenderTargets,
        sprites: &SpriteBatch,
        quad: &Quad,
    ) -> &'t FrameBuffer {
        for (i, pass) in ping_pong(self.iterations).into_iter().enumerate() {
            let params = match pass.orientation {
                Orientation::Horizontal => &self.horizontal,
                Orientation::Vertical => &self.vertical,
            };
            let label = format!("blur pass {i} ({:?})", pass.orientation);
            let mut render_pass =
                targets
                    .slot(pass.target)
                    .begin(encoder, wgpu::Color::TRANSPARENT, &label);
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, sprites.projection_bind_group(), &[]);
            render_pass.set_bind_group(1, &targets.slot(pass.source).bind_group, &[]);
            render_pass.set_bind_group(2, &params.bind_group, &[]);
            quad.draw(&mut render_pass);
        }
        targets.slot(result_slot(self.iterations))
    }

    pub fn destroy(&self) {
        self.horizontal.buffer.destroy();
        self.vertical.buffer.destroy();
    }
}
