//! The demo screen: a low-poly house seen through a first-person camera.
//!
//! Escape toggles pause. While paused the scene is rendered offscreen,
//! blurred with a strength that fades in over a few seconds and drawn
//! behind the GUI overlay.

use anyhow::Context as _;
use cgmath::{Deg, Vector3};
use instant::Duration;
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    blur::{BlurChain, BlurRamp},
    camera::{Camera, CameraController, Projection},
    config::ScreenConfig,
    context::{Context, InitContext},
    data_structures::{
        framebuffer::{texture_bind_group, RenderTargets},
        instance::ModelInstance,
        texture::Texture,
    },
    input::InputState,
    pipelines::sprite::{centred, Quad, SpriteBatch},
    render::ModelBatch,
    resources::{load_model_obj, shader::compile_shader, Assets},
    screen::{palette, Frame, Out, Screen},
};

pub struct BlurScreen {
    config: ScreenConfig,
    camera: Camera,
    projection: Projection,
    controller: CameraController,
    input: InputState,
    models: ModelBatch,
    instances: Vec<ModelInstance>,
    sprites: SpriteBatch,
    blur: BlurChain,
    gui: Texture,
    gui_bind_group: wgpu::BindGroup,
    screen_quad: Quad,
    gui_quad: Quad,
    targets: Option<RenderTargets>,
    size: (u32, u32),
    paused: bool,
    ramp: BlurRamp,
    disposed: bool,
}

impl BlurScreen {
    pub async fn new(ctx: InitContext, config: ScreenConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let assets = Assets::new(config.asset_root());
        log::info!("loading assets from {}", assets.root().display());

        let device = &ctx.device;
        let queue = &ctx.queue;
        let format = ctx.config.format;

        let models = ModelBatch::new(device, format, &config.environment);
        let (model, gui, vertex_source, fragment_source) = futures::try_join!(
            load_model_obj(&assets, &config.model, device, queue, models.material_layout()),
            assets.load_texture(&config.gui_texture, device, queue),
            assets.load_string(&config.blur_vertex_shader),
            assets.load_string(&config.blur_fragment_shader),
        )?;
        let vertex = compile_shader(device, vertex_source, &config.blur_vertex_shader, "blur vertex")
            .await
            .context("building the blur shader")?;
        let fragment = compile_shader(
            device,
            fragment_source,
            &config.blur_fragment_shader,
            "blur fragment",
        )
        .await
        .context("building the blur shader")?;

        let mut house = ModelInstance::new(device, model);
        house.transform.rotate(Vector3::unit_y(), Deg(180.0));
        house.edit_materials(|materials| {
            palette::paint(materials.iter_mut().map(|m| &mut m.attributes))
        });
        house.write_to_buffer(queue);

        let sprites = SpriteBatch::new(device, format);
        let blur = BlurChain::new(
            device,
            format,
            &sprites,
            &vertex,
            &fragment,
            config.ping_pong_count,
        );
        let gui_bind_group = texture_bind_group(device, sprites.texture_layout(), &gui, "gui");

        let camera = Camera::from(&config.camera);
        let projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            Deg(config.camera.fov_y_degrees),
            config.camera.near,
            config.camera.far,
        );
        let controller =
            CameraController::new(config.camera.velocity, config.camera.degrees_per_pixel);

        Ok(Self {
            camera,
            projection,
            controller,
            input: InputState::new(),
            models,
            instances: vec![house],
            blur,
            gui,
            gui_bind_group,
            screen_quad: Quad::new(device, "screen quad"),
            gui_quad: Quad::new(device, "gui quad"),
            sprites,
            targets: None,
            size: (0, 0),
            paused: false,
            ramp: BlurRamp::default(),
            disposed: false,
            config,
        })
    }

    /// Flip between playing and paused; the blur fades in from zero again.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.ramp.reset();
        log::debug!("paused: {}", self.paused);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn blur_amount(&self) -> f32 {
        self.ramp.amount()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Size of the offscreen scene target, if one was built yet.
    pub fn target_size(&self) -> Option<(u32, u32)> {
        self.targets
            .as_ref()
            .map(|t| (t.scene.width(), t.scene.height()))
    }

    /// Window size the blur steps are scaled by.
    pub fn blur_resolution(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn render_blurred(&mut self, ctx: &Context, frame: Frame<'_>, dt: Duration) {
        let Some(targets) = &self.targets else {
            return;
        };
        let clear = self.config.clear_colour.to_wgpu();
        {
            let mut pass = targets.scene.begin(frame.encoder, clear, "scene to texture");
            self.models.render(&mut pass, &self.instances);
        }

        self.ramp.advance(dt.as_secs_f32(), self.config.blur_ramp_rate);
        let (width, height) = self.size;
        self.blur.write_params(
            &ctx.queue,
            self.ramp.radius(self.config.max_blur),
            width,
            height,
        );
        let blurred = self
            .blur
            .run(frame.encoder, targets, &self.sprites, &self.screen_quad);

        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pause composite"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        self.sprites
            .draw(&mut pass, &blurred.bind_group, &self.screen_quad);
        self.sprites
            .draw(&mut pass, &self.gui_bind_group, &self.gui_quad);
    }

    fn render_direct(&self, frame: Frame<'_>) {
        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.clear_colour.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: frame.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        self.models.render(&mut pass, &self.instances);
    }
}

impl Screen for BlurScreen {
    fn resize(&mut self, ctx: &Context, width: u32, height: u32) {
        if self.disposed {
            return;
        }
        self.projection.resize(width, height);
        self.sprites.set_to_ortho_2d(&ctx.queue, width, height);

        // A minimised window keeps the previous targets and their size.
        let Some(targets) = RenderTargets::build(
            &ctx.device,
            ctx.config.format,
            self.sprites.texture_layout(),
            width,
            height,
            self.config.blur_scale,
        ) else {
            return;
        };
        if let Some(old) = self.targets.replace(targets) {
            old.dispose();
        }
        self.size = (width, height);

        self.screen_quad
            .set(&ctx.queue, 0.0, 0.0, width as f32, height as f32);
        let (gw, gh) = (self.gui.width(), self.gui.height());
        let (x, y) = centred((width, height), (gw, gh));
        self.gui_quad.set(&ctx.queue, x, y, gw as f32, gh as f32);
    }

    fn render(&mut self, ctx: &Context, frame: Frame<'_>, dt: Duration) -> Out {
        if self.disposed {
            return Out::Continue;
        }
        self.controller.update(&mut self.camera, dt);
        if self.input.key_just_pressed(KeyCode::Escape) {
            self.toggle_pause();
        }
        self.models.begin(&ctx.queue, &self.camera, &self.projection);

        if self.paused && self.targets.is_some() {
            self.render_blurred(ctx, frame, dt);
        } else {
            self.render_direct(frame);
        }

        self.input.end_frame();
        Out::Continue
    }

    fn on_window_event(&mut self, _ctx: &Context, event: &WindowEvent) -> Out {
        self.input.handle_window_event(event);
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.controller
                    .handle_key(*code, *state == ElementState::Pressed);
            }
            WindowEvent::Focused(false) => self.controller.reset(),
            _ => (),
        }
        Out::Continue
    }

    fn on_device_event(&mut self, _ctx: &Context, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event
            && self.input.dragging()
        {
            self.controller.handle_drag(*dx, *dy);
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(targets) = self.targets.take() {
            targets.dispose();
        }
        self.gui.destroy();
        self.instances.iter().for_each(ModelInstance::destroy);
        self.instances.clear();
        self.screen_quad.destroy();
        self.gui_quad.destroy();
        self.sprites.destroy();
        self.blur.destroy();
        self.models.destroy();
        self.controller.reset();
        self.input.clear();
        log::info!("screen disposed");
    }
}
