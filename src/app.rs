//! Application event loop.
//!
//! [`run`] opens the window, creates the GPU [`Context`], builds the screen
//! on a tokio runtime and then drives it:
//!
//! 1. window and device events are forwarded to the screen
//! 2. resizes reconfigure the surface (non-zero sizes only) and are always
//!    passed on to the screen
//! 3. every redraw acquires the surface texture, lets the screen record its
//!    passes into one encoder, submits and presents
//!
//! The screen is disposed exactly once, whichever way the loop ends.

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::ScreenConfig,
    context::{Context, InitContext},
    screen::{Frame, Out, Screen, ScreenConstructor},
};

struct AppState {
    ctx: Context,
    screen: Box<dyn Screen>,
    is_surface_configured: bool,
    disposed: bool,
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
        self.screen.resize(&self.ctx, width, height);
    }

    fn render(&mut self, dt: instant::Duration) -> Result<Out, wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(Out::Continue);
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let out = self.screen.render(
            &self.ctx,
            Frame {
                encoder: &mut encoder,
                view: &view,
                depth: &self.ctx.depth_texture.view,
            },
            dt,
        );

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(out)
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.screen.dispose();
        }
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    title: String,
    // Taken once the window exists.
    constructor: Option<ScreenConstructor>,
    state: Option<AppState>,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(title: String, constructor: ScreenConstructor) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            title,
            constructor: Some(constructor),
            state: None,
            last_time: Instant::now(),
            error: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let Some(constructor) = self.constructor.take() else {
            return Ok(());
        };
        let window_attributes = Window::default_attributes().with_title(self.title.clone());
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let (ctx, screen) = self.async_runtime.block_on(async move {
            let ctx = Context::new(window).await?;
            // InitContext clones share the device and queue
            let screen = constructor(InitContext::from(&ctx)).await?;
            anyhow::Ok((ctx, screen))
        })?;

        let size = ctx.window.inner_size();
        let mut state = AppState {
            ctx,
            screen,
            is_surface_configured: false,
            disposed: false,
        };
        state.resize(size.width, size.height);
        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.last_time = Instant::now();
        Ok(())
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.dispose();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.init(event_loop) {
            log::error!("App initialization failed: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            state.screen.on_device_event(&state.ctx, &event);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        if state.screen.on_window_event(&state.ctx, &event) == Out::Exit {
            self.exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.exit(event_loop),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render(dt) {
                    Ok(Out::Continue) => (),
                    Ok(Out::Exit) => self.exit(event_loop),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.dispose();
        }
    }
}

/// Open a window and drive the screen built by `constructor` until the
/// window closes or the screen asks to exit.
///
/// Errors from building the context or the screen end the loop and are
/// returned here with their full context chain.
pub fn run(config: &ScreenConfig, constructor: ScreenConstructor) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<()> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<()> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop: EventLoop<()> = EventLoop::new()?;

    let mut app = App::new(config.window_title.clone(), constructor)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
