//! Screens and their lifecycle.
//!
//! A [`Screen`] is driven by [`crate::app::run`]: it is resized whenever the
//! window changes, rendered once per display frame and disposed exactly once
//! when the loop ends.

use std::pin::Pin;

use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

use crate::context::{Context, InitContext};

pub mod blur_screen;
pub mod palette;

pub use blur_screen::BlurScreen;

/// What the loop should do after a callback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Out {
    #[default]
    Continue,
    Exit,
}

/// The targets of one frame. All passes are recorded into `encoder`, which
/// the loop submits after [`Screen::render`] returns.
pub struct Frame<'f> {
    pub encoder: &'f mut wgpu::CommandEncoder,
    pub view: &'f wgpu::TextureView,
    pub depth: &'f wgpu::TextureView,
}

pub trait Screen {
    /// Called with the initial window size and on every resize, including
    /// zero-sized ones when the window is minimised.
    fn resize(&mut self, ctx: &Context, width: u32, height: u32);

    fn render(&mut self, ctx: &Context, frame: Frame<'_>, dt: Duration) -> Out;

    fn on_window_event(&mut self, _ctx: &Context, _event: &WindowEvent) -> Out {
        Out::Continue
    }

    fn on_device_event(&mut self, _ctx: &Context, _event: &DeviceEvent) {}

    /// Release every GPU resource. Later calls are no-ops.
    fn dispose(&mut self);
}

/// Builds the screen once the GPU context exists.
pub type ScreenConstructor = Box<
    dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn Screen>>>>>,
>;
