//! pause-blur
//!
//! A first-person demo screen built on wgpu. A low-poly house is rendered
//! with a free-flying camera; pressing Escape pauses, after which the scene
//! is rendered offscreen, blurred with a separable Gaussian bounced between
//! two framebuffers and shown behind a GUI overlay.
//!
//! High-level modules
//! - `app`: the winit event loop that drives a [`screen::Screen`]
//! - `blur`: the ping-pong pass plan, blur ramp and the GPU blur chain
//! - `camera`: first-person camera, controller and uniforms
//! - `config`: JSON-loadable settings with the demo's defaults
//! - `context`: window, surface, device and queue
//! - `data_structures`: meshes, materials, instances, textures, framebuffers
//! - `input`: per-frame keyboard and mouse state
//! - `pipelines`: scene, sprite and blur pipelines
//! - `render`: the model batch drawing opaque then blended meshes
//! - `resources`: loading of models, textures and shaders
//! - `screen`: the screen lifecycle and the blur demo screen
//!

pub mod app;
pub mod blur;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod screen;

pub use app::run;
pub use config::ScreenConfig;
pub use screen::{BlurScreen, Out, Screen, ScreenConstructor};

// Re-exports commonly used types for convenience in downstream code.
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
