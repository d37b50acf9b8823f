//! Render pipelines.
//!
//! - `basic` builds the opaque scene pipeline and the shared pipeline setup
//! - `transparent` draws blended materials after the opaque ones
//! - `environment` holds the lighting uniform
//! - `sprite` draws screen-space quads
//! - `blur` runs the blur shader over full-screen quads

pub mod basic;
pub mod blur;
pub mod environment;
pub mod sprite;
pub mod transparent;
