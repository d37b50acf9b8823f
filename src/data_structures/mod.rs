//! Scene and GPU data types.
//!
//! - `colour` holds RGBA colours and the named palette
//! - `framebuffer` contains offscreen render targets for post-processing
//! - `instance` holds the transform of a placed model
//! - `model` contains mesh and material definitions
//! - `texture` wraps GPU textures and their creation

pub mod colour;
pub mod framebuffer;
pub mod instance;
pub mod model;
pub mod texture;
