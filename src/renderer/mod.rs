//! WebGPU rendering module
//!
//! Scene geometry is built in canvas pixels and mapped to clip space on
//! upload.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderInitError, RenderState, canvas_to_ndc};
pub use scene::build_scene;
pub use vertex::Vertex;
