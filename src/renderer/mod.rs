//! Rendering module
//!
//! `scene` turns a simulation snapshot into a pixel-space triangle list;
//! `pipeline` uploads it to WebGPU and draws it in one pass.

pub mod car;
pub mod palette;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use palette::Palette;
pub use pipeline::RenderState;
pub use scene::{Camera, Frame, Label, Renderer};
pub use vertex::Vertex;
