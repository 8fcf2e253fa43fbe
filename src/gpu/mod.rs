mod context;
mod render;
mod textures;

pub use context::GpuContext;
pub use render::RenderPipeline;
pub use textures::{FieldTexture, FrameUniforms, PhotoTexture};
