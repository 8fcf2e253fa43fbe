mod field;
mod pointer;

pub use field::VelocityField;
pub use pointer::{PointerSource, PointerState, PointerTracker};
