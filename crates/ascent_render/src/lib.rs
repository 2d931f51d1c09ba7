pub mod compositor;
pub mod gpu_context;

pub use compositor::{Compositor, StageTarget};
pub use gpu_context::GpuContext;
