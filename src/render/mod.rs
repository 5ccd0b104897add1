mod native;
mod texture;

pub use native::Renderer;
pub use texture::{load_or_fallback, TextureData};
