//! Rendering of resources into markup.

pub mod content;
pub mod error;
pub mod renderer;
pub mod templates;

pub use content::{fingerprint, Content};
pub use error::RenderError;
pub use renderer::{RenderStage, Renderer};
pub use templates::TemplateRegistry;
