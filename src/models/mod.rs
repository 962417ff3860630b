pub mod gemini;
pub mod image;
pub mod session;
pub mod style;

pub use image::*;
pub use session::*;
pub use style::*;
