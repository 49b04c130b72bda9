pub mod content;
pub mod image;
pub mod mode;
pub mod request;

pub use content::*;
pub use image::*;
pub use mode::*;
pub use request::*;
