pub mod chapters;
pub mod check;
pub mod render;
pub mod thumbnail;
pub mod validate;
