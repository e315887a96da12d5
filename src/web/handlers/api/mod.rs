//! API 处理器

pub mod languages;
pub mod status;
pub mod translation;

pub use languages::*;
pub use status::*;
pub use translation::*;
