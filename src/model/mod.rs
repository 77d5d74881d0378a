pub mod entity;
pub mod flow;

pub use entity::*;
pub use flow::*;
