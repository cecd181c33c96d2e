pub mod config;
pub mod engine;
pub mod geometry;

pub use config::{LayoutConfig, LayoutConfigError, LayoutDirection};
pub use engine::{LayoutResult, layout};
pub use geometry::{Bounds, Vec2};
