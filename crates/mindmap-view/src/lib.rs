pub mod relayout;
pub mod state;
pub mod visibility;

pub use relayout::relayout;
pub use state::{NodeViewState, ViewError, ViewState, Viewport};
pub use visibility::{VisibleGraph, project_visibility};
